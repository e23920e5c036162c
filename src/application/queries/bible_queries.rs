//! Bible Queries

/// 书卷列表；未指定资源时列出所有 bible 资源
#[derive(Debug, Clone)]
pub struct ListBibleBooks {
    pub resource_id: Option<i64>,
}

/// 书卷正文的输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// USJ
    Json,
    /// 原始 USFM
    Usfm,
}

impl ContentFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "usj" => Some(ContentFormat::Json),
            "usfm" => Some(ContentFormat::Usfm),
            _ => None,
        }
    }
}

/// 获取整卷书的正文
#[derive(Debug, Clone)]
pub struct GetBibleBookContent {
    pub resource_id: i64,
    pub book_code: String,
    pub format: ContentFormat,
}

/// 获取一章的全部经节（含章级导航）
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
}

/// 获取单个经节（含节级导航）
#[derive(Debug, Clone)]
pub struct GetVerse {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    pub verse: u32,
}

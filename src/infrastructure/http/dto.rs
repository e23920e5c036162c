//! Data Transfer Objects
//!
//! 请求字段使用 snake_case；导航链接沿用前端约定的 camelCase。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::{
    BibleBookContentResponse, BibleBookSummary, BibleBooksGroup, BookContent, ChapterResponse,
    DeleteBibleBooksResponse, IngestBibleBookResponse, ResourceRecord, VerseResponse,
};
use crate::domain::{Navigation, NavigationLink};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Resource DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub resource_id: i64,
    pub name: String,
    pub content_type: &'static str,
    pub created_at: String,
}

impl From<ResourceRecord> for ResourceResponse {
    fn from(record: ResourceRecord) -> Self {
        Self {
            resource_id: record.resource_id,
            name: record.name,
            content_type: record.content_type.as_str(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Bible DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub bible_book_id: i64,
    pub book_code: String,
    pub chapters: u32,
    pub verse_count: usize,
}

impl From<IngestBibleBookResponse> for IngestResponse {
    fn from(result: IngestBibleBookResponse) -> Self {
        Self {
            bible_book_id: result.bible_book_id,
            book_code: result.book_code,
            chapters: result.chapters,
            verse_count: result.verse_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteBibleBooksRequest {
    pub resource_id: i64,
    pub book_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBooksResponse {
    pub message: String,
    pub deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<DeleteBibleBooksResponse> for DeleteBooksResponse {
    fn from(result: DeleteBibleBooksResponse) -> Self {
        Self {
            message: result.message(),
            deleted: result.deleted,
            errors: result.errors,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBibleBooksRequest {
    #[serde(default)]
    pub resource_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookSummaryResponse {
    pub bible_book_id: i64,
    pub book_id: i64,
    pub book_code: String,
    pub book_name: String,
    pub chapters: u32,
}

impl From<BibleBookSummary> for BookSummaryResponse {
    fn from(summary: BibleBookSummary) -> Self {
        Self {
            bible_book_id: summary.bible_book_id,
            book_id: summary.book_id,
            book_code: summary.book_code,
            book_name: summary.book_name,
            chapters: summary.chapters,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BibleBooksResponse {
    pub resource_id: i64,
    pub books: Vec<BookSummaryResponse>,
}

impl From<BibleBooksGroup> for BibleBooksResponse {
    fn from(group: BibleBooksGroup) -> Self {
        Self {
            resource_id: group.resource_id,
            books: group.books.into_iter().map(Into::into).collect(),
        }
    }
}

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize)]
pub struct BookContentRequest {
    pub resource_id: i64,
    pub book_code: String,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct BookContentResponse {
    pub resource_id: i64,
    pub bible_book_id: i64,
    pub book_id: i64,
    pub book_code: String,
    pub book_name: String,
    pub chapters: u32,
    pub format: &'static str,
    pub content: Value,
}

impl From<BibleBookContentResponse> for BookContentResponse {
    fn from(result: BibleBookContentResponse) -> Self {
        let (format, content) = match result.content {
            BookContent::Usj(value) => ("json", value),
            BookContent::Usfm(text) => ("usfm", Value::String(text)),
        };
        Self {
            resource_id: result.resource_id,
            bible_book_id: result.bible_book_id,
            book_id: result.book_id,
            book_code: result.book_code,
            book_name: result.book_name,
            chapters: result.chapters,
            format,
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChapterRequest {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
}

#[derive(Debug, Deserialize)]
pub struct VerseRequest {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    pub verse: u32,
}

/// 导航目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLinkDto {
    /// 以字符串形式输出
    pub resource_id: String,
    pub bible_book_code: String,
    pub chapter_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_id: Option<u32>,
}

impl From<NavigationLink> for NavigationLinkDto {
    fn from(link: NavigationLink) -> Self {
        Self {
            resource_id: link.resource_id.to_string(),
            bible_book_code: link.book_code,
            chapter_id: link.chapter,
            verse_id: link.verse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationDto {
    pub previous: Option<NavigationLinkDto>,
    pub next: Option<NavigationLinkDto>,
}

impl From<Navigation> for NavigationDto {
    fn from(navigation: Navigation) -> Self {
        Self {
            previous: navigation.previous.map(Into::into),
            next: navigation.next.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerseItem {
    pub verse: u32,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterContentResponse {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    pub verses: Vec<VerseItem>,
    pub navigation: NavigationDto,
}

impl From<ChapterResponse> for ChapterContentResponse {
    fn from(result: ChapterResponse) -> Self {
        Self {
            resource_id: result.resource_id,
            book_code: result.book_code,
            chapter: result.chapter,
            verses: result
                .verses
                .into_iter()
                .map(|v| VerseItem {
                    verse: v.verse,
                    text: v.text,
                })
                .collect(),
            navigation: result.navigation.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerseContentResponse {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub navigation: NavigationDto,
}

impl From<VerseResponse> for VerseContentResponse {
    fn from(result: VerseResponse) -> Self {
        Self {
            resource_id: result.resource_id,
            book_code: result.book_code,
            chapter: result.chapter,
            verse: result.verse,
            text: result.text,
            navigation: result.navigation.into(),
        }
    }
}

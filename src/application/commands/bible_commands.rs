//! Bible Commands

/// 上传新书卷（USFM 文件）
#[derive(Debug, Clone)]
pub struct UploadBibleBook {
    pub resource_id: i64,
    pub filename: String,
    pub content: Vec<u8>,
}

/// 用新的 USFM 文件覆盖已有书卷
#[derive(Debug, Clone)]
pub struct UpdateBibleBook {
    pub bible_book_id: i64,
    pub filename: String,
    pub content: Vec<u8>,
}

/// 批量删除书卷
#[derive(Debug, Clone)]
pub struct DeleteBibleBooks {
    pub resource_id: i64,
    pub book_codes: Vec<String>,
}

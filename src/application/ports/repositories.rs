//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::scripture::{UsjDocument, Verse};
use crate::domain::CatalogBook;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Book Lookup
// ============================================================================

/// 正典书卷（静态参考数据）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// 正典顺序
    pub book_id: i64,
    pub code: String,
    pub name: String,
    pub max_chapter: u32,
}

/// Book Lookup Port
#[async_trait]
pub trait BookLookupPort: Send + Sync {
    /// 按代码查找（不区分大小写）
    async fn resolve(&self, code: &str) -> Result<Option<BookRecord>, RepositoryError>;

    async fn find_by_id(&self, book_id: i64) -> Result<Option<BookRecord>, RepositoryError>;

    /// 所有书卷，按 book_id 升序
    async fn find_all(&self) -> Result<Vec<BookRecord>, RepositoryError>;

    /// 资源中实际存在的书卷目录，按 book_id 升序，章数取自已存储的书卷
    async fn list_ordered(&self, resource_id: i64) -> Result<Vec<CatalogBook>, RepositoryError>;
}

// ============================================================================
// Resource Repository
// ============================================================================

/// 资源内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Bible,
    Dictionary,
    Video,
    IslBible,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Bible => "bible",
            ContentType::Dictionary => "dictionary",
            ContentType::Video => "video",
            ContentType::IslBible => "isl_bible",
        }
    }

    /// 不区分大小写
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bible" => Some(ContentType::Bible),
            "dictionary" => Some(ContentType::Dictionary),
            "video" => Some(ContentType::Video),
            "isl_bible" => Some(ContentType::IslBible),
            _ => None,
        }
    }
}

/// 内容容器
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub resource_id: i64,
    pub name: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
}

/// Resource Repository Port
#[async_trait]
pub trait ResourceRepositoryPort: Send + Sync {
    async fn create(
        &self,
        name: &str,
        content_type: ContentType,
    ) -> Result<ResourceRecord, RepositoryError>;

    async fn find_by_id(&self, resource_id: i64)
        -> Result<Option<ResourceRecord>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<ResourceRecord>, RepositoryError>;
}

// ============================================================================
// Bible Repository
// ============================================================================

/// 已存储的书卷（原始 USFM + USJ）
#[derive(Debug, Clone)]
pub struct BibleBookRecord {
    pub bible_book_id: i64,
    pub resource_id: i64,
    pub book_id: i64,
    pub usfm: String,
    pub usj: UsjDocument,
    pub chapters: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待写入的书卷
#[derive(Debug, Clone)]
pub struct NewBibleBook {
    pub resource_id: i64,
    pub book_id: i64,
    pub usfm: String,
    pub usj: UsjDocument,
    pub chapters: u32,
}

/// 书卷列表项（不含正文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibleBookSummary {
    pub bible_book_id: i64,
    pub resource_id: i64,
    pub book_id: i64,
    pub book_code: String,
    pub book_name: String,
    pub chapters: u32,
}

/// Bible Repository Port
///
/// 书卷行与其扁平经节在同一事务中写入/删除。
#[async_trait]
pub trait BibleRepositoryPort: Send + Sync {
    /// 插入书卷并写入全部经节
    async fn create_with_verses(
        &self,
        book: &NewBibleBook,
        verses: &[Verse],
    ) -> Result<BibleBookRecord, RepositoryError>;

    /// 覆盖书卷内容，并整体替换经节
    async fn update_with_verses(
        &self,
        bible_book_id: i64,
        book: &NewBibleBook,
        verses: &[Verse],
    ) -> Result<BibleBookRecord, RepositoryError>;

    async fn find_by_id(&self, bible_book_id: i64)
        -> Result<Option<BibleBookRecord>, RepositoryError>;

    async fn find_by_resource_and_book(
        &self,
        resource_id: i64,
        book_id: i64,
    ) -> Result<Option<BibleBookRecord>, RepositoryError>;

    /// 书卷列表；未指定资源时列出所有 bible 类型资源下的书卷
    ///
    /// 按 (resource_id, book_id) 升序。
    async fn list_summaries(
        &self,
        resource_id: Option<i64>,
    ) -> Result<Vec<BibleBookSummary>, RepositoryError>;

    /// 删除书卷及其经节，书卷不存在时返回 false
    async fn delete_with_verses(
        &self,
        resource_id: i64,
        book_id: i64,
    ) -> Result<bool, RepositoryError>;
}

// ============================================================================
// Verse Store
// ============================================================================

/// 扁平经节记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRecord {
    pub resource_id: i64,
    pub book_id: i64,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// Verse Store Port
#[async_trait]
pub trait VerseStorePort: Send + Sync {
    /// 原子地替换某资源下某书卷的全部经节
    async fn replace_all(
        &self,
        resource_id: i64,
        book_id: i64,
        verses: &[Verse],
    ) -> Result<(), RepositoryError>;

    async fn get(
        &self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
        verse: u32,
    ) -> Result<Option<VerseRecord>, RepositoryError>;

    /// 某章中最大的经节号，章节无记录时为 None
    async fn max_verse(
        &self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
    ) -> Result<Option<u32>, RepositoryError>;

    /// 某章全部经节，按经节号升序
    async fn list_chapter(
        &self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
    ) -> Result<Vec<VerseRecord>, RepositoryError>;
}

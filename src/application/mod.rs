//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（BookLookup、Resource、Bible、VerseStore、IngestLock、NavigationRead）
//! - commands: CQRS 命令及处理器（上传/更新/删除书卷、创建资源）
//! - queries: CQRS 查询及处理器（书卷列表、正文、章、节）
//! - navigation: 章/节导航解析
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod navigation;
pub mod ports;
pub mod queries;

mod lookup;

// Re-exports
pub use commands::{
    // Bible commands
    DeleteBibleBooks,
    UpdateBibleBook,
    UploadBibleBook,
    // Resource commands
    CreateResource,
    // Handlers
    handlers::{
        CreateResourceHandler, DeleteBibleBooksHandler, DeleteBibleBooksResponse,
        IngestBibleBookResponse, UpdateBibleBookHandler, UploadBibleBookHandler, UploadPolicy,
    },
};

pub use error::ApplicationError;

pub use navigation::NavigationResolver;

pub use ports::{
    BibleBookRecord, BibleBookSummary, BibleRepositoryPort, BookLookupPort, BookRecord,
    ContentType, IngestGuard, IngestLockPort, NavigationReadPort, NavigationSnapshot, NewBibleBook,
    RepositoryError, ResourceRecord, ResourceRepositoryPort, VerseRecord, VerseStorePort,
};

pub use queries::{
    // Bible queries
    ContentFormat,
    GetBibleBookContent,
    GetChapter,
    GetVerse,
    ListBibleBooks,
    // Resource queries
    ListResources,
    // Handlers
    handlers::{
        BibleBookContentResponse, BibleBooksGroup, BookContent, ChapterResponse, ChapterVerse,
        GetBibleBookContentHandler, GetChapterHandler, GetVerseHandler, ListBibleBooksHandler,
        ListResourcesHandler, VerseResponse,
    },
};

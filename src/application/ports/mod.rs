//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod ingest_lock;
mod navigation_read;
mod repositories;

pub use ingest_lock::{IngestGuard, IngestLockPort};
pub use navigation_read::{NavigationReadPort, NavigationSnapshot};
pub use repositories::{
    BibleBookRecord, BibleBookSummary, BibleRepositoryPort, BookLookupPort, BookRecord,
    ContentType, NewBibleBook, RepositoryError, ResourceRecord, ResourceRepositoryPort,
    VerseRecord, VerseStorePort,
};

//! SQLite Persistence - SQLite 数据库持久化实现

mod bible_repo;
mod book_repo;
mod database;
mod navigation_reader;
mod resource_repo;
mod verse_repo;

pub use bible_repo::*;
pub use book_repo::*;
pub use database::*;
pub use navigation_reader::*;
pub use resource_repo::*;
pub use verse_repo::*;

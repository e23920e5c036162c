//! Memory Layer - In-Memory State Management
//!
//! 进程内的书卷导入锁

mod ingest_locks;

pub use ingest_locks::InMemoryIngestLocks;

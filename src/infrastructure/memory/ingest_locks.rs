//! In-Memory Ingest Locks Implementation

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::ports::{IngestGuard, IngestLockPort};

/// 按 (resource_id, book_id) 分键的内存锁
pub struct InMemoryIngestLocks {
    /// (resource_id, book_id) -> 互斥锁
    locks: DashMap<(i64, i64), Arc<Mutex<()>>>,
}

impl InMemoryIngestLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 已创建的锁数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Default for InMemoryIngestLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IngestLockPort for InMemoryIngestLocks {
    async fn acquire(&self, resource_id: i64, book_id: i64) -> IngestGuard {
        // 只剩映射自身引用的锁已无人持有或等待，可以移除
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        // 先克隆出 Arc 再等待，避免持有分片锁跨越 await
        let lock = self
            .locks
            .entry((resource_id, book_id))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        tracing::trace!(resource_id, book_id, "Waiting for ingest lock");
        lock.lock_owned().await
    }
}

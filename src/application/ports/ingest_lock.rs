//! Ingest Lock Port - 同一书卷的导入串行化
//!
//! 同一 (资源, 书卷) 的上传/更新在进程内依次执行，
//! 不同书卷之间互不阻塞。

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

/// 持有期间同一书卷的其他导入会等待
pub type IngestGuard = OwnedMutexGuard<()>;

/// Ingest Lock Port
#[async_trait]
pub trait IngestLockPort: Send + Sync {
    async fn acquire(&self, resource_id: i64, book_id: i64) -> IngestGuard;
}

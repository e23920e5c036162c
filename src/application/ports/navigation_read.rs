//! Navigation Read Port - 导航读取快照
//!
//! 书卷目录与经节查询在同一个只读快照中执行，
//! 导航结果不会混合两个不同时刻的数据。

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::CatalogBook;

/// Navigation Read Port
#[async_trait]
pub trait NavigationReadPort: Send + Sync {
    /// 打开只读快照
    async fn snapshot(&self) -> Result<Box<dyn NavigationSnapshot>, RepositoryError>;
}

/// 一次导航计算期间持有的快照
#[async_trait]
pub trait NavigationSnapshot: Send {
    /// 资源中实际存在的书卷目录，按 book_id 升序
    async fn list_ordered(&mut self, resource_id: i64)
        -> Result<Vec<CatalogBook>, RepositoryError>;

    async fn verse_exists(
        &mut self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
        verse: u32,
    ) -> Result<bool, RepositoryError>;

    /// 某章中最大的经节号，章节无记录时为 None
    async fn max_verse(
        &mut self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
    ) -> Result<Option<u32>, RepositoryError>;

    /// 结束快照并释放连接
    async fn finish(self: Box<Self>) -> Result<(), RepositoryError>;
}

//! SQLite Navigation Reader
//!
//! 每个快照是一个只读事务。WAL 模式下事务内的所有读取
//! 看到同一个已提交版本，并发的导入或删除不会混入。

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};

use super::book_repo::fetch_catalog;
use super::verse_repo::{fetch_max_verse, fetch_verse};
use super::DbPool;
use crate::application::ports::{NavigationReadPort, NavigationSnapshot, RepositoryError};
use crate::domain::CatalogBook;

/// SQLite Navigation Reader
pub struct SqliteNavigationReader {
    pool: DbPool,
}

impl SqliteNavigationReader {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NavigationReadPort for SqliteNavigationReader {
    async fn snapshot(&self) -> Result<Box<dyn NavigationSnapshot>, RepositoryError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(Box::new(SqliteNavigationSnapshot { tx }))
    }
}

struct SqliteNavigationSnapshot {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl NavigationSnapshot for SqliteNavigationSnapshot {
    async fn list_ordered(
        &mut self,
        resource_id: i64,
    ) -> Result<Vec<CatalogBook>, RepositoryError> {
        fetch_catalog(&mut *self.tx, resource_id).await
    }

    async fn verse_exists(
        &mut self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
        verse: u32,
    ) -> Result<bool, RepositoryError> {
        Ok(fetch_verse(&mut *self.tx, resource_id, book_id, chapter, verse)
            .await?
            .is_some())
    }

    async fn max_verse(
        &mut self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
    ) -> Result<Option<u32>, RepositoryError> {
        fetch_max_verse(&mut *self.tx, resource_id, book_id, chapter).await
    }

    async fn finish(self: Box<Self>) -> Result<(), RepositoryError> {
        // 只读事务，提交与回滚等价
        self.tx
            .commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}

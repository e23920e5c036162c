//! SQLite Book Lookup

use async_trait::async_trait;
use sqlx::{FromRow, SqliteConnection};

use super::DbPool;
use crate::application::ports::{BookLookupPort, BookRecord, RepositoryError};
use crate::domain::CatalogBook;

/// SQLite Book Lookup
pub struct SqliteBookLookup {
    pool: DbPool,
}

impl SqliteBookLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct BookRow {
    book_id: i64,
    book_code: String,
    book_name: String,
    chapter_count: i64,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        BookRecord {
            book_id: row.book_id,
            code: row.book_code,
            name: row.book_name,
            max_chapter: row.chapter_count as u32,
        }
    }
}

#[derive(FromRow)]
struct CatalogRow {
    book_id: i64,
    book_code: String,
    chapters: i64,
}

/// 资源书卷目录（在调用方连接/事务内）
pub(super) async fn fetch_catalog(
    conn: &mut SqliteConnection,
    resource_id: i64,
) -> Result<Vec<CatalogBook>, RepositoryError> {
    let rows: Vec<CatalogRow> = sqlx::query_as(
        r#"
        SELECT l.book_id, l.book_code, b.chapters
        FROM bible_books b
        JOIN book_lookup l ON l.book_id = b.book_id
        WHERE b.resource_id = ?
        ORDER BY l.book_id
        "#,
    )
    .bind(resource_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| CatalogBook {
            book_id: row.book_id,
            code: row.book_code,
            chapter_count: row.chapters as u32,
        })
        .collect())
}

#[async_trait]
impl BookLookupPort for SqliteBookLookup {
    async fn resolve(&self, code: &str) -> Result<Option<BookRecord>, RepositoryError> {
        // book_code 列为 COLLATE NOCASE
        let row: Option<BookRow> = sqlx::query_as(
            "SELECT book_id, book_code, book_name, chapter_count FROM book_lookup WHERE book_code = ?",
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(BookRecord::from))
    }

    async fn find_by_id(&self, book_id: i64) -> Result<Option<BookRecord>, RepositoryError> {
        let row: Option<BookRow> = sqlx::query_as(
            "SELECT book_id, book_code, book_name, chapter_count FROM book_lookup WHERE book_id = ?",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(BookRecord::from))
    }

    async fn find_all(&self) -> Result<Vec<BookRecord>, RepositoryError> {
        let rows: Vec<BookRow> = sqlx::query_as(
            "SELECT book_id, book_code, book_name, chapter_count FROM book_lookup ORDER BY book_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }

    async fn list_ordered(&self, resource_id: i64) -> Result<Vec<CatalogBook>, RepositoryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        fetch_catalog(&mut *conn, resource_id).await
    }
}

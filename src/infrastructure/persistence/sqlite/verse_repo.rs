//! SQLite Verse Store - 扁平经节存储

use async_trait::async_trait;
use sqlx::{FromRow, SqliteConnection};

use super::DbPool;
use crate::application::ports::{RepositoryError, VerseRecord, VerseStorePort};
use crate::domain::scripture::Verse;

/// 每批插入的行数
const BATCH_SIZE: usize = 500;

/// SQLite Verse Store
pub struct SqliteVerseStore {
    pool: DbPool,
}

impl SqliteVerseStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct VerseRow {
    resource_id: i64,
    book_id: i64,
    chapter: i64,
    verse: i64,
    text: String,
}

impl From<VerseRow> for VerseRecord {
    fn from(row: VerseRow) -> Self {
        VerseRecord {
            resource_id: row.resource_id,
            book_id: row.book_id,
            chapter: row.chapter as u32,
            verse: row.verse as u32,
            text: row.text,
        }
    }
}

/// 删除某资源下某书卷的全部经节（在调用方事务内）
pub(super) async fn delete_verses(
    conn: &mut SqliteConnection,
    resource_id: i64,
    book_id: i64,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM clean_verses WHERE resource_id = ? AND book_id = ?")
        .bind(resource_id)
        .bind(book_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected())
}

/// 批量插入经节（在调用方事务内）
///
/// 重复的 (章, 节) 以最后一条为准。
pub(super) async fn insert_verses(
    conn: &mut SqliteConnection,
    resource_id: i64,
    book_id: i64,
    verses: &[Verse],
) -> Result<(), RepositoryError> {
    for chunk in verses.chunks(BATCH_SIZE) {
        let mut query = String::from(
            "INSERT INTO clean_verses (resource_id, book_id, chapter, verse, text) VALUES ",
        );

        let placeholders: Vec<&str> = chunk.iter().map(|_| "(?, ?, ?, ?, ?)").collect();
        query.push_str(&placeholders.join(", "));

        query.push_str(
            " ON CONFLICT(resource_id, book_id, chapter, verse) DO UPDATE SET text = excluded.text",
        );

        let mut sql_query = sqlx::query(&query);
        for verse in chunk {
            sql_query = sql_query
                .bind(resource_id)
                .bind(book_id)
                .bind(verse.chapter() as i64)
                .bind(verse.verse() as i64)
                .bind(verse.text());
        }

        sql_query
            .execute(&mut *conn)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
    }

    Ok(())
}

/// 查询单个经节（在调用方连接/事务内）
pub(super) async fn fetch_verse(
    conn: &mut SqliteConnection,
    resource_id: i64,
    book_id: i64,
    chapter: u32,
    verse: u32,
) -> Result<Option<VerseRecord>, RepositoryError> {
    let row: Option<VerseRow> = sqlx::query_as(
        r#"
        SELECT resource_id, book_id, chapter, verse, text FROM clean_verses
        WHERE resource_id = ? AND book_id = ? AND chapter = ? AND verse = ?
        "#,
    )
    .bind(resource_id)
    .bind(book_id)
    .bind(chapter as i64)
    .bind(verse as i64)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    Ok(row.map(VerseRecord::from))
}

/// 某章最大经节号（在调用方连接/事务内）
pub(super) async fn fetch_max_verse(
    conn: &mut SqliteConnection,
    resource_id: i64,
    book_id: i64,
    chapter: u32,
) -> Result<Option<u32>, RepositoryError> {
    let max: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(verse) FROM clean_verses WHERE resource_id = ? AND book_id = ? AND chapter = ?",
    )
    .bind(resource_id)
    .bind(book_id)
    .bind(chapter as i64)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    Ok(max.map(|v| v as u32))
}

#[async_trait]
impl VerseStorePort for SqliteVerseStore {
    async fn replace_all(
        &self,
        resource_id: i64,
        book_id: i64,
        verses: &[Verse],
    ) -> Result<(), RepositoryError> {
        // 失败时回滚，旧经节保持可查询
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let removed = delete_verses(&mut *tx, resource_id, book_id).await?;
        insert_verses(&mut *tx, resource_id, book_id, verses).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(
            resource_id,
            book_id,
            removed,
            inserted = verses.len(),
            "Verse store replaced"
        );

        Ok(())
    }

    async fn get(
        &self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
        verse: u32,
    ) -> Result<Option<VerseRecord>, RepositoryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        fetch_verse(&mut *conn, resource_id, book_id, chapter, verse).await
    }

    async fn max_verse(
        &self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
    ) -> Result<Option<u32>, RepositoryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        fetch_max_verse(&mut *conn, resource_id, book_id, chapter).await
    }

    async fn list_chapter(
        &self,
        resource_id: i64,
        book_id: i64,
        chapter: u32,
    ) -> Result<Vec<VerseRecord>, RepositoryError> {
        let rows: Vec<VerseRow> = sqlx::query_as(
            r#"
            SELECT resource_id, book_id, chapter, verse, text FROM clean_verses
            WHERE resource_id = ? AND book_id = ? AND chapter = ?
            ORDER BY verse
            "#,
        )
        .bind(resource_id)
        .bind(book_id)
        .bind(chapter as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(VerseRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ContentType, ResourceRepositoryPort};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteResourceRepository,
    };

    async fn store() -> (SqliteVerseStore, i64) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let resource = SqliteResourceRepository::new(pool.clone())
            .create("Test", ContentType::Bible)
            .await
            .unwrap();
        (SqliteVerseStore::new(pool), resource.resource_id)
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_set() {
        let (store, rid) = store().await;
        store
            .replace_all(rid, 1, &[Verse::new(1, 1, "kept"), Verse::new(1, 2, "kept")])
            .await
            .unwrap();

        // 节号为 0 的经节位于第二批，插入中途失败
        sqlx::query(
            "CREATE TRIGGER reject_zero BEFORE INSERT ON clean_verses WHEN NEW.verse = 0 \
             BEGIN SELECT RAISE(ABORT, 'verse zero'); END",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let mut verses: Vec<Verse> = (1..=700).map(|v| Verse::new(1, v, "new")).collect();
        verses.push(Verse::new(1, 0, "bad"));
        assert!(store.replace_all(rid, 1, &verses).await.is_err());

        let chapter = store.list_chapter(rid, 1, 1).await.unwrap();
        let texts: Vec<&str> = chapter.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, vec!["kept", "kept"]);
    }

    #[tokio::test]
    async fn test_replace_and_read_back() {
        let (store, rid) = store().await;
        let verses = vec![
            Verse::new(1, 2, "two"),
            Verse::new(1, 1, "one"),
            Verse::new(2, 1, "next chapter"),
        ];
        store.replace_all(rid, 1, &verses).await.unwrap();

        let chapter = store.list_chapter(rid, 1, 1).await.unwrap();
        let numbers: Vec<u32> = chapter.iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![1, 2]);

        assert_eq!(store.max_verse(rid, 1, 1).await.unwrap(), Some(2));
        assert_eq!(store.max_verse(rid, 1, 3).await.unwrap(), None);

        let verse = store.get(rid, 1, 2, 1).await.unwrap().unwrap();
        assert_eq!(verse.text, "next chapter");
        assert!(store.get(rid, 1, 2, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_discards_previous_set() {
        let (store, rid) = store().await;
        store
            .replace_all(rid, 1, &[Verse::new(1, 1, "old"), Verse::new(1, 2, "old")])
            .await
            .unwrap();
        store
            .replace_all(rid, 1, &[Verse::new(1, 1, "new")])
            .await
            .unwrap();

        let chapter = store.list_chapter(rid, 1, 1).await.unwrap();
        assert_eq!(chapter.len(), 1);
        assert_eq!(chapter[0].text, "new");
    }

    #[tokio::test]
    async fn test_duplicate_numbers_keep_last() {
        let (store, rid) = store().await;
        store
            .replace_all(
                rid,
                1,
                &[
                    Verse::new(1, 4, "first"),
                    Verse::new(1, 5, "first"),
                    Verse::new(1, 5, "second"),
                ],
            )
            .await
            .unwrap();

        let verse = store.get(rid, 1, 1, 5).await.unwrap().unwrap();
        assert_eq!(verse.text, "second");
        assert_eq!(store.list_chapter(rid, 1, 1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_large_replace_spans_batches() {
        let (store, rid) = store().await;
        let verses: Vec<Verse> = (1..=1200).map(|v| Verse::new(119, v, "text")).collect();
        store.replace_all(rid, 19, &verses).await.unwrap();

        assert_eq!(store.max_verse(rid, 19, 119).await.unwrap(), Some(1200));
    }

    #[tokio::test]
    async fn test_books_are_isolated() {
        let (store, rid) = store().await;
        store
            .replace_all(rid, 1, &[Verse::new(1, 1, "gen")])
            .await
            .unwrap();
        store
            .replace_all(rid, 2, &[Verse::new(1, 1, "exo")])
            .await
            .unwrap();
        store.replace_all(rid, 1, &[]).await.unwrap();

        assert!(store.get(rid, 1, 1, 1).await.unwrap().is_none());
        assert_eq!(store.get(rid, 2, 1, 1).await.unwrap().unwrap().text, "exo");
    }
}

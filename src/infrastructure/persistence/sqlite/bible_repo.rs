//! SQLite Bible Repository
//!
//! 书卷行 (bible_books) 与扁平经节 (clean_verses) 在同一事务内维护。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};

use super::database::is_unique_violation;
use super::verse_repo::{delete_verses, insert_verses};
use super::DbPool;
use crate::application::ports::{
    BibleBookRecord, BibleBookSummary, BibleRepositoryPort, NewBibleBook, RepositoryError,
};
use crate::domain::scripture::{UsjDocument, Verse};

/// SQLite Bible Repository
pub struct SqliteBibleRepository {
    pool: DbPool,
}

impl SqliteBibleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_BOOK: &str = "SELECT bible_book_id, resource_id, book_id, usfm, usj, chapters, created_at, updated_at FROM bible_books";

#[derive(FromRow)]
struct BibleBookRow {
    bible_book_id: i64,
    resource_id: i64,
    book_id: i64,
    usfm: String,
    usj: String,
    chapters: i64,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
        .with_timezone(&Utc))
}

impl TryFrom<BibleBookRow> for BibleBookRecord {
    type Error = RepositoryError;

    fn try_from(row: BibleBookRow) -> Result<Self, Self::Error> {
        Ok(BibleBookRecord {
            bible_book_id: row.bible_book_id,
            resource_id: row.resource_id,
            book_id: row.book_id,
            usfm: row.usfm,
            usj: UsjDocument::from_json(&row.usj)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            chapters: row.chapters as u32,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct SummaryRow {
    bible_book_id: i64,
    resource_id: i64,
    book_id: i64,
    book_code: String,
    book_name: String,
    chapters: i64,
}

impl From<SummaryRow> for BibleBookSummary {
    fn from(row: SummaryRow) -> Self {
        BibleBookSummary {
            bible_book_id: row.bible_book_id,
            resource_id: row.resource_id,
            book_id: row.book_id,
            book_code: row.book_code,
            book_name: row.book_name,
            chapters: row.chapters as u32,
        }
    }
}

fn serialize_usj(usj: &UsjDocument) -> Result<String, RepositoryError> {
    serde_json::to_string(usj).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

async fn fetch_by_id(
    conn: &mut SqliteConnection,
    bible_book_id: i64,
) -> Result<Option<BibleBookRecord>, RepositoryError> {
    let row: Option<BibleBookRow> = sqlx::query_as(&format!("{SELECT_BOOK} WHERE bible_book_id = ?"))
        .bind(bible_book_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    row.map(BibleBookRecord::try_from).transpose()
}

#[async_trait]
impl BibleRepositoryPort for SqliteBibleRepository {
    async fn create_with_verses(
        &self,
        book: &NewBibleBook,
        verses: &[Verse],
    ) -> Result<BibleBookRecord, RepositoryError> {
        let usj = serialize_usj(&book.usj)?;
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO bible_books (resource_id, book_id, usfm, usj, chapters, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(book.resource_id)
        .bind(book.book_id)
        .bind(&book.usfm)
        .bind(&usj)
        .bind(book.chapters as i64)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Duplicate(format!(
                    "book {} in resource {}",
                    book.book_id, book.resource_id
                ))
            } else {
                RepositoryError::DatabaseError(e.to_string())
            }
        })?;
        let bible_book_id = result.last_insert_rowid();

        // 清理可能残留的孤立经节
        delete_verses(&mut *tx, book.resource_id, book.book_id).await?;
        insert_verses(&mut *tx, book.resource_id, book.book_id, verses).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(BibleBookRecord {
            bible_book_id,
            resource_id: book.resource_id,
            book_id: book.book_id,
            usfm: book.usfm.clone(),
            usj: book.usj.clone(),
            chapters: book.chapters,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_with_verses(
        &self,
        bible_book_id: i64,
        book: &NewBibleBook,
        verses: &[Verse],
    ) -> Result<BibleBookRecord, RepositoryError> {
        let usj = serialize_usj(&book.usj)?;
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE bible_books SET usfm = ?, usj = ?, chapters = ?, updated_at = ? WHERE bible_book_id = ?",
        )
        .bind(&book.usfm)
        .bind(&usj)
        .bind(book.chapters as i64)
        .bind(now.to_rfc3339())
        .bind(bible_book_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "bible book {}",
                bible_book_id
            )));
        }

        let record = fetch_by_id(&mut *tx, bible_book_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("bible book {}", bible_book_id)))?;

        delete_verses(&mut *tx, record.resource_id, record.book_id).await?;
        insert_verses(&mut *tx, record.resource_id, record.book_id, verses).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(record)
    }

    async fn find_by_id(
        &self,
        bible_book_id: i64,
    ) -> Result<Option<BibleBookRecord>, RepositoryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        fetch_by_id(&mut *conn, bible_book_id).await
    }

    async fn find_by_resource_and_book(
        &self,
        resource_id: i64,
        book_id: i64,
    ) -> Result<Option<BibleBookRecord>, RepositoryError> {
        let row: Option<BibleBookRow> =
            sqlx::query_as(&format!("{SELECT_BOOK} WHERE resource_id = ? AND book_id = ?"))
                .bind(resource_id)
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(BibleBookRecord::try_from).transpose()
    }

    async fn list_summaries(
        &self,
        resource_id: Option<i64>,
    ) -> Result<Vec<BibleBookSummary>, RepositoryError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT b.bible_book_id, b.resource_id, b.book_id, l.book_code, l.book_name, b.chapters
            FROM bible_books b
            JOIN book_lookup l ON l.book_id = b.book_id
            JOIN resources r ON r.resource_id = b.resource_id
            WHERE r.content_type = 'bible' AND (? IS NULL OR b.resource_id = ?)
            ORDER BY b.resource_id, b.book_id
            "#,
        )
        .bind(resource_id)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(BibleBookSummary::from).collect())
    }

    async fn delete_with_verses(
        &self,
        resource_id: i64,
        book_id: i64,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let removed_verses = delete_verses(&mut *tx, resource_id, book_id).await?;

        let result = sqlx::query("DELETE FROM bible_books WHERE resource_id = ? AND book_id = ?")
            .bind(resource_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(resource_id, book_id, removed_verses, "Bible book deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ContentType, ResourceRepositoryPort, VerseStorePort};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteResourceRepository, SqliteVerseStore,
    };

    struct Fixture {
        pool: DbPool,
        bible: SqliteBibleRepository,
        verses: SqliteVerseStore,
        resources: SqliteResourceRepository,
        resource_id: i64,
    }

    async fn fixture() -> Fixture {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let resources = SqliteResourceRepository::new(pool.clone());
        let resource = resources.create("IRV", ContentType::Bible).await.unwrap();
        Fixture {
            bible: SqliteBibleRepository::new(pool.clone()),
            verses: SqliteVerseStore::new(pool.clone()),
            pool,
            resources,
            resource_id: resource.resource_id,
        }
    }

    fn new_book(resource_id: i64, book_id: i64, usfm: &str, chapters: u32) -> NewBibleBook {
        NewBibleBook {
            resource_id,
            book_id,
            usfm: usfm.to_string(),
            usj: UsjDocument::new(Vec::new()),
            chapters,
        }
    }

    #[tokio::test]
    async fn test_create_persists_book_and_verses() {
        let f = fixture().await;
        let created = f
            .bible
            .create_with_verses(
                &new_book(f.resource_id, 1, "\\id GEN", 1),
                &[Verse::new(1, 1, "In the beginning"), Verse::new(1, 2, "And")],
            )
            .await
            .unwrap();

        let found = f.bible.find_by_id(created.bible_book_id).await.unwrap().unwrap();
        assert_eq!(found.usfm, "\\id GEN");
        assert_eq!(found.usj, UsjDocument::new(Vec::new()));
        assert_eq!(found.chapters, 1);

        let by_book = f
            .bible
            .find_by_resource_and_book(f.resource_id, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_book.bible_book_id, created.bible_book_id);

        assert_eq!(f.verses.max_verse(f.resource_id, 1, 1).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected() {
        let f = fixture().await;
        let book = new_book(f.resource_id, 1, "\\id GEN", 1);
        f.bible
            .create_with_verses(&book, &[Verse::new(1, 1, "first")])
            .await
            .unwrap();

        let err = f
            .bible
            .create_with_verses(&book, &[Verse::new(1, 1, "second")])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));

        // 失败的写入不影响已有经节
        let verse = f.verses.get(f.resource_id, 1, 1, 1).await.unwrap().unwrap();
        assert_eq!(verse.text, "first");
    }

    #[tokio::test]
    async fn test_update_replaces_verses() {
        let f = fixture().await;
        let created = f
            .bible
            .create_with_verses(
                &new_book(f.resource_id, 1, "old", 2),
                &[Verse::new(1, 1, "old"), Verse::new(2, 1, "old")],
            )
            .await
            .unwrap();

        let updated = f
            .bible
            .update_with_verses(
                created.bible_book_id,
                &new_book(f.resource_id, 1, "new", 1),
                &[Verse::new(1, 1, "new")],
            )
            .await
            .unwrap();
        assert_eq!(updated.usfm, "new");
        assert_eq!(updated.chapters, 1);
        assert_eq!(updated.created_at, created.created_at);

        assert!(f.verses.list_chapter(f.resource_id, 1, 2).await.unwrap().is_empty());
        let verse = f.verses.get(f.resource_id, 1, 1, 1).await.unwrap().unwrap();
        assert_eq!(verse.text, "new");
    }

    /// 经节文本为 "poison" 时中止插入
    async fn install_failing_trigger(pool: &DbPool) {
        sqlx::query(
            r#"
            CREATE TRIGGER reject_poison BEFORE INSERT ON clean_verses
            WHEN NEW.text = 'poison'
            BEGIN
                SELECT RAISE(ABORT, 'poisoned verse');
            END
            "#,
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_book_and_verses() {
        let f = fixture().await;
        let created = f
            .bible
            .create_with_verses(
                &new_book(f.resource_id, 1, "old", 2),
                &[Verse::new(1, 1, "old one"), Verse::new(2, 1, "old two")],
            )
            .await
            .unwrap();
        install_failing_trigger(&f.pool).await;

        // 第一批 500 条写入成功，第二批中途失败
        let mut verses: Vec<Verse> = (1..=600).map(|v| Verse::new(1, v, "new")).collect();
        verses[549] = Verse::new(1, 550, "poison");

        let err = f
            .bible
            .update_with_verses(
                created.bible_book_id,
                &new_book(f.resource_id, 1, "new", 1),
                &verses,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DatabaseError(_)));

        let found = f.bible.find_by_id(created.bible_book_id).await.unwrap().unwrap();
        assert_eq!(found.usfm, "old");
        assert_eq!(found.chapters, 2);
        assert_eq!(found.updated_at, created.updated_at);

        let chapter_one = f.verses.list_chapter(f.resource_id, 1, 1).await.unwrap();
        assert_eq!(chapter_one.len(), 1);
        assert_eq!(chapter_one[0].text, "old one");
        let verse = f.verses.get(f.resource_id, 1, 2, 1).await.unwrap().unwrap();
        assert_eq!(verse.text, "old two");
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_book_row() {
        let f = fixture().await;
        install_failing_trigger(&f.pool).await;

        let verses: Vec<Verse> = (1..=501)
            .map(|v| Verse::new(1, v, if v == 501 { "poison" } else { "text" }))
            .collect();
        assert!(f
            .bible
            .create_with_verses(&new_book(f.resource_id, 1, "gen", 1), &verses)
            .await
            .is_err());

        assert!(f
            .bible
            .find_by_resource_and_book(f.resource_id, 1)
            .await
            .unwrap()
            .is_none());
        assert_eq!(f.verses.max_verse(f.resource_id, 1, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_book() {
        let f = fixture().await;
        let err = f
            .bible
            .update_with_verses(99, &new_book(f.resource_id, 1, "x", 1), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_summaries_only_bible_resources() {
        let f = fixture().await;
        let video = f.resources.create("Videos", ContentType::Video).await.unwrap();
        let second = f.resources.create("Second", ContentType::Bible).await.unwrap();

        for (resource_id, book_id) in [(second.resource_id, 2), (f.resource_id, 2), (f.resource_id, 1)] {
            f.bible
                .create_with_verses(&new_book(resource_id, book_id, "x", 1), &[])
                .await
                .unwrap();
        }
        f.bible
            .create_with_verses(&new_book(video.resource_id, 1, "x", 1), &[])
            .await
            .unwrap();

        let all = f.bible.list_summaries(None).await.unwrap();
        let keys: Vec<(i64, &str)> = all
            .iter()
            .map(|s| (s.resource_id, s.book_code.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (f.resource_id, "GEN"),
                (f.resource_id, "EXO"),
                (second.resource_id, "EXO"),
            ]
        );

        let one = f.bible.list_summaries(Some(second.resource_id)).await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].book_name, "Exodus");
    }

    #[tokio::test]
    async fn test_delete_removes_book_and_verses() {
        let f = fixture().await;
        f.bible
            .create_with_verses(&new_book(f.resource_id, 1, "x", 1), &[Verse::new(1, 1, "a")])
            .await
            .unwrap();

        assert!(f.bible.delete_with_verses(f.resource_id, 1).await.unwrap());
        assert!(!f.bible.delete_with_verses(f.resource_id, 1).await.unwrap());
        assert!(f
            .bible
            .find_by_resource_and_book(f.resource_id, 1)
            .await
            .unwrap()
            .is_none());
        assert!(f.verses.get(f.resource_id, 1, 1, 1).await.unwrap().is_none());
    }
}

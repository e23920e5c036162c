//! SQLite Database - 数据库连接和迁移

use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

use crate::domain::scripture::CANON;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/isl_admin.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>, max_connections: u32) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    // 启用 WAL 模式，允许并发读写
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await?;

    // 设置 busy_timeout=5000ms，遇到锁时等待而不是立即失败
    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA synchronous=NORMAL")
        .execute(&pool)
        .await?;

    tracing::info!(
        url = %config.database_url,
        max_connections = config.max_connections,
        "SQLite pool created with WAL mode and busy_timeout=5000ms"
    );

    Ok(pool)
}

/// 运行数据库迁移，并在书卷表为空时写入正典书卷
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 正典书卷表，book_id 即正典顺序
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_lookup (
            book_id INTEGER PRIMARY KEY,
            book_code TEXT NOT NULL UNIQUE COLLATE NOCASE,
            book_name TEXT NOT NULL,
            chapter_count INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            resource_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            content_type TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 书卷原文（USFM）与解析结果（USJ）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bible_books (
            bible_book_id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id INTEGER NOT NULL,
            book_id INTEGER NOT NULL,
            usfm TEXT NOT NULL,
            usj TEXT NOT NULL,
            chapters INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (resource_id) REFERENCES resources(resource_id),
            FOREIGN KEY (book_id) REFERENCES book_lookup(book_id),
            UNIQUE (resource_id, book_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 扁平经节
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clean_verses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id INTEGER NOT NULL,
            book_id INTEGER NOT NULL,
            chapter INTEGER NOT NULL,
            verse INTEGER NOT NULL,
            text TEXT NOT NULL,
            FOREIGN KEY (resource_id) REFERENCES resources(resource_id),
            FOREIGN KEY (book_id) REFERENCES book_lookup(book_id),
            UNIQUE (resource_id, book_id, chapter, verse)
        )
        "#,
    )
    .execute(pool)
    .await?;

    seed_book_lookup(pool).await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

async fn seed_book_lookup(pool: &DbPool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_lookup")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (book_id, code, name, chapters) in CANON {
        sqlx::query(
            "INSERT INTO book_lookup (book_id, book_code, book_name, chapter_count) VALUES (?, ?, ?, ?)",
        )
        .bind(*book_id)
        .bind(*code)
        .bind(*name)
        .bind(*chapters as i64)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(books = CANON.len(), "Book lookup seeded");
    Ok(())
}

/// 唯一约束冲突
pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}

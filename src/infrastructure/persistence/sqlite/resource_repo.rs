//! SQLite Resource Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    ContentType, RepositoryError, ResourceRecord, ResourceRepositoryPort,
};

/// SQLite Resource Repository
pub struct SqliteResourceRepository {
    pool: DbPool,
}

impl SqliteResourceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ResourceRow {
    resource_id: i64,
    name: String,
    content_type: String,
    created_at: String,
}

impl TryFrom<ResourceRow> for ResourceRecord {
    type Error = RepositoryError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        Ok(ResourceRecord {
            resource_id: row.resource_id,
            name: row.name,
            content_type: ContentType::from_str(&row.content_type).ok_or_else(|| {
                RepositoryError::SerializationError(format!(
                    "unknown content type: {}",
                    row.content_type
                ))
            })?,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl ResourceRepositoryPort for SqliteResourceRepository {
    async fn create(
        &self,
        name: &str,
        content_type: ContentType,
    ) -> Result<ResourceRecord, RepositoryError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO resources (name, content_type, created_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(content_type.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(ResourceRecord {
            resource_id: result.last_insert_rowid(),
            name: name.to_string(),
            content_type,
            created_at,
        })
    }

    async fn find_by_id(
        &self,
        resource_id: i64,
    ) -> Result<Option<ResourceRecord>, RepositoryError> {
        let row: Option<ResourceRow> = sqlx::query_as(
            "SELECT resource_id, name, content_type, created_at FROM resources WHERE resource_id = ?",
        )
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(ResourceRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ResourceRecord>, RepositoryError> {
        let rows: Vec<ResourceRow> = sqlx::query_as(
            "SELECT resource_id, name, content_type, created_at FROM resources ORDER BY resource_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ResourceRecord::try_from).collect()
    }
}

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use super::SqliteRepository;
use crate::repository::{CollectionKey, CollectionStore, StorageError};

#[async_trait]
impl CollectionStore for SqliteRepository {
    async fn get_raw(&self, key: CollectionKey) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM collections WHERE name = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| r.try_get::<String, _>("value"))
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn set_raw(&self, key: CollectionKey, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO collections (name, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        debug!(collection = %key, bytes = value.len(), "wrote collection");
        Ok(())
    }
}

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{SCORE_MATRIX_KEY, ScoreMatrixRecord, ScoreRepository, StorageError};

use super::SqliteRepository;

#[async_trait]
impl ScoreRepository for SqliteRepository {
    async fn load_scores(&self) -> Result<Option<ScoreMatrixRecord>, StorageError> {
        let row = sqlx::query("SELECT payload FROM score_blobs WHERE key = ?1")
            .bind(SCORE_MATRIX_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        ScoreMatrixRecord::from_json(&payload).map(Some)
    }

    async fn save_scores(&self, record: &ScoreMatrixRecord) -> Result<(), StorageError> {
        let payload = record.to_json()?;
        sqlx::query(
            r"
            INSERT INTO score_blobs (key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(SCORE_MATRIX_KEY)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

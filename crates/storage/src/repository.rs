use async_trait::async_trait;
use mathulator_core::model::{DifficultyBounds, ScoreMatrix, ScoreMatrixError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Name under which the best-streak matrix is stored.
pub const SCORE_MATRIX_KEY: &str = "high_score_matrix";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the score matrix: one inner array per difficulty, one
/// value per operator in column order.
///
/// Values are kept as `i64` so a damaged blob still decodes and can be
/// rejected by the domain with a precise reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMatrixRecord {
    pub rows: Vec<Vec<i64>>,
}

impl ScoreMatrixRecord {
    #[must_use]
    pub fn from_matrix(matrix: &ScoreMatrix) -> Self {
        Self {
            rows: matrix.to_rows(),
        }
    }

    /// Convert the record back into a domain matrix sized for `bounds`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreMatrixError` if a row has the wrong width or a cell is not a
    /// valid streak.
    pub fn into_matrix(self, bounds: DifficultyBounds) -> Result<ScoreMatrix, ScoreMatrixError> {
        ScoreMatrix::from_rows(&self.rows, bounds)
    }

    /// Encode as a JSON nested array, e.g. `[[0,3,0,0],[1,0,0,0]]`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if `raw` is not a nested integer array.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Load/save contract for the best-streak matrix.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Fetch the stored matrix, `None` on first run.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob cannot be decoded.
    async fn load_scores(&self) -> Result<Option<ScoreMatrixRecord>, StorageError>;

    /// Replace the stored matrix.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the matrix cannot be stored.
    async fn save_scores(&self, record: &ScoreMatrixRecord) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<Option<ScoreMatrixRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that already holds `record`, as if saved by an earlier run.
    #[must_use]
    pub fn with_scores(record: ScoreMatrixRecord) -> Self {
        Self {
            scores: Arc::new(Mutex::new(Some(record))),
        }
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn load_scores(&self) -> Result<Option<ScoreMatrixRecord>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_scores(&self, record: &ScoreMatrixRecord) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }
}

/// Holds the score repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let scores: Arc<dyn ScoreRepository> = Arc::new(InMemoryRepository::new());
        Self { scores }
    }
}

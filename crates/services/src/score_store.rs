use std::sync::Arc;

use mathulator_core::model::{DifficultyBounds, Operator, ScoreMatrix};
use storage::repository::{ScoreMatrixRecord, ScoreRepository};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ScoreStoreError;

/// Owner of the durable best-streak matrix.
///
/// Every mutation runs read-compare-write under one lock and saves before the
/// new value becomes visible, so concurrent updates never lose a higher streak
/// and readers only ever observe committed values. A failed save leaves the
/// in-memory matrix untouched.
pub struct ScoreStore {
    bounds: DifficultyBounds,
    matrix: Mutex<ScoreMatrix>,
    repo: Arc<dyn ScoreRepository>,
}

impl ScoreStore {
    /// Load the persisted matrix, falling back to zeros when it is absent,
    /// unreadable or malformed.
    ///
    /// A matrix saved under different bounds is resized (see
    /// `ScoreMatrix::from_rows`) instead of being discarded.
    pub async fn initialize(repo: Arc<dyn ScoreRepository>, bounds: DifficultyBounds) -> Self {
        let matrix = match repo.load_scores().await {
            Ok(Some(record)) => {
                let stored_rows = record.rows.len();
                match record.into_matrix(bounds) {
                    Ok(matrix) => {
                        if stored_rows != bounds.levels() {
                            warn!(
                                stored_rows,
                                expected_rows = bounds.levels(),
                                "resized stored score matrix to current difficulty bounds"
                            );
                        }
                        matrix
                    }
                    Err(err) => {
                        warn!(%err, "discarding malformed score matrix");
                        ScoreMatrix::new(bounds)
                    }
                }
            }
            Ok(None) => {
                debug!("no stored score matrix, starting from zero");
                ScoreMatrix::new(bounds)
            }
            Err(err) => {
                warn!(%err, "could not load score matrix, starting from zero");
                ScoreMatrix::new(bounds)
            }
        };

        Self {
            bounds,
            matrix: Mutex::new(matrix),
            repo,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> DifficultyBounds {
        self.bounds
    }

    /// Best streak for the cell; zero for difficulties outside the bounds.
    pub async fn high_score(&self, difficulty: i32, op: Operator) -> u32 {
        self.matrix.lock().await.get(difficulty, op)
    }

    /// Record `streak` if it beats the stored best. Returns `true` when the
    /// cell changed and was saved.
    ///
    /// Out-of-range difficulties and non-improving streaks are no-ops and do
    /// not touch storage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreStoreError::Storage` if the save fails.
    pub async fn update_if_higher(
        &self,
        streak: u32,
        difficulty: i32,
        op: Operator,
    ) -> Result<bool, ScoreStoreError> {
        let mut current = self.matrix.lock().await;
        let mut next = current.clone();
        if !next.raise(difficulty, op, streak) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *current = next;
        info!(difficulty, operator = %op, streak, "new best streak");
        Ok(true)
    }

    /// Set the cell to zero and save, whatever its current value. Returns
    /// `false` without saving when `difficulty` is out of range.
    ///
    /// # Errors
    ///
    /// Returns `ScoreStoreError::Storage` if the save fails.
    pub async fn reset(&self, difficulty: i32, op: Operator) -> Result<bool, ScoreStoreError> {
        let mut current = self.matrix.lock().await;
        let mut next = current.clone();
        if !next.clear(difficulty, op) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *current = next;
        info!(difficulty, operator = %op, "best streak reset");
        Ok(true)
    }

    /// Copy of the whole matrix, for score tables.
    pub async fn snapshot(&self) -> ScoreMatrix {
        self.matrix.lock().await.clone()
    }

    async fn persist(&self, matrix: &ScoreMatrix) -> Result<(), ScoreStoreError> {
        self.repo
            .save_scores(&ScoreMatrixRecord::from_matrix(matrix))
            .await?;
        debug!("score matrix saved");
        Ok(())
    }
}

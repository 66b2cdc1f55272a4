use std::sync::Arc;

use mathulator_core::model::DifficultyBounds;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::practice::{PracticeConfig, PracticeSession};
use crate::score_store::ScoreStore;

/// Assembles the score store and hands out practice sessions bound to it.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    scores: Arc<ScoreStore>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        bounds: DifficultyBounds,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, bounds).await)
    }

    /// Build services over an existing storage aggregate.
    pub async fn from_storage(storage: &Storage, clock: Clock, bounds: DifficultyBounds) -> Self {
        let scores = Arc::new(ScoreStore::initialize(Arc::clone(&storage.scores), bounds).await);
        Self { clock, scores }
    }

    #[must_use]
    pub fn scores(&self) -> Arc<ScoreStore> {
        Arc::clone(&self.scores)
    }

    /// Start a practice session; `seed` makes the problem sequence reproducible.
    #[must_use]
    pub fn practice(&self, config: PracticeConfig, seed: Option<u64>) -> PracticeSession {
        let session = match seed {
            Some(seed) => PracticeSession::seeded(self.scores(), config, seed),
            None => PracticeSession::new(self.scores(), config),
        };
        session.with_clock(self.clock)
    }
}

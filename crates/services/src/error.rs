//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ScoreStore` mutations.
///
/// Loading never fails; only a failed save is reported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoreStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PracticeSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error(transparent)]
    Scores(#[from] ScoreStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

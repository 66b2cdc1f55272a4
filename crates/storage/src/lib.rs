#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, SCORE_MATRIX_KEY, ScoreMatrixRecord, ScoreRepository, Storage,
    StorageError,
};

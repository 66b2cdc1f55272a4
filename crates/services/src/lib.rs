#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod practice;
pub mod score_store;

pub use mathulator_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, PracticeError, ScoreStoreError};
pub use practice::{AnswerOutcome, PracticeConfig, PracticeSession};
pub use score_store::ScoreStore;

mod difficulty;
mod history;
mod operator;
mod problem;
mod score;
mod trophy;

pub use difficulty::{
    DEFAULT_MAX_DIFFICULTY, DEFAULT_MIN_DIFFICULTY, DifficultyBounds, DifficultyError,
};
pub use history::{AnswerHistory, DEFAULT_HISTORY_CAPACITY, HistoryEntry};
pub use operator::{Operator, OperatorParseError};
pub use problem::{Problem, parse_guess};
pub use score::{ScoreMatrix, ScoreMatrixError, ScoreRow};
pub use trophy::TrophyTier;

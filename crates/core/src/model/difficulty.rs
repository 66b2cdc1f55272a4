use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MIN_DIFFICULTY: i32 = 6;
pub const DEFAULT_MAX_DIFFICULTY: i32 = 35;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DifficultyError {
    #[error("minimum difficulty must be non-negative, got {min}")]
    NegativeMinimum { min: i32 },
    #[error("difficulty bounds are inverted: min {min} > max {max}")]
    Inverted { min: i32, max: i32 },
}

/// Inclusive range of difficulty levels shared by the generator and the score matrix.
///
/// Row `0` of the score matrix belongs to `min`, row `max - min` to `max`.
///
/// # Examples
///
/// ```
/// # use mathulator_core::model::DifficultyBounds;
/// let bounds = DifficultyBounds::default();
/// assert_eq!(bounds.row_of(6), Some(0));
/// assert_eq!(bounds.row_of(36), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBounds {
    min: i32,
    max: i32,
}

impl DifficultyBounds {
    /// # Errors
    ///
    /// Returns `DifficultyError` if `min` is negative or greater than `max`.
    pub fn new(min: i32, max: i32) -> Result<Self, DifficultyError> {
        if min < 0 {
            return Err(DifficultyError::NegativeMinimum { min });
        }
        if min > max {
            return Err(DifficultyError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Number of difficulty levels, i.e. score matrix rows.
    #[must_use]
    pub fn levels(&self) -> usize {
        usize::try_from(self.max - self.min).map_or(0, |span| span + 1)
    }

    #[must_use]
    pub fn contains(&self, difficulty: i32) -> bool {
        (self.min..=self.max).contains(&difficulty)
    }

    /// Score matrix row for `difficulty`, or `None` when it lies outside the bounds.
    #[must_use]
    pub fn row_of(&self, difficulty: i32) -> Option<usize> {
        if !self.contains(difficulty) {
            return None;
        }
        usize::try_from(difficulty - self.min).ok()
    }

    /// Clamp a slider value into the bounds. `NaN` maps to `min`.
    #[must_use]
    pub fn clamp(&self, difficulty: f64) -> f64 {
        if difficulty.is_nan() {
            return f64::from(self.min);
        }
        difficulty.clamp(f64::from(self.min), f64::from(self.max))
    }

    #[must_use]
    pub fn iter(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }
}

impl Default for DifficultyBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_DIFFICULTY,
            max: DEFAULT_MAX_DIFFICULTY,
        }
    }
}

use std::ops::RangeInclusive;

use rand::Rng;

use crate::model::{Operator, Problem};

/// Highest difficulty `generate` honours; larger inputs are treated as this value.
///
/// Keeps every product and every extended division range inside `i64`.
pub const MAX_GENERATOR_DIFFICULTY: f64 = 60.0;

/// Widening applied to the difficulty when picking a dividend range.
const DIVIDEND_HEADROOM: f64 = 1.8;

/// Ceiling for [`range_for_difficulty`] itself, `10^18` still fits `i64`.
const RANGE_DIFFICULTY_CEILING: f64 = 180.0;

/// Inclusive operand range for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandRange {
    pub lower: i64,
    pub upper: i64,
}

impl OperandRange {
    #[must_use]
    pub fn as_range(&self) -> RangeInclusive<i64> {
        self.lower..=self.upper
    }
}

fn sanitize(difficulty: f64, ceiling: f64) -> f64 {
    if difficulty.is_nan() {
        return 0.0;
    }
    difficulty.clamp(0.0, ceiling)
}

/// Map a linear difficulty onto an exponentially growing operand range.
///
/// `upper = floor(10^(d/10))` and `lower = max(1, floor(10^(d/10 - 0.5)))`.
/// When flooring leaves `upper < lower` the range collapses onto `lower`.
///
/// # Examples
///
/// ```
/// # use mathulator_core::range_for_difficulty;
/// let range = range_for_difficulty(11.0);
/// assert_eq!((range.lower, range.upper), (3, 12));
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn range_for_difficulty(difficulty: f64) -> OperandRange {
    let d = sanitize(difficulty, RANGE_DIFFICULTY_CEILING);
    let upper = 10f64.powf(d / 10.0).floor() as i64;
    let lower = (10f64.powf(d / 10.0 - 0.5).floor() as i64).max(1);
    OperandRange {
        lower,
        upper: upper.max(lower),
    }
}

/// Generate a fresh problem for `operator` at `difficulty`.
///
/// Addition, subtraction and multiplication draw both operands independently from
/// [`range_for_difficulty`]; subtraction may therefore produce a negative answer.
/// Division picks a divisor in `2..=max(2, floor(d))` and a quotient, then
/// multiplies them back into the dividend so the division is always exact.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn generate<R: Rng + ?Sized>(difficulty: f64, operator: Operator, rng: &mut R) -> Problem {
    let d = sanitize(difficulty, MAX_GENERATOR_DIFFICULTY);
    let range = range_for_difficulty(d);

    let (operand1, operand2, answer) = match operator {
        Operator::Multiply => {
            let (x, y) = draw_pair(range, rng);
            (x, y, x * y)
        }
        Operator::Add => {
            let (x, y) = draw_pair(range, rng);
            (x, y, x + y)
        }
        Operator::Subtract => {
            let (x, y) = draw_pair(range, rng);
            (x, y, x - y)
        }
        Operator::Divide => {
            let divisor_max = (d.floor() as i64).max(2);
            let divisor = rng.random_range(2..=divisor_max);
            let dividend_upper = range_for_difficulty(DIVIDEND_HEADROOM * d).upper;
            let quotient_max = (dividend_upper / divisor).max(1).max(range.lower);
            let quotient = rng.random_range(range.lower..=quotient_max);
            (quotient * divisor, divisor, quotient)
        }
    };

    Problem {
        operand1,
        operand2,
        answer,
        operator,
    }
}

fn draw_pair<R: Rng + ?Sized>(range: OperandRange, rng: &mut R) -> (i64, i64) {
    (
        rng.random_range(range.as_range()),
        rng.random_range(range.as_range()),
    )
}

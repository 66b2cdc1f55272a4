use std::fmt;

use serde::{Deserialize, Serialize};

use super::Operator;

/// One generated arithmetic problem.
///
/// `answer` is always `operand1 <operator> operand2`; for division the operands
/// are built so the quotient is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub operand1: i64,
    pub operand2: i64,
    pub answer: i64,
    pub operator: Operator,
}

impl Problem {
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        self.operator.symbol()
    }

    #[must_use]
    pub fn is_correct(&self, guess: i64) -> bool {
        guess == self.answer
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operand1, self.symbol(), self.operand2)
    }
}

/// Parse keypad input into a guess.
///
/// Surrounding whitespace is ignored. Empty or non-numeric input yields `None`,
/// in which case the caller skips the submission entirely.
#[must_use]
pub fn parse_guess(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

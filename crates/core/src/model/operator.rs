use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperatorParseError {
    #[error("unknown operator: {0:?}")]
    Unknown(String),
}

//
// ─── OPERATOR ─────────────────────────────────────────────────────────────────
//

/// The four arithmetic operations a problem can use.
///
/// Declaration order is the column order of the score matrix and must not change,
/// otherwise persisted best streaks would be read back under the wrong operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Multiply,
    Add,
    Subtract,
    Divide,
}

impl Operator {
    /// All operators in column order.
    pub const ALL: [Operator; 4] = [
        Operator::Multiply,
        Operator::Add,
        Operator::Subtract,
        Operator::Divide,
    ];

    /// Number of score matrix columns.
    pub const COUNT: usize = Self::ALL.len();

    /// Display symbol shown between the operands.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Multiply => "×",
            Operator::Add => "+",
            Operator::Subtract => "−",
            Operator::Divide => "÷",
        }
    }

    /// Column of this operator in the score matrix.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Operator::Multiply => 0,
            Operator::Add => 1,
            Operator::Subtract => 2,
            Operator::Divide => 3,
        }
    }

    /// Applies the operation with integer semantics.
    ///
    /// Division truncates; generated division problems are always exact so this
    /// never matters for them. Returns `None` on overflow or division by zero.
    #[must_use]
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Operator::Multiply => lhs.checked_mul(rhs),
            Operator::Add => lhs.checked_add(rhs),
            Operator::Subtract => lhs.checked_sub(rhs),
            Operator::Divide => lhs.checked_div(rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "×" | "*" | "x" | "mul" | "mult" | "multiply" => Ok(Operator::Multiply),
            "+" | "add" | "plus" => Ok(Operator::Add),
            "−" | "-" | "sub" | "subtract" | "minus" => Ok(Operator::Subtract),
            "÷" | "/" | "div" | "divide" => Ok(Operator::Divide),
            _ => Err(OperatorParseError::Unknown(raw.to_owned())),
        }
    }
}

use thiserror::Error;

use super::{DifficultyBounds, Operator};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a persisted matrix is rejected as a whole.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreMatrixError {
    #[error("row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("row {row} column {col} holds {value}, which is not a valid streak")]
    InvalidCell { row: usize, col: usize, value: i64 },
}

//
// ─── SCORE MATRIX ─────────────────────────────────────────────────────────────
//

pub type ScoreRow = [u32; Operator::COUNT];

/// Best streak per (difficulty, operator).
///
/// Rows follow `DifficultyBounds::row_of`, columns follow `Operator::index`.
/// Cells only grow through [`ScoreMatrix::raise`] and only shrink through
/// [`ScoreMatrix::clear`]. Lookups outside the bounds read as zero and writes
/// outside the bounds are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreMatrix {
    bounds: DifficultyBounds,
    rows: Vec<ScoreRow>,
}

impl ScoreMatrix {
    /// All-zero matrix sized for `bounds`.
    #[must_use]
    pub fn new(bounds: DifficultyBounds) -> Self {
        Self {
            bounds,
            rows: vec![[0; Operator::COUNT]; bounds.levels()],
        }
    }

    /// Rebuild a matrix from its persisted nested-array form.
    ///
    /// Rows are aligned to `bounds.min()`. Extra rows are dropped and missing rows
    /// are zero-filled, so a matrix saved under different bounds still loads.
    ///
    /// # Errors
    ///
    /// Returns `ScoreMatrixError` if any row does not have exactly one column per
    /// operator or any cell is negative or too large.
    pub fn from_rows(rows: &[Vec<i64>], bounds: DifficultyBounds) -> Result<Self, ScoreMatrixError> {
        let mut matrix = Self::new(bounds);
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != Operator::COUNT {
                return Err(ScoreMatrixError::ColumnCount {
                    row: row_idx,
                    found: row.len(),
                    expected: Operator::COUNT,
                });
            }
            let mut parsed = [0; Operator::COUNT];
            for (col, value) in row.iter().enumerate() {
                parsed[col] = u32::try_from(*value).map_err(|_| ScoreMatrixError::InvalidCell {
                    row: row_idx,
                    col,
                    value: *value,
                })?;
            }
            if let Some(slot) = matrix.rows.get_mut(row_idx) {
                *slot = parsed;
            }
        }
        Ok(matrix)
    }

    /// Nested-array form for persistence, one inner array per difficulty.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|v| i64::from(*v)).collect())
            .collect()
    }

    #[must_use]
    pub fn bounds(&self) -> DifficultyBounds {
        self.bounds
    }

    #[must_use]
    pub fn get(&self, difficulty: i32, op: Operator) -> u32 {
        self.bounds
            .row_of(difficulty)
            .and_then(|row| self.rows.get(row))
            .map_or(0, |row| row[op.index()])
    }

    /// Store `streak` if it beats the current cell. Returns `true` when the cell changed.
    pub fn raise(&mut self, difficulty: i32, op: Operator, streak: u32) -> bool {
        let Some(cell) = self.cell_mut(difficulty, op) else {
            return false;
        };
        if streak > *cell {
            *cell = streak;
            true
        } else {
            false
        }
    }

    /// Force the cell to zero. Returns `false` only when `difficulty` is out of bounds.
    pub fn clear(&mut self, difficulty: i32, op: Operator) -> bool {
        match self.cell_mut(difficulty, op) {
            Some(cell) => {
                *cell = 0;
                true
            }
            None => false,
        }
    }

    /// Rows paired with their difficulty, lowest difficulty first.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &ScoreRow)> {
        self.bounds.iter().zip(self.rows.iter())
    }

    fn cell_mut(&mut self, difficulty: i32, op: Operator) -> Option<&mut u32> {
        let row = self.bounds.row_of(difficulty)?;
        self.rows.get_mut(row).map(|r| &mut r[op.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: i32, max: i32) -> DifficultyBounds {
        DifficultyBounds::new(min, max).unwrap()
    }

    #[test]
    fn new_matrix_is_zeroed() {
        let m = ScoreMatrix::new(DifficultyBounds::default());
        assert_eq!(m.to_rows().len(), 30);
        assert!(m.iter().all(|(_, row)| row.iter().all(|v| *v == 0)));
    }

    #[test]
    fn raise_keeps_maximum() {
        let mut m = ScoreMatrix::new(DifficultyBounds::default());
        assert!(m.raise(11, Operator::Add, 5));
        assert!(!m.raise(11, Operator::Add, 3));
        assert!(!m.raise(11, Operator::Add, 5));
        assert_eq!(m.get(11, Operator::Add), 5);
        assert_eq!(m.get(11, Operator::Subtract), 0);
    }

    #[test]
    fn clear_zeroes_cell() {
        let mut m = ScoreMatrix::new(DifficultyBounds::default());
        m.raise(20, Operator::Divide, 9);
        assert!(m.clear(20, Operator::Divide));
        assert_eq!(m.get(20, Operator::Divide), 0);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut m = ScoreMatrix::new(DifficultyBounds::default());
        let before = m.clone();
        assert!(!m.raise(5, Operator::Add, 10));
        assert!(!m.raise(36, Operator::Add, 10));
        assert!(!m.clear(99, Operator::Add));
        assert_eq!(m, before);
        assert_eq!(m.get(-3, Operator::Multiply), 0);
    }

    #[test]
    fn rows_round_trip() {
        let mut m = ScoreMatrix::new(bounds(6, 9));
        m.raise(6, Operator::Multiply, 1);
        m.raise(7, Operator::Add, 22);
        m.raise(9, Operator::Divide, u32::MAX);
        let restored = ScoreMatrix::from_rows(&m.to_rows(), m.bounds()).unwrap();
        assert_eq!(restored, m);
    }

    #[test]
    fn shorter_persisted_matrix_is_zero_padded() {
        let rows = vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]];
        let m = ScoreMatrix::from_rows(&rows, bounds(6, 10)).unwrap();
        assert_eq!(m.get(7, Operator::Divide), 8);
        assert_eq!(m.get(8, Operator::Multiply), 0);
        assert_eq!(m.to_rows().len(), 5);
    }

    #[test]
    fn longer_persisted_matrix_is_truncated() {
        let rows = vec![vec![1, 0, 0, 0], vec![2, 0, 0, 0], vec![3, 0, 0, 0]];
        let m = ScoreMatrix::from_rows(&rows, bounds(6, 7)).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1, 0, 0, 0], vec![2, 0, 0, 0]]);
    }

    #[test]
    fn rejects_bad_shapes_and_values() {
        let err = ScoreMatrix::from_rows(&[vec![1, 2, 3]], bounds(6, 7)).unwrap_err();
        assert_eq!(
            err,
            ScoreMatrixError::ColumnCount {
                row: 0,
                found: 3,
                expected: 4
            }
        );
        let err = ScoreMatrix::from_rows(&[vec![0, -1, 0, 0]], bounds(6, 7)).unwrap_err();
        assert_eq!(
            err,
            ScoreMatrixError::InvalidCell {
                row: 0,
                col: 1,
                value: -1
            }
        );
    }
}

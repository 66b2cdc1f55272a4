use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::Problem;

/// Matches the 8×3 result grid shown next to the keypad.
pub const DEFAULT_HISTORY_CAPACITY: usize = 24;

/// One answered problem, kept for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub problem: Problem,
    pub correct: bool,
    pub guess: i64,
    pub answered_at: DateTime<Utc>,
}

/// Bounded, oldest-first record of recent answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl AnswerHistory {
    /// A capacity of zero is bumped to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest once full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Share of correct answers, truncated to a whole percent. Zero when empty.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        if self.entries.is_empty() {
            return 0;
        }
        let correct = self.entries.iter().filter(|e| e.correct).count();
        u8::try_from(correct * 100 / self.entries.len()).unwrap_or(100)
    }
}

impl Default for AnswerHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operator;
    use crate::time::fixed_now;

    fn entry(correct: bool) -> HistoryEntry {
        HistoryEntry {
            problem: Problem {
                operand1: 2,
                operand2: 3,
                answer: 5,
                operator: Operator::Add,
            },
            correct,
            guess: if correct { 5 } else { 4 },
            answered_at: fixed_now(),
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = AnswerHistory::with_capacity(3);
        history.push(entry(false));
        history.push(entry(true));
        history.push(entry(true));
        history.push(entry(true));
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|e| e.correct));
    }

    #[test]
    fn accuracy_truncates() {
        let mut history = AnswerHistory::default();
        assert_eq!(history.accuracy_percent(), 0);
        history.push(entry(true));
        history.push(entry(false));
        history.push(entry(false));
        assert_eq!(history.accuracy_percent(), 33);
        assert_eq!(history.last().map(|e| e.guess), Some(4));
    }

    #[test]
    fn zero_capacity_is_bumped() {
        let mut history = AnswerHistory::with_capacity(0);
        history.push(entry(true));
        history.push(entry(false));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
    }
}

use std::sync::Arc;

use mathulator_core::generate;
use mathulator_core::model::{
    AnswerHistory, DEFAULT_HISTORY_CAPACITY, HistoryEntry, Operator, Problem, parse_guess,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::Clock;
use crate::error::PracticeError;
use crate::score_store::ScoreStore;

/// Starting point for a practice run.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeConfig {
    pub difficulty: f64,
    pub operator: Operator,
    pub history_capacity: usize,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            difficulty: 11.0,
            operator: Operator::Add,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Result of one accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub entry: HistoryEntry,
    pub streak: u32,
    pub new_best: bool,
    pub next: Problem,
}

/// Drives one keypad session: current problem, running streak and recent answers.
///
/// The running streak lives here; the store only sees it when an answer is
/// submitted. Switching operator or difficulty starts a new streak.
pub struct PracticeSession<R = StdRng> {
    scores: Arc<ScoreStore>,
    rng: R,
    clock: Clock,
    difficulty: f64,
    operator: Operator,
    problem: Problem,
    streak: u32,
    history: AnswerHistory,
}

impl PracticeSession<StdRng> {
    #[must_use]
    pub fn new(scores: Arc<ScoreStore>, config: PracticeConfig) -> Self {
        Self::with_rng(scores, config, StdRng::seed_from_u64(rand::random()))
    }

    /// Session whose problem sequence is fully determined by `seed`.
    #[must_use]
    pub fn seeded(scores: Arc<ScoreStore>, config: PracticeConfig, seed: u64) -> Self {
        Self::with_rng(scores, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PracticeSession<R> {
    #[must_use]
    pub fn with_rng(scores: Arc<ScoreStore>, config: PracticeConfig, mut rng: R) -> Self {
        let difficulty = scores.bounds().clamp(config.difficulty);
        let problem = generate(difficulty, config.operator, &mut rng);
        Self {
            scores,
            rng,
            clock: Clock::default(),
            difficulty,
            operator: config.operator,
            problem,
            streak: 0,
            history: AnswerHistory::with_capacity(config.history_capacity),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn history(&self) -> &AnswerHistory {
        &self.history
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Whole difficulty level used to index the score matrix.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn difficulty_level(&self) -> i32 {
        self.difficulty.floor() as i32
    }

    pub async fn high_score(&self) -> u32 {
        self.scores
            .high_score(self.difficulty_level(), self.operator)
            .await
    }

    /// Check keypad input against the current problem.
    ///
    /// Returns `Ok(None)` and changes nothing when the input is empty or not a
    /// number. Otherwise the answer is recorded, the streak advances or drops to
    /// zero, a new problem is drawn and the streak is offered to the store.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Scores` if saving a new best fails. The answer
    /// itself is still recorded in the session.
    pub async fn submit(&mut self, input: &str) -> Result<Option<AnswerOutcome>, PracticeError> {
        let Some(guess) = parse_guess(input) else {
            debug!(input, "ignoring unparseable answer");
            return Ok(None);
        };

        let correct = self.problem.is_correct(guess);
        self.streak = if correct {
            self.streak.saturating_add(1)
        } else {
            0
        };

        let entry = HistoryEntry {
            problem: self.problem,
            correct,
            guess,
            answered_at: self.clock.now(),
        };
        self.history.push(entry.clone());
        self.next_problem();

        let new_best = self
            .scores
            .update_if_higher(self.streak, self.difficulty_level(), self.operator)
            .await?;

        Ok(Some(AnswerOutcome {
            entry,
            streak: self.streak,
            new_best,
            next: self.problem,
        }))
    }

    pub fn set_operator(&mut self, operator: Operator) {
        if operator == self.operator {
            return;
        }
        self.operator = operator;
        self.streak = 0;
        self.next_problem();
    }

    /// Move the slider; the value is clamped into the store's bounds.
    pub fn set_difficulty(&mut self, difficulty: f64) {
        let difficulty = self.scores.bounds().clamp(difficulty);
        if difficulty == self.difficulty {
            return;
        }
        self.difficulty = difficulty;
        self.streak = 0;
        self.next_problem();
    }

    /// Replace the current problem without touching the streak.
    pub fn skip(&mut self) {
        self.next_problem();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Zero the best streak for the current operator and difficulty.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Scores` if the save fails.
    pub async fn reset_high_score(&self) -> Result<(), PracticeError> {
        self.scores
            .reset(self.difficulty_level(), self.operator)
            .await?;
        Ok(())
    }

    fn next_problem(&mut self) {
        self.problem = generate(self.difficulty, self.operator, &mut self.rng);
        debug!(problem = %self.problem, difficulty = self.difficulty, "next problem");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathulator_core::model::DifficultyBounds;
    use mathulator_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    async fn session(seed: u64) -> PracticeSession {
        let scores = Arc::new(
            ScoreStore::initialize(
                Arc::new(InMemoryRepository::new()),
                DifficultyBounds::default(),
            )
            .await,
        );
        PracticeSession::seeded(scores, PracticeConfig::default(), seed)
            .with_clock(Clock::Fixed(fixed_now()))
    }

    #[tokio::test]
    async fn unparseable_input_changes_nothing() {
        let mut s = session(1).await;
        let before = *s.problem();
        assert_eq!(s.submit("").await.unwrap(), None);
        assert_eq!(s.submit("abc").await.unwrap(), None);
        assert_eq!(*s.problem(), before);
        assert!(s.history().is_empty());
        assert_eq!(s.streak(), 0);
    }

    #[tokio::test]
    async fn correct_answers_build_streak() {
        let mut s = session(2).await;
        for expected in 1..=3 {
            let answer = s.problem().answer.to_string();
            let outcome = s.submit(&answer).await.unwrap().expect("accepted");
            assert!(outcome.entry.correct);
            assert!(outcome.new_best);
            assert_eq!(outcome.streak, expected);
            assert_eq!(outcome.entry.answered_at, fixed_now());
        }
        assert_eq!(s.high_score().await, 3);
    }

    #[tokio::test]
    async fn wrong_answer_drops_streak_but_keeps_best() {
        let mut s = session(3).await;
        let answer = s.problem().answer.to_string();
        s.submit(&answer).await.unwrap();
        let wrong = (s.problem().answer + 1).to_string();
        let outcome = s.submit(&wrong).await.unwrap().expect("accepted");
        assert!(!outcome.entry.correct);
        assert!(!outcome.new_best);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.high_score().await, 1);
        assert_eq!(s.history().accuracy_percent(), 50);
    }

    #[tokio::test]
    async fn switching_operator_restarts_streak() {
        let mut s = session(4).await;
        let answer = s.problem().answer.to_string();
        s.submit(&answer).await.unwrap();
        s.set_operator(Operator::Divide);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.problem().operator, Operator::Divide);
        assert_eq!(s.high_score().await, 0);
    }

    #[tokio::test]
    async fn difficulty_is_clamped() {
        let mut s = session(5).await;
        s.set_difficulty(99.0);
        assert_eq!(s.difficulty_level(), 35);
        s.set_difficulty(-3.0);
        assert_eq!(s.difficulty_level(), 6);
    }
}

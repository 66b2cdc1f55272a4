use chrono::{DateTime, Utc};

/// Source of timestamps for history entries.
///
/// `Fixed` keeps tests and seeded runs reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Seconds since the epoch used by [`fixed_now`] (2025-07-04T00:00:00Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_751_587_200;

/// Deterministic timestamp for tests.
///
/// # Panics
///
/// Panics if the constant cannot be represented, which never happens for this value.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

use serde::{Deserialize, Serialize};

pub const INITIAL_EASINESS_FACTOR: f64 = 2.5;
pub const MIN_EASINESS_FACTOR: f64 = 1.3;
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// SM-2 scheduling state for one learned vocabulary item.
/// Dates are epoch seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewCard {
    pub id: i64,
    pub vocabulary_id: i64,
    pub easiness_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_date: i64,
    pub last_reviewed_at: Option<i64>,
}

impl ReviewCard {
    pub fn is_due(&self, now: i64) -> bool {
        self.next_review_date <= now
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewReviewCard {
    pub vocabulary_id: i64,
    pub easiness_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_date: i64,
    pub last_reviewed_at: Option<i64>,
}

impl NewReviewCard {
    /// A never-reviewed card that is due immediately.
    pub fn due_now(vocabulary_id: i64, now: i64) -> Self {
        Self {
            vocabulary_id,
            easiness_factor: INITIAL_EASINESS_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review_date: now,
            last_reviewed_at: None,
        }
    }
}

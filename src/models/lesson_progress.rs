//! Per-lesson completion record.
use serde::{Deserialize, Serialize};

/// What the lesson screen reports when a lesson is finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonResult {
    /// Percentage of exercises answered correctly.
    pub score: u32,
    pub xp_earned: u32,
    pub time_spent_seconds: u32,
}

/// One row per lesson, updated on every completion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub id: i64,
    pub lesson_id: String,
    pub completed: bool,
    /// Best score over all attempts.
    pub score: u32,
    /// XP summed over all attempts.
    pub xp_earned: u32,
    pub time_spent_seconds: u32,
    /// Epoch seconds of the latest completion.
    pub completed_at: Option<i64>,
    pub attempts: u32,
}

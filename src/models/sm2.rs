//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! The four answer buttons are mapped onto the classic 0-5 quality scale
//! (again=0, hard=2, good=4, easy=5), then:
//! - EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), never below 1.3
//! - Quality below 3 (again and hard) restarts the schedule: interval 1 day,
//!   repetitions 0
//! - Good and easy grow the interval 1 day → 6 days → previous interval × old EF
//! - Good (q=4) is a fixed point of the EF update; only hard/again lower EF

use super::review_card::{MIN_EASINESS_FACTOR, SECONDS_PER_DAY};
use super::{Rating, ReviewCard};

/// New easiness factor after answering with the given quality.
pub fn next_easiness_factor(easiness_factor: f64, quality: u8) -> f64 {
    let q = f64::from(quality.min(5));
    // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    let new_ef = easiness_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    new_ef.max(MIN_EASINESS_FACTOR)
}

/// Returns `(interval_days, repetitions)` for the next schedule step.
/// `easiness_factor` is the card's EF *before* this review.
pub fn next_interval(
    interval_days: u32,
    repetitions: u32,
    easiness_factor: f64,
    quality: u8,
) -> (u32, u32) {
    // Failed recall (again or hard): start over
    if quality < 3 {
        return (1, 0);
    }

    let interval = match repetitions {
        // First repetition: 1 day
        0 => 1,
        // Second repetition: 6 days
        1 => 6,
        // Subsequent repetitions: previous interval * EF
        _ => (f64::from(interval_days) * easiness_factor).round() as u32,
    };
    (interval, repetitions.saturating_add(1))
}

/// Applies a rating to a card answered at `now` (epoch seconds) and returns the
/// rescheduled card. Persisting the result is the caller's job.
pub fn process_review(card: &ReviewCard, rating: Rating, now: i64) -> ReviewCard {
    let quality = rating.quality();
    let easiness_factor = next_easiness_factor(card.easiness_factor, quality);
    let (interval_days, repetitions) = next_interval(
        card.interval_days,
        card.repetitions,
        card.easiness_factor,
        quality,
    );

    ReviewCard {
        easiness_factor,
        interval_days,
        repetitions,
        next_review_date: now + i64::from(interval_days) * SECONDS_PER_DAY,
        last_reviewed_at: Some(now),
        ..card.clone()
    }
}

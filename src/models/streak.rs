//! Daily streak transitions.
//!
//! A streak counts consecutive calendar days with at least one completed lesson.
//! Missing exactly one day can be forgiven by spending a banked freeze; one
//! freeze is earned each time the streak reaches a new multiple of seven.
//! Only `record_completion` increments the streak or spends a freeze; only
//! `check_on_open` can break a streak without a lesson being completed.

use super::{CalendarDate, DailyStreak};

/// A freeze is awarded every time the streak crosses a multiple of this.
pub const FREEZE_MILESTONE: u32 = 7;

/// Where a streak stands on a given day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakStatus {
    /// No lesson has ever been completed.
    Fresh,
    /// A lesson was already completed today.
    ActiveToday,
    /// Last lesson was yesterday; completing one today continues the streak.
    ActiveGrace,
    /// One day was missed but a freeze is banked to cover it.
    ActiveFrozen,
    /// The streak can no longer be continued.
    Broken,
}

/// Records a completed lesson on `today`. Repeated calls on the same day
/// return the record unchanged.
pub fn record_completion(streak: &DailyStreak, today: CalendarDate) -> DailyStreak {
    if streak.was_active_on(today) {
        return streak.clone();
    }

    let yesterday = today.yesterday();
    let mut freezes_available = streak.freezes_available;
    let mut freeze_used_date = streak.freeze_used_date;

    let current_streak = match streak.last_activity_date {
        Some(last) if last == yesterday => streak.current_streak + 1,
        Some(last) if last.days_between(&today) == 2 && freezes_available > 0 => {
            freezes_available -= 1;
            freeze_used_date = Some(yesterday);
            streak.current_streak + 1
        }
        _ => {
            freeze_used_date = None;
            1
        }
    };

    // Awards at most one freeze per call even if several milestones were crossed.
    if current_streak / FREEZE_MILESTONE > streak.current_streak / FREEZE_MILESTONE {
        freezes_available += 1;
    }

    DailyStreak {
        current_streak,
        longest_streak: streak.longest_streak.max(current_streak),
        last_activity_date: Some(today),
        freezes_available,
        freeze_used_date,
    }
}

/// Re-evaluates the streak when the app is opened on `today`, breaking it if
/// too many days were missed. A freeze is never spent here.
pub fn check_on_open(streak: &DailyStreak, today: CalendarDate) -> DailyStreak {
    match status(streak, today) {
        StreakStatus::Broken if streak.current_streak > 0 => DailyStreak {
            current_streak: 0,
            freeze_used_date: None,
            ..streak.clone()
        },
        _ => streak.clone(),
    }
}

pub fn status(streak: &DailyStreak, today: CalendarDate) -> StreakStatus {
    let Some(last) = streak.last_activity_date else {
        return StreakStatus::Fresh;
    };

    if last == today {
        StreakStatus::ActiveToday
    } else if last == today.yesterday() {
        StreakStatus::ActiveGrace
    } else if last.days_between(&today) == 2 && streak.freezes_available > 0 {
        StreakStatus::ActiveFrozen
    } else {
        StreakStatus::Broken
    }
}

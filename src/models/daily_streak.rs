//! The singleton record backing the daily streak counter.
use super::CalendarDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreak {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// `None` until the first lesson is ever completed.
    pub last_activity_date: Option<CalendarDate>,
    pub freezes_available: u32,
    /// The missed day most recently covered by a freeze.
    pub freeze_used_date: Option<CalendarDate>,
}

impl DailyStreak {
    pub fn is_fresh(&self) -> bool {
        self.last_activity_date.is_none()
    }

    pub fn was_active_on(&self, date: CalendarDate) -> bool {
        self.last_activity_date == Some(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fresh() {
        let streak = DailyStreak::default();

        assert!(streak.is_fresh());
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 0);
        assert_eq!(streak.freezes_available, 0);
        assert_eq!(streak.freeze_used_date, None);
    }
}

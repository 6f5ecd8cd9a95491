pub mod daily_streak;
pub mod date;
pub mod lesson_progress;
pub mod rating;
pub mod review_card;
pub mod review_session;
pub mod sm2;
pub mod streak;
pub mod vocabulary_item;

pub use daily_streak::DailyStreak;
pub use date::CalendarDate;
pub use lesson_progress::{LessonProgress, LessonResult};
pub use rating::Rating;
pub use review_card::{NewReviewCard, ReviewCard};
pub use review_session::{ReviewSession, SessionSummary};
pub use streak::StreakStatus;
pub use vocabulary_item::{NewVocabularyItem, VocabularyItem};

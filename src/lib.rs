pub mod clock;
pub mod config;
pub mod database;
pub mod engine;
pub mod export;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use database::{DbError, SqliteStore, Store};
pub use engine::{LessonCompletion, ReviewEngine};
pub use models::{
    CalendarDate, DailyStreak, LessonProgress, LessonResult, Rating, ReviewCard, ReviewSession,
    VocabularyItem,
};

//! Persistence contract used by the review engine.
//!
//! The daily streak is a single-instance record: it can only be fetched
//! (created on first access) and overwritten, never created by id.

use super::DbResult;
use crate::models::{
    DailyStreak, LessonProgress, LessonResult, NewReviewCard, NewVocabularyItem, ReviewCard,
    VocabularyItem,
};

pub trait Store {
    /// Runs `f` as one unit of work: if it returns an error, none of the
    /// writes it made are kept. Not reentrant.
    fn transaction<T>(&self, f: impl FnOnce(&Self) -> DbResult<T>) -> DbResult<T>;

    /// Inserts an item unless one with the same text already exists for the
    /// same lesson, in which case the existing item is returned.
    fn insert_vocabulary_item(&self, item: &NewVocabularyItem) -> DbResult<VocabularyItem>;

    fn vocabulary_item_by_id(&self, id: i64) -> DbResult<Option<VocabularyItem>>;

    fn vocabulary_item_count(&self) -> DbResult<usize>;

    fn learned_vocabulary_items(&self) -> DbResult<Vec<VocabularyItem>>;

    /// Flips every still-unlearned item of a lesson to learned.
    /// Returns how many items changed.
    fn mark_vocabulary_learned_by_lesson(&self, lesson_id: &str) -> DbResult<usize>;

    fn review_card_by_vocabulary_id(&self, vocabulary_id: i64) -> DbResult<Option<ReviewCard>>;

    fn review_card_by_id(&self, id: i64) -> DbResult<Option<ReviewCard>>;

    fn create_review_card(&self, card: &NewReviewCard) -> DbResult<ReviewCard>;

    fn update_review_card(&self, card: &ReviewCard) -> DbResult<ReviewCard>;

    /// Cards with `next_review_date <= now`, oldest-due first.
    fn due_review_cards(&self, now: i64) -> DbResult<Vec<ReviewCard>>;

    fn all_review_cards(&self) -> DbResult<Vec<ReviewCard>>;

    fn get_or_create_daily_streak(&self) -> DbResult<DailyStreak>;

    fn update_daily_streak(&self, streak: &DailyStreak) -> DbResult<DailyStreak>;

    /// Marks a lesson completed at `completed_at` and counts one more attempt,
    /// creating its progress row on first completion.
    fn record_lesson_result(
        &self,
        lesson_id: &str,
        result: &LessonResult,
        completed_at: i64,
    ) -> DbResult<LessonProgress>;

    fn lesson_progress(&self, lesson_id: &str) -> DbResult<Option<LessonProgress>>;

    fn all_lesson_progress(&self) -> DbResult<Vec<LessonProgress>>;

    /// Completed lessons whose latest completion is at or after `since`.
    fn completed_lesson_count_since(&self, since: i64) -> DbResult<usize>;

    /// Whole days the simulated clock runs ahead of the wall clock.
    fn day_offset(&self) -> DbResult<i64>;

    fn advance_day(&self) -> DbResult<i64>;
}

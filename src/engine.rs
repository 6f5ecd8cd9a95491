//! Review engine: the entry points the UI calls.
//!
//! Wraps a [`Store`] and a [`Clock`] and runs each operation as a single
//! read-modify-write while holding the store lock, so two near-simultaneous
//! calls (e.g. lifecycle callbacks firing together) can't lose an update.
//! Operations that write more than one table run inside a store transaction.

use crate::clock::Clock;
use crate::database::{DbError, DbResult, Store};
use crate::models::streak::{self, StreakStatus};
use crate::models::{
    DailyStreak, LessonProgress, LessonResult, NewReviewCard, Rating, ReviewCard, VocabularyItem,
    sm2,
};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Outcome of finishing a lesson.
#[derive(Clone, Debug, PartialEq)]
pub struct LessonCompletion {
    pub lesson_id: String,
    /// Items flipped to learned by this completion (0 when re-completing).
    pub newly_learned: usize,
    pub cards_created: usize,
    pub progress: LessonProgress,
    pub streak: DailyStreak,
}

pub struct ReviewEngine<S, C> {
    store: Mutex<S>,
    clock: C,
}

impl<S: Store, C: Clock> ReviewEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, S>> {
        self.store.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Runs `f` against the store under the engine lock.
    pub fn with_store<T>(&self, f: impl FnOnce(&S) -> DbResult<T>) -> DbResult<T> {
        let store = self.lock()?;
        f(&store)
    }

    /// Applies a rating to a card, persists and returns the rescheduled card.
    pub fn process_review(&self, card: &ReviewCard, rating: Rating) -> DbResult<ReviewCard> {
        let now = self.clock.now();
        let next = sm2::process_review(card, rating, now);
        debug!(
            card_id = card.id,
            %rating,
            easiness_factor = next.easiness_factor,
            interval_days = next.interval_days,
            repetitions = next.repetitions,
            "rescheduled review card"
        );

        self.lock()?.update_review_card(&next)
    }

    pub fn review_card(&self, id: i64) -> DbResult<Option<ReviewCard>> {
        self.lock()?.review_card_by_id(id)
    }

    /// Creates a due-now card for every learned item that has none yet.
    /// Returns how many cards were created.
    pub fn ensure_review_cards_exist(&self) -> DbResult<usize> {
        let store = self.lock()?;
        ensure_cards(&*store, self.clock.now())
    }

    /// Due cards, oldest-due first. No session size cap is applied here.
    pub fn due_cards_for_session(&self) -> DbResult<Vec<ReviewCard>> {
        self.lock()?.due_review_cards(self.clock.now())
    }

    pub fn due_review_count(&self) -> DbResult<usize> {
        Ok(self.due_cards_for_session()?.len())
    }

    /// Due cards paired with their vocabulary items, ready for display.
    pub fn due_session(&self) -> DbResult<Vec<(ReviewCard, VocabularyItem)>> {
        let store = self.lock()?;
        let mut session = Vec::new();
        for card in store.due_review_cards(self.clock.now())? {
            match store.vocabulary_item_by_id(card.vocabulary_id)? {
                Some(item) => session.push((card, item)),
                None => warn!(
                    card_id = card.id,
                    vocabulary_id = card.vocabulary_id,
                    "skipping review card without vocabulary item"
                ),
            }
        }
        Ok(session)
    }

    pub fn streak(&self) -> DbResult<DailyStreak> {
        self.lock()?.get_or_create_daily_streak()
    }

    pub fn streak_status(&self) -> DbResult<StreakStatus> {
        Ok(streak::status(&self.streak()?, self.clock.today()))
    }

    /// Counts today's lesson toward the streak. Call once per completed lesson.
    pub fn record_lesson_completion(&self) -> DbResult<DailyStreak> {
        let store = self.lock()?;
        record_completion(&*store, &self.clock)
    }

    /// Silently breaks the streak if it lapsed while the app was closed.
    pub fn check_streak_on_open(&self) -> DbResult<DailyStreak> {
        let store = self.lock()?;
        let today = self.clock.today();
        let current = store.get_or_create_daily_streak()?;
        let checked = streak::check_on_open(&current, today);

        if checked == current {
            return Ok(current);
        }
        info!(
            previous_streak = current.current_streak,
            last_activity = ?current.last_activity_date,
            %today,
            "streak broken"
        );
        store.update_daily_streak(&checked)
    }

    /// Completes a lesson without a score (e.g. from the command line).
    pub fn complete_lesson(&self, lesson_id: &str) -> DbResult<LessonCompletion> {
        self.complete_lesson_with_result(lesson_id, &LessonResult::default())
    }

    /// Marks the lesson's vocabulary learned, makes sure every learned item
    /// has a review card, records the lesson's progress and streak activity.
    /// Either all of it is stored or none of it is.
    pub fn complete_lesson_with_result(
        &self,
        lesson_id: &str,
        result: &LessonResult,
    ) -> DbResult<LessonCompletion> {
        let store = self.lock()?;
        let now = self.clock.now();

        let completion = store.transaction(|store| {
            let newly_learned = store.mark_vocabulary_learned_by_lesson(lesson_id)?;
            let cards_created = ensure_cards(store, now)?;
            let progress = store.record_lesson_result(lesson_id, result, now)?;
            let streak = record_completion(store, &self.clock)?;
            Ok(LessonCompletion {
                lesson_id: lesson_id.to_string(),
                newly_learned,
                cards_created,
                progress,
                streak,
            })
        })?;

        info!(
            lesson_id,
            newly_learned = completion.newly_learned,
            cards_created = completion.cards_created,
            attempts = completion.progress.attempts,
            current_streak = completion.streak.current_streak,
            "lesson completed"
        );
        Ok(completion)
    }

    pub fn lesson_progress(&self, lesson_id: &str) -> DbResult<Option<LessonProgress>> {
        self.lock()?.lesson_progress(lesson_id)
    }

    /// Lessons completed since local midnight. A lesson redone today counts once.
    pub fn lessons_completed_today(&self) -> DbResult<usize> {
        self.lock()?
            .completed_lesson_count_since(self.clock.start_of_today())
    }

    /// Moves the simulated clock offset forward one day. The engine's own
    /// clock is unaffected; callers rebuild it from the stored offset.
    pub fn advance_day(&self) -> DbResult<i64> {
        self.lock()?.advance_day()
    }
}

fn ensure_cards<S: Store + ?Sized>(store: &S, now: i64) -> DbResult<usize> {
    let mut created = 0;
    for item in store.learned_vocabulary_items()? {
        if store.review_card_by_vocabulary_id(item.id)?.is_none() {
            store.create_review_card(&NewReviewCard::due_now(item.id, now))?;
            created += 1;
        }
    }
    if created > 0 {
        info!(created, "created review cards for learned vocabulary");
    }
    Ok(created)
}

fn record_completion<S: Store + ?Sized, C: Clock>(store: &S, clock: &C) -> DbResult<DailyStreak> {
    let today = clock.today();
    let current = store.get_or_create_daily_streak()?;
    let next = streak::record_completion(&current, today);

    if next == current {
        return Ok(current);
    }
    debug!(
        from = current.current_streak,
        to = next.current_streak,
        freezes_available = next.freezes_available,
        %today,
        "streak updated"
    );
    store.update_daily_streak(&next)
}

//! SQLite storage for vocabulary, review cards, lesson progress and the daily streak.
//!
//! Handles schema initialization, the CRUD the review engine needs, and the
//! simulated day offset used to fast-forward the clock.

use super::{DbError, DbResult, Store};
use crate::models::{
    CalendarDate, DailyStreak, LessonProgress, LessonResult, NewReviewCard, NewVocabularyItem,
    ReviewCard, VocabularyItem,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::debug;

const VOCABULARY_COLUMNS: &str =
    "id, text, transliteration, translation, category, lesson_id, learned";
const REVIEW_CARD_COLUMNS: &str = "id, vocabulary_id, easiness_factor, interval_days, repetitions, next_review_date, last_reviewed_at";
const LESSON_PROGRESS_COLUMNS: &str =
    "id, lesson_id, completed, score, xp_earned, time_spent_seconds, completed_at, attempts";

/// rusqlite-backed implementation of [`Store`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database file at `path`.
    pub fn open(path: &Path) -> DbResult<Self> {
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    /// Creates an in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> DbResult<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            -- One row per word; lesson_id is NULL for items outside any lesson
            CREATE TABLE IF NOT EXISTS vocabulary_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                transliteration TEXT NOT NULL DEFAULT '',
                translation TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                lesson_id TEXT,
                learned INTEGER NOT NULL DEFAULT 0
            );

            -- SM-2 state, at most one card per vocabulary item
            CREATE TABLE IF NOT EXISTS review_card (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vocabulary_id INTEGER NOT NULL UNIQUE,
                easiness_factor REAL NOT NULL DEFAULT 2.5,
                interval_days INTEGER NOT NULL DEFAULT 0,
                repetitions INTEGER NOT NULL DEFAULT 0,
                next_review_date INTEGER NOT NULL,
                last_reviewed_at INTEGER,
                FOREIGN KEY (vocabulary_id) REFERENCES vocabulary_item(id) ON DELETE CASCADE
            );

            -- One row per completed lesson
            CREATE TABLE IF NOT EXISTS lesson_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lesson_id TEXT NOT NULL UNIQUE,
                completed INTEGER NOT NULL DEFAULT 0,
                score INTEGER NOT NULL DEFAULT 0,
                xp_earned INTEGER NOT NULL DEFAULT 0,
                time_spent_seconds INTEGER NOT NULL DEFAULT 0,
                completed_at INTEGER,
                attempts INTEGER NOT NULL DEFAULT 0
            );

            -- Singleton: the CHECK keeps it to the row with id 1
            CREATE TABLE IF NOT EXISTS daily_streak (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                current_streak INTEGER NOT NULL DEFAULT 0,
                longest_streak INTEGER NOT NULL DEFAULT 0,
                last_activity_date TEXT NOT NULL DEFAULT '',
                freezes_available INTEGER NOT NULL DEFAULT 0,
                freeze_used_date TEXT
            );

            -- Key/value settings such as the simulated day offset
            CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_vocabulary_lesson ON vocabulary_item(lesson_id);
            CREATE INDEX IF NOT EXISTS idx_review_card_next_review ON review_card(next_review_date);
            CREATE INDEX IF NOT EXISTS idx_lesson_progress_completed_at ON lesson_progress(completed_at);",
        )?;
        Ok(())
    }

    fn find_vocabulary_item(
        &self,
        text: &str,
        lesson_id: Option<&str>,
    ) -> DbResult<Option<VocabularyItem>> {
        let item = self
            .conn
            .query_row(
                &format!(
                    "SELECT {VOCABULARY_COLUMNS} FROM vocabulary_item WHERE text = ?1 AND lesson_id IS ?2"
                ),
                params![text, lesson_id],
                row_to_vocabulary_item,
            )
            .optional()?;
        Ok(item)
    }

    /// Raw connection access for tests that need to corrupt or sabotage the schema.
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn query_review_cards(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> DbResult<Vec<ReviewCard>> {
        let mut stmt = self.conn.prepare(sql)?;
        let cards = stmt
            .query_map(params, row_to_review_card)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }
}

fn row_to_vocabulary_item(row: &Row) -> rusqlite::Result<VocabularyItem> {
    Ok(VocabularyItem {
        id: row.get(0)?,
        text: row.get(1)?,
        transliteration: row.get(2)?,
        translation: row.get(3)?,
        category: row.get(4)?,
        lesson_id: row.get(5)?,
        learned: row.get(6)?,
    })
}

fn row_to_review_card(row: &Row) -> rusqlite::Result<ReviewCard> {
    Ok(ReviewCard {
        id: row.get(0)?,
        vocabulary_id: row.get(1)?,
        easiness_factor: row.get(2)?,
        interval_days: row.get(3)?,
        repetitions: row.get(4)?,
        next_review_date: row.get(5)?,
        last_reviewed_at: row.get(6)?,
    })
}

fn row_to_lesson_progress(row: &Row) -> rusqlite::Result<LessonProgress> {
    Ok(LessonProgress {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        completed: row.get(2)?,
        score: row.get(3)?,
        xp_earned: row.get(4)?,
        time_spent_seconds: row.get(5)?,
        completed_at: row.get(6)?,
        attempts: row.get(7)?,
    })
}

/// Parses a stored ISO date; empty string or NULL mean "no date".
fn parse_stored_date(value: Option<String>) -> DbResult<Option<CalendarDate>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| DbError::InvalidDate(s.to_string())),
    }
}

impl Store for SqliteStore {
    fn transaction<T>(&self, f: impl FnOnce(&Self) -> DbResult<T>) -> DbResult<T> {
        // Dropping the transaction without commit rolls it back
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    fn insert_vocabulary_item(&self, item: &NewVocabularyItem) -> DbResult<VocabularyItem> {
        // Same text in the same lesson: keep the existing row and its learned flag
        if let Some(existing) = self.find_vocabulary_item(&item.text, item.lesson_id.as_deref())? {
            return Ok(existing);
        }

        self.conn.execute(
            "INSERT INTO vocabulary_item (text, transliteration, translation, category, lesson_id, learned)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                item.text,
                item.transliteration,
                item.translation,
                item.category,
                item.lesson_id
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.vocabulary_item_by_id(id)?
            .ok_or_else(|| DbError::NotFound(format!("vocabulary item {id}")))
    }

    fn vocabulary_item_by_id(&self, id: i64) -> DbResult<Option<VocabularyItem>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {VOCABULARY_COLUMNS} FROM vocabulary_item WHERE id = ?1"),
                params![id],
                row_to_vocabulary_item,
            )
            .optional()?;
        Ok(item)
    }

    fn vocabulary_item_count(&self) -> DbResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM vocabulary_item", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn learned_vocabulary_items(&self) -> DbResult<Vec<VocabularyItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabulary_item WHERE learned = 1 ORDER BY id ASC"
        ))?;
        let items = stmt
            .query_map([], row_to_vocabulary_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn mark_vocabulary_learned_by_lesson(&self, lesson_id: &str) -> DbResult<usize> {
        let changed = self.conn.execute(
            "UPDATE vocabulary_item SET learned = 1 WHERE lesson_id = ?1 AND learned = 0",
            params![lesson_id],
        )?;
        debug!(lesson_id, changed, "marked lesson vocabulary learned");
        Ok(changed)
    }

    fn review_card_by_vocabulary_id(&self, vocabulary_id: i64) -> DbResult<Option<ReviewCard>> {
        let card = self
            .conn
            .query_row(
                &format!("SELECT {REVIEW_CARD_COLUMNS} FROM review_card WHERE vocabulary_id = ?1"),
                params![vocabulary_id],
                row_to_review_card,
            )
            .optional()?;
        Ok(card)
    }

    fn review_card_by_id(&self, id: i64) -> DbResult<Option<ReviewCard>> {
        let card = self
            .conn
            .query_row(
                &format!("SELECT {REVIEW_CARD_COLUMNS} FROM review_card WHERE id = ?1"),
                params![id],
                row_to_review_card,
            )
            .optional()?;
        Ok(card)
    }

    fn create_review_card(&self, card: &NewReviewCard) -> DbResult<ReviewCard> {
        self.conn.execute(
            "INSERT INTO review_card (vocabulary_id, easiness_factor, interval_days, repetitions, next_review_date, last_reviewed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                card.vocabulary_id,
                card.easiness_factor,
                card.interval_days,
                card.repetitions,
                card.next_review_date,
                card.last_reviewed_at
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.review_card_by_id(id)?
            .ok_or_else(|| DbError::NotFound(format!("review card {id}")))
    }

    fn update_review_card(&self, card: &ReviewCard) -> DbResult<ReviewCard> {
        let changed = self.conn.execute(
            "UPDATE review_card
             SET easiness_factor = ?1, interval_days = ?2, repetitions = ?3, next_review_date = ?4, last_reviewed_at = ?5
             WHERE id = ?6",
            params![
                card.easiness_factor,
                card.interval_days,
                card.repetitions,
                card.next_review_date,
                card.last_reviewed_at,
                card.id
            ],
        )?;

        if changed == 0 {
            return Err(DbError::NotFound(format!("review card {}", card.id)));
        }
        self.review_card_by_id(card.id)?
            .ok_or_else(|| DbError::NotFound(format!("review card {}", card.id)))
    }

    fn due_review_cards(&self, now: i64) -> DbResult<Vec<ReviewCard>> {
        // Oldest-due first; id breaks ties so the order is stable
        self.query_review_cards(
            &format!(
                "SELECT {REVIEW_CARD_COLUMNS} FROM review_card
                 WHERE next_review_date <= ?1
                 ORDER BY next_review_date ASC, id ASC"
            ),
            params![now],
        )
    }

    fn all_review_cards(&self) -> DbResult<Vec<ReviewCard>> {
        self.query_review_cards(
            &format!("SELECT {REVIEW_CARD_COLUMNS} FROM review_card ORDER BY id ASC"),
            [],
        )
    }

    fn get_or_create_daily_streak(&self) -> DbResult<DailyStreak> {
        // Create the singleton row with defaults on first access
        self.conn
            .execute("INSERT OR IGNORE INTO daily_streak (id) VALUES (1)", [])?;

        let (current_streak, longest_streak, last_activity, freezes_available, freeze_used) =
            self.conn.query_row(
                "SELECT current_streak, longest_streak, last_activity_date, freezes_available, freeze_used_date
                 FROM daily_streak WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )?;

        Ok(DailyStreak {
            current_streak,
            longest_streak,
            last_activity_date: parse_stored_date(last_activity)?,
            freezes_available,
            freeze_used_date: parse_stored_date(freeze_used)?,
        })
    }

    fn update_daily_streak(&self, streak: &DailyStreak) -> DbResult<DailyStreak> {
        self.conn.execute(
            "INSERT INTO daily_streak (id, current_streak, longest_streak, last_activity_date, freezes_available, freeze_used_date)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_activity_date = excluded.last_activity_date,
                freezes_available = excluded.freezes_available,
                freeze_used_date = excluded.freeze_used_date",
            params![
                streak.current_streak,
                streak.longest_streak,
                streak
                    .last_activity_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                streak.freezes_available,
                streak.freeze_used_date.map(|d| d.to_string())
            ],
        )?;
        self.get_or_create_daily_streak()
    }

    fn record_lesson_result(
        &self,
        lesson_id: &str,
        result: &LessonResult,
        completed_at: i64,
    ) -> DbResult<LessonProgress> {
        // Keep the best score, accumulate XP and time, count the attempt
        self.conn.execute(
            "INSERT INTO lesson_progress (lesson_id, completed, score, xp_earned, time_spent_seconds, completed_at, attempts)
             VALUES (?1, 1, ?2, ?3, ?4, ?5, 1)
             ON CONFLICT(lesson_id) DO UPDATE SET
                completed = 1,
                score = MAX(score, excluded.score),
                xp_earned = xp_earned + excluded.xp_earned,
                time_spent_seconds = time_spent_seconds + excluded.time_spent_seconds,
                completed_at = excluded.completed_at,
                attempts = attempts + 1",
            params![
                lesson_id,
                result.score,
                result.xp_earned,
                result.time_spent_seconds,
                completed_at
            ],
        )?;

        self.lesson_progress(lesson_id)?
            .ok_or_else(|| DbError::NotFound(format!("lesson progress {lesson_id}")))
    }

    fn lesson_progress(&self, lesson_id: &str) -> DbResult<Option<LessonProgress>> {
        let progress = self
            .conn
            .query_row(
                &format!(
                    "SELECT {LESSON_PROGRESS_COLUMNS} FROM lesson_progress WHERE lesson_id = ?1"
                ),
                params![lesson_id],
                row_to_lesson_progress,
            )
            .optional()?;
        Ok(progress)
    }

    fn all_lesson_progress(&self) -> DbResult<Vec<LessonProgress>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LESSON_PROGRESS_COLUMNS} FROM lesson_progress ORDER BY id ASC"
        ))?;
        let progress = stmt
            .query_map([], row_to_lesson_progress)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(progress)
    }

    fn completed_lesson_count_since(&self, since: i64) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM lesson_progress WHERE completed = 1 AND completed_at >= ?1",
            params![since],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn day_offset(&self) -> DbResult<i64> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = 'day_offset'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        // No row yet means the clock was never advanced
        match value {
            None => Ok(0),
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| DbError::InvalidState(format!("day_offset = '{v}'"))),
        }
    }

    /// Moves the simulated clock forward by 24 hours (for practicing reviews).
    fn advance_day(&self) -> DbResult<i64> {
        let offset = self.day_offset()? + 1;
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES ('day_offset', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![offset.to_string()],
        )?;
        debug!(offset, "advanced simulated day");
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson_item(text: &str, lesson: &str) -> NewVocabularyItem {
        NewVocabularyItem::new(text, format!("{text}-translation")).in_lesson(lesson)
    }

    #[test]
    fn test_insert_vocabulary_is_idempotent_per_lesson() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store.insert_vocabulary_item(&lesson_item("α", "l1")).unwrap();
        let again = store.insert_vocabulary_item(&lesson_item("α", "l1")).unwrap();
        let other_lesson = store.insert_vocabulary_item(&lesson_item("α", "l2")).unwrap();

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other_lesson.id);
        assert!(!first.learned);
        assert_eq!(store.vocabulary_item_count().unwrap(), 2);
    }

    #[test]
    fn test_insert_vocabulary_without_lesson_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store
            .insert_vocabulary_item(&NewVocabularyItem::new("ναι", "yes"))
            .unwrap();
        let again = store
            .insert_vocabulary_item(&NewVocabularyItem::new("ναι", "yes"))
            .unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(first.lesson_id, None);
    }

    #[test]
    fn test_mark_learned_flips_only_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_vocabulary_item(&lesson_item("α", "l1")).unwrap();
        store.insert_vocabulary_item(&lesson_item("β", "l1")).unwrap();
        store.insert_vocabulary_item(&lesson_item("γ", "l2")).unwrap();

        assert_eq!(store.mark_vocabulary_learned_by_lesson("l1").unwrap(), 2);
        assert_eq!(store.mark_vocabulary_learned_by_lesson("l1").unwrap(), 0);

        let learned: Vec<String> = store
            .learned_vocabulary_items()
            .unwrap()
            .into_iter()
            .map(|item| item.text)
            .collect();
        assert_eq!(learned, vec!["α", "β"]);
    }

    #[test]
    fn test_review_card_roundtrip_keeps_full_precision() {
        let store = SqliteStore::open_in_memory().unwrap();
        let item = store.insert_vocabulary_item(&lesson_item("α", "l1")).unwrap();

        let created = store
            .create_review_card(&NewReviewCard::due_now(item.id, 1_000))
            .unwrap();
        assert_eq!(created.vocabulary_id, item.id);
        assert_eq!(created.easiness_factor, 2.5);
        assert_eq!(created.last_reviewed_at, None);

        let mut changed = created.clone();
        changed.easiness_factor = 1.3 + 1.0 / 3.0;
        changed.interval_days = 6;
        changed.repetitions = 2;
        changed.next_review_date = 1_000 + 6 * 86_400;
        changed.last_reviewed_at = Some(1_000);

        let updated = store.update_review_card(&changed).unwrap();
        assert_eq!(updated, changed);
        assert_eq!(
            store.review_card_by_vocabulary_id(item.id).unwrap(),
            Some(changed)
        );
    }

    #[test]
    fn test_update_missing_card_is_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ghost = ReviewCard {
            id: 99,
            vocabulary_id: 1,
            easiness_factor: 2.5,
            interval_days: 0,
            repetitions: 0,
            next_review_date: 0,
            last_reviewed_at: None,
        };

        assert!(matches!(
            store.update_review_card(&ghost),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_second_card_for_same_vocabulary_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let item = store.insert_vocabulary_item(&lesson_item("α", "l1")).unwrap();

        store
            .create_review_card(&NewReviewCard::due_now(item.id, 0))
            .unwrap();
        assert!(
            store
                .create_review_card(&NewReviewCard::due_now(item.id, 0))
                .is_err()
        );
    }

    #[test]
    fn test_due_cards_are_ordered_oldest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (text, due) in [("α", 300), ("β", 100), ("γ", 200), ("δ", 900)] {
            let item = store.insert_vocabulary_item(&lesson_item(text, "l1")).unwrap();
            store
                .create_review_card(&NewReviewCard::due_now(item.id, due))
                .unwrap();
        }

        let due: Vec<i64> = store
            .due_review_cards(300)
            .unwrap()
            .into_iter()
            .map(|card| card.next_review_date)
            .collect();

        assert_eq!(due, vec![100, 200, 300]);
        assert_eq!(store.all_review_cards().unwrap().len(), 4);
    }

    #[test]
    fn test_daily_streak_is_singleton() {
        let store = SqliteStore::open_in_memory().unwrap();

        let fresh = store.get_or_create_daily_streak().unwrap();
        assert_eq!(fresh, DailyStreak::default());

        let updated = DailyStreak {
            current_streak: 3,
            longest_streak: 5,
            last_activity_date: "2024-05-10".parse().ok(),
            freezes_available: 1,
            freeze_used_date: "2024-05-08".parse().ok(),
        };
        assert_eq!(store.update_daily_streak(&updated).unwrap(), updated);
        assert_eq!(store.get_or_create_daily_streak().unwrap(), updated);

        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM daily_streak", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_daily_streak_never_active_is_stored_as_empty_string() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.update_daily_streak(&DailyStreak::default()).unwrap();

        let (last, freeze): (String, Option<String>) = store
            .conn
            .query_row(
                "SELECT last_activity_date, freeze_used_date FROM daily_streak",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(last, "");
        assert_eq!(freeze, None);
    }

    #[test]
    fn test_corrupt_streak_date_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO daily_streak (id, last_activity_date) VALUES (1, 'not-a-date')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get_or_create_daily_streak(),
            Err(DbError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_advance_day() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.day_offset().unwrap(), 0);
        assert_eq!(store.advance_day().unwrap(), 1);
        assert_eq!(store.advance_day().unwrap(), 2);
        assert_eq!(store.day_offset().unwrap(), 2);
    }

    #[test]
    fn test_corrupt_day_offset_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        for _ in 0..5 {
            store.advance_day().unwrap();
        }
        store
            .conn
            .execute(
                "UPDATE app_state SET value = 'garbage' WHERE key = 'day_offset'",
                [],
            )
            .unwrap();

        assert!(matches!(store.day_offset(), Err(DbError::InvalidState(_))));
        assert!(matches!(store.advance_day(), Err(DbError::InvalidState(_))));

        // The bad value is left for the user to repair, not overwritten.
        let stored: String = store
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = 'day_offset'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "garbage");
    }

    #[test]
    fn test_lesson_result_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.lesson_progress("u1-l1").unwrap(), None);

        let first = store
            .record_lesson_result(
                "u1-l1",
                &LessonResult {
                    score: 80,
                    xp_earned: 10,
                    time_spent_seconds: 120,
                },
                1_000,
            )
            .unwrap();
        assert!(first.completed);
        assert_eq!(first.attempts, 1);
        assert_eq!(first.completed_at, Some(1_000));

        let second = store
            .record_lesson_result(
                "u1-l1",
                &LessonResult {
                    score: 60,
                    xp_earned: 5,
                    time_spent_seconds: 30,
                },
                2_000,
            )
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.attempts, 2);
        assert_eq!(second.score, 80);
        assert_eq!(second.xp_earned, 15);
        assert_eq!(second.time_spent_seconds, 150);
        assert_eq!(second.completed_at, Some(2_000));
        assert_eq!(store.all_lesson_progress().unwrap(), vec![second]);
    }

    #[test]
    fn test_completed_lesson_count_since() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = LessonResult::default();
        store.record_lesson_result("l1", &result, 100).unwrap();
        store.record_lesson_result("l2", &result, 500).unwrap();
        store.record_lesson_result("l3", &result, 900).unwrap();

        assert_eq!(store.completed_lesson_count_since(0).unwrap(), 3);
        assert_eq!(store.completed_lesson_count_since(500).unwrap(), 2);
        assert_eq!(store.completed_lesson_count_since(901).unwrap(), 0);

        // Redoing an old lesson moves it into the window.
        store.record_lesson_result("l1", &result, 1_000).unwrap();
        assert_eq!(store.completed_lesson_count_since(901).unwrap(), 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = SqliteStore::open_in_memory().unwrap();

        let result: DbResult<()> = store.transaction(|store| {
            store.insert_vocabulary_item(&lesson_item("α", "l1"))?;
            store.advance_day()?;
            Err(DbError::NotFound("vocabulary item 42".to_string()))
        });
        assert!(matches!(result, Err(DbError::NotFound(_))));
        assert_eq!(store.vocabulary_item_count().unwrap(), 0);
        assert_eq!(store.day_offset().unwrap(), 0);

        let id = store
            .transaction(|store| Ok(store.insert_vocabulary_item(&lesson_item("α", "l1"))?.id))
            .unwrap();
        assert_eq!(
            store.vocabulary_item_by_id(id).unwrap().map(|item| item.text),
            Some("α".to_string())
        );
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lingo.sqlite3");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_vocabulary_item(&lesson_item("α", "l1")).unwrap();
            store.advance_day().unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.vocabulary_item_count().unwrap(), 1);
        assert_eq!(reopened.day_offset().unwrap(), 1);
    }
}

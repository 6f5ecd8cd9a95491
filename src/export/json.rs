//! JSON course import and progress export.
//! Course files provide lesson vocabulary to seed the store; progress exports
//! dump the streak, lesson progress and every review card with its vocabulary text.

use crate::database::{DbError, Store};
use crate::models::{DailyStreak, LessonProgress, NewVocabularyItem, ReviewCard};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub text: String,
    #[serde(default)]
    pub transliteration: String,
    pub translation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub category: String,
    pub vocabulary: Vec<VocabularyEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

impl Course {
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == lesson_id)
    }

    /// The small course used when the store has no vocabulary yet.
    pub fn sample() -> Self {
        let entry = |text: &str, transliteration: &str, translation: &str| VocabularyEntry {
            text: text.to_string(),
            transliteration: transliteration.to_string(),
            translation: translation.to_string(),
        };

        Course {
            id: "modern-greek".to_string(),
            title: "Modern Greek".to_string(),
            lessons: vec![
                Lesson {
                    id: "u1-l1".to_string(),
                    category: "alphabet".to_string(),
                    vocabulary: vec![
                        entry("Α α", "alfa", "alpha"),
                        entry("Β β", "vita", "beta"),
                        entry("Γ γ", "gama", "gamma"),
                    ],
                },
                Lesson {
                    id: "u1-l2".to_string(),
                    category: "greetings".to_string(),
                    vocabulary: vec![
                        entry("γεια σου", "yia sou", "hello"),
                        entry("ευχαριστώ", "efcharistó", "thank you"),
                        entry("παρακαλώ", "parakaló", "please"),
                    ],
                },
            ],
        }
    }
}

/// Reads a course from a JSON file.
pub fn import_course(path: &Path) -> Result<Course, ExportError> {
    let file = File::open(path)?;
    let course: Course = serde_json::from_reader(BufReader::new(file))?;
    info!(course = %course.id, lessons = course.lessons.len(), "course imported");
    Ok(course)
}

/// Inserts every lesson's vocabulary into the store. Items already present
/// (same text in the same lesson) are left untouched, learned flag included.
/// The whole course is stored or, on error, none of it.
/// Returns the number of vocabulary entries processed.
pub fn seed_course<S: Store + ?Sized>(store: &S, course: &Course) -> Result<usize, DbError> {
    store.transaction(|store| {
        let mut processed = 0;
        for lesson in &course.lessons {
            if lesson.vocabulary.is_empty() {
                warn!(lesson_id = %lesson.id, "lesson has no vocabulary");
            }
            for entry in &lesson.vocabulary {
                store.insert_vocabulary_item(&NewVocabularyItem {
                    text: entry.text.clone(),
                    transliteration: entry.transliteration.clone(),
                    translation: entry.translation.clone(),
                    category: lesson.category.clone(),
                    lesson_id: Some(lesson.id.clone()),
                })?;
                processed += 1;
            }
        }
        Ok(processed)
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardExport {
    pub text: String,
    pub translation: String,
    pub card: ReviewCard,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressExport {
    pub exported_at: i64,
    pub streak: DailyStreak,
    #[serde(default)]
    pub lessons: Vec<LessonProgress>,
    pub cards: Vec<CardExport>,
}

impl ProgressExport {
    pub fn collect<S: Store + ?Sized>(store: &S, exported_at: i64) -> Result<Self, DbError> {
        let mut cards = Vec::new();
        for card in store.all_review_cards()? {
            let Some(item) = store.vocabulary_item_by_id(card.vocabulary_id)? else {
                warn!(card_id = card.id, "review card without vocabulary item not exported");
                continue;
            };
            cards.push(CardExport {
                text: item.text,
                translation: item.translation,
                card,
            });
        }

        Ok(Self {
            exported_at,
            streak: store.get_or_create_daily_streak()?,
            lessons: store.all_lesson_progress()?,
            cards,
        })
    }
}

/// Writes a progress export as pretty-printed JSON.
pub fn export_json_to_path(export: &ProgressExport, path: &Path) -> Result<(), ExportError> {
    let json_string = serde_json::to_string_pretty(export)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteStore;
    use crate::models::{LessonResult, NewReviewCard};
    use std::fs;

    #[test]
    fn test_import_course() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course.json");
        fs::write(
            &path,
            r#"{
  "id": "test-course",
  "title": "Test",
  "lessons": [
    {
      "id": "l1",
      "vocabulary": [
        { "text": "νερό", "translation": "water" }
      ]
    }
  ]
}"#,
        )
        .unwrap();

        let course = import_course(&path).unwrap();
        assert_eq!(course.id, "test-course");
        let lesson = course.lesson("l1").unwrap();
        assert_eq!(lesson.category, "");
        assert_eq!(lesson.vocabulary[0].text, "νερό");
        assert_eq!(lesson.vocabulary[0].transliteration, "");
    }

    #[test]
    fn test_import_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_course(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_course(&path), Err(ExportError::Json(_))));
    }

    #[test]
    fn test_seed_course_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let course = Course::sample();

        assert_eq!(seed_course(&store, &course).unwrap(), 6);
        store.mark_vocabulary_learned_by_lesson("u1-l1").unwrap();
        seed_course(&store, &course).unwrap();

        assert_eq!(store.vocabulary_item_count().unwrap(), 6);
        assert_eq!(store.learned_vocabulary_items().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_seed_stores_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TEMP TRIGGER reject_word BEFORE INSERT ON vocabulary_item
                 WHEN NEW.text = 'ευχαριστώ'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        assert!(seed_course(&store, &Course::sample()).is_err());
        assert_eq!(store.vocabulary_item_count().unwrap(), 0);
    }

    #[test]
    fn test_export_progress() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed_course(&store, &Course::sample()).unwrap();
        store.mark_vocabulary_learned_by_lesson("u1-l2").unwrap();
        store
            .record_lesson_result("u1-l2", &LessonResult::default(), 42)
            .unwrap();
        for item in store.learned_vocabulary_items().unwrap() {
            store
                .create_review_card(&NewReviewCard::due_now(item.id, 42))
                .unwrap();
        }

        let export = ProgressExport::collect(&store, 100).unwrap();
        assert_eq!(export.cards.len(), 3);
        assert_eq!(export.cards[0].translation, "hello");
        assert_eq!(export.streak, DailyStreak::default());
        assert_eq!(export.lessons.len(), 1);
        assert_eq!(export.lessons[0].lesson_id, "u1-l2");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        export_json_to_path(&export, &path).unwrap();

        let written: ProgressExport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, export);
    }
}

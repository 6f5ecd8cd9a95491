//! Vocabulary item is a learnable word or phrase introduced by a lesson.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: i64,
    pub text: String,
    pub transliteration: String,
    pub translation: String,
    pub category: String,
    pub lesson_id: Option<String>,
    pub learned: bool,
}

/// Fields for inserting a vocabulary item; new items always start unlearned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewVocabularyItem {
    pub text: String,
    pub transliteration: String,
    pub translation: String,
    pub category: String,
    pub lesson_id: Option<String>,
}

impl NewVocabularyItem {
    pub fn new(text: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            transliteration: String::new(),
            translation: translation.into(),
            category: String::new(),
            lesson_id: None,
        }
    }

    pub fn in_lesson(mut self, lesson_id: impl Into<String>) -> Self {
        self.lesson_id = Some(lesson_id.into());
        self
    }
}

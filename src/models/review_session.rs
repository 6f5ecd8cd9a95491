//! Review session over the cards that are due right now.
//! Each card is shown once; its rating is applied through the engine (SM-2)
//! and the session moves on, whatever the rating was.

use super::{Rating, ReviewCard, VocabularyItem};
use crate::clock::Clock;
use crate::database::{DbResult, Store};
use crate::engine::ReviewEngine;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub again: usize,
    pub hard: usize,
    pub good: usize,
    pub easy: usize,
}

impl SessionSummary {
    pub fn total(&self) -> usize {
        self.again + self.hard + self.good + self.easy
    }

    /// Reviews that kept their schedule. Again and hard both restart a card.
    pub fn remembered(&self) -> usize {
        self.good + self.easy
    }

    fn record(&mut self, rating: Rating) {
        match rating {
            Rating::Again => self.again += 1,
            Rating::Hard => self.hard += 1,
            Rating::Good => self.good += 1,
            Rating::Easy => self.easy += 1,
        }
    }
}

pub struct ReviewSession {
    cards: Vec<(ReviewCard, VocabularyItem)>,
    current_index: usize,
    pub show_translation: bool,
    summary: SessionSummary,
}

impl ReviewSession {
    pub fn new(cards: Vec<(ReviewCard, VocabularyItem)>) -> Self {
        Self {
            cards,
            current_index: 0,
            show_translation: false,
            summary: SessionSummary::default(),
        }
    }

    /// Starts a session from everything currently due, capped at `max_cards`.
    pub fn start<S: Store, C: Clock>(
        engine: &ReviewEngine<S, C>,
        max_cards: Option<usize>,
    ) -> DbResult<Self> {
        let mut cards = engine.due_session()?;
        if let Some(max) = max_cards {
            cards.truncate(max);
        }
        Ok(Self::new(cards))
    }

    pub fn current(&self) -> Option<&(ReviewCard, VocabularyItem)> {
        self.cards.get(self.current_index)
    }

    pub fn reveal(&mut self) {
        self.show_translation = true;
    }

    /// Rates the current card, persists its new schedule and advances.
    /// Returns `None` once the session is over.
    pub fn rate_current<S: Store, C: Clock>(
        &mut self,
        engine: &ReviewEngine<S, C>,
        rating: Rating,
    ) -> DbResult<Option<ReviewCard>> {
        let Some((card, _)) = self.cards.get_mut(self.current_index) else {
            return Ok(None);
        };

        let updated = engine.process_review(card, rating)?;
        *card = updated.clone();

        self.summary.record(rating);
        self.current_index += 1;
        self.show_translation = false;
        Ok(Some(updated))
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.cards.len()
    }

    pub fn reviewed_count(&self) -> usize {
        self.current_index.min(self.cards.len())
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.reviewed_count()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn progress_message(&self) -> String {
        if self.is_completed() {
            return format!("Session complete ({} reviewed)", self.reviewed_count());
        }
        format!("Card {} of {}", self.reviewed_count() + 1, self.total_count())
    }
}

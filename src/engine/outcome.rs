use chrono::{DateTime, Utc};

use crate::engine::scores::ScoreBook;
use crate::store::backend::Backend;
use crate::store::score_store::ScoreStore;

pub const DEFAULT_MISTAKE_WEIGHT: f64 = 1.0;
pub const DEFAULT_CORRECT_BETA: f64 = 0.15;
pub const DEFAULT_PERFECT_STREAK_RESET: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringParams {
    pub mistake_weight: f64,
    pub hint_weight: f64,
    pub correct_beta: f64,
    /// Consecutive unaided correct answers that wipe a character's score.
    pub perfect_streak_reset: u32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            mistake_weight: DEFAULT_MISTAKE_WEIGHT,
            hint_weight: DEFAULT_MISTAKE_WEIGHT,
            correct_beta: DEFAULT_CORRECT_BETA,
            perfect_streak_reset: DEFAULT_PERFECT_STREAK_RESET,
        }
    }
}

pub fn bump_mistake(book: &mut ScoreBook, id: &str, weight: f64, now: DateTime<Utc>) {
    let entry = book.entry_mut(id, now);
    entry.mistakes += 1;
    entry.attempts += 1;
    entry.score += weight.max(0.0);
    entry.perfect_streak = 0;
    entry.updated_at = now;
}

/// A hint costs the same as a mistake but is tallied separately.
pub fn bump_hint(book: &mut ScoreBook, id: &str, weight: f64, now: DateTime<Utc>) {
    let entry = book.entry_mut(id, now);
    entry.hints += 1;
    entry.attempts += 1;
    entry.score += weight.max(0.0);
    entry.perfect_streak = 0;
    entry.updated_at = now;
}

pub fn smooth_correct(
    book: &mut ScoreBook,
    id: &str,
    beta: f64,
    streak_reset: u32,
    now: DateTime<Utc>,
) {
    let entry = book.entry_mut(id, now);
    entry.attempts += 1;
    entry.score = (entry.score - beta.max(0.0)).max(0.0);
    entry.perfect_streak += 1;
    if entry.perfect_streak >= streak_reset.max(1) {
        entry.score = 0.0;
        entry.perfect_streak = 0;
    }
    entry.updated_at = now;
}

/// Applies learner outcomes to a persisted score store. Each call is one
/// event and one whole-snapshot write.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutcomeRecorder {
    pub params: ScoringParams,
}

impl OutcomeRecorder {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn mistake<B: Backend>(&self, store: &mut ScoreStore<B>, id: &str) {
        let weight = self.params.mistake_weight;
        store.update(|book, now| bump_mistake(book, id, weight, now));
    }

    pub fn hint<B: Backend>(&self, store: &mut ScoreStore<B>, id: &str) {
        let weight = self.params.hint_weight;
        store.update(|book, now| bump_hint(book, id, weight, now));
    }

    pub fn correct<B: Backend>(&self, store: &mut ScoreStore<B>, id: &str) {
        let ScoringParams {
            correct_beta,
            perfect_streak_reset,
            ..
        } = self.params;
        store.update(|book, now| smooth_correct(book, id, correct_beta, perfect_streak_reset, now));
    }
}

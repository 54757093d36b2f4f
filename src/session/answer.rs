use icu_normalizer::ComposingNormalizerBorrowed;

use crate::catalog::CharacterRecord;
use crate::config::AnswerMode;
use crate::session::meaning::meaning_synonyms;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Not enough input to decide yet.
    Pending,
    Correct,
    Incorrect,
}

/// NFKC folds full-width IME input ("ｋａ") onto plain ASCII.
pub fn normalize_input(input: &str) -> String {
    let nfkc = ComposingNormalizerBorrowed::new_nfkc();
    nfkc.normalize(input).trim().to_lowercase()
}

/// Single-letter readings resolve after one keystroke, everything else
/// after two.
pub fn required_length(answer: &str) -> usize {
    if answer.trim().chars().count() == 1 { 1 } else { 2 }
}

pub fn judge_reading(record: &CharacterRecord, typed: &str) -> Verdict {
    let typed = normalize_input(typed);
    let need = required_length(&record.answer);
    if typed.chars().count() < need {
        return Verdict::Pending;
    }
    let expected: String = record.answer.trim().to_lowercase().chars().take(need).collect();
    let got: String = typed.chars().take(need).collect();
    if got == expected {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Exact synonym wins immediately; a miss is only called once the input is
/// at least as long as the longest synonym (and never under 3 characters).
pub fn judge_meaning(record: &CharacterRecord, typed: &str, lang: &str) -> Verdict {
    let typed = normalize_input(typed);
    let synonyms = meaning_synonyms(record, lang);
    if synonyms.iter().any(|s| *s == typed) {
        return Verdict::Correct;
    }
    let longest = synonyms.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    let typed_len = typed.chars().count();
    if typed_len > 0 && typed_len >= longest.max(3) {
        Verdict::Incorrect
    } else {
        Verdict::Pending
    }
}

#[derive(Clone, Debug)]
pub struct AnswerMatcher {
    pub mode: AnswerMode,
    pub lang: String,
}

impl AnswerMatcher {
    pub fn new(mode: AnswerMode, lang: &str) -> Self {
        Self {
            mode,
            lang: lang.to_string(),
        }
    }

    pub fn judge(&self, record: &CharacterRecord, typed: &str) -> Verdict {
        match self.mode {
            AnswerMode::Reading => judge_reading(record, typed),
            AnswerMode::Meaning if record.meaning.is_some() => {
                judge_meaning(record, typed, &self.lang)
            }
            AnswerMode::Meaning => judge_reading(record, typed),
        }
    }
}

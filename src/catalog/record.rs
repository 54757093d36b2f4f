use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Katakana,
    Hiragana,
    Kanji,
    Radicals,
}

impl Script {
    pub fn to_key(self) -> &'static str {
        match self {
            Script::Katakana => "katakana",
            Script::Hiragana => "hiragana",
            Script::Kanji => "kanji",
            Script::Radicals => "radicals",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "katakana" => Some(Script::Katakana),
            "hiragana" => Some(Script::Hiragana),
            "kanji" => Some(Script::Kanji),
            "radicals" => Some(Script::Radicals),
            _ => None,
        }
    }

    pub fn all() -> &'static [Script] {
        &[
            Script::Katakana,
            Script::Hiragana,
            Script::Kanji,
            Script::Radicals,
        ]
    }

    /// Kanji and radicals carry meanings and can be drilled by meaning instead
    /// of reading.
    pub fn supports_meaning(self) -> bool {
        matches!(self, Script::Kanji | Script::Radicals)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_key())
    }
}

/// One drillable character. `id` is the scoring identity: the romaji for kana,
/// the glyph itself for kanji and radicals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: String,
    pub glyph: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(
        default,
        rename = "localizedMeaning",
        alias = "localized_meaning",
        skip_serializing_if = "Option::is_none"
    )]
    pub localized_meaning: Option<String>,
}

impl CharacterRecord {
    pub fn kana(glyph: &str, romaji: &str) -> Self {
        Self {
            id: romaji.to_string(),
            glyph: glyph.to_string(),
            answer: romaji.to_string(),
            meaning: None,
            localized_meaning: None,
        }
    }

    pub fn with_meaning(glyph: &str, reading: &str, meaning: &str) -> Self {
        Self {
            id: glyph.to_string(),
            glyph: glyph.to_string(),
            answer: reading.to_string(),
            meaning: Some(meaning.to_string()),
            localized_meaning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_key_round_trip() {
        for &script in Script::all() {
            assert_eq!(Script::from_key(script.to_key()), Some(script));
        }
        assert_eq!(Script::from_key("cyrillic"), None);
    }

    #[test]
    fn test_record_reads_camel_case_localized_meaning() {
        let json = r#"{ "id": "山", "glyph": "山", "answer": "yama", "meaning": "mountain", "localizedMeaning": "гора" }"#;
        let record: CharacterRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.localized_meaning.as_deref(), Some("гора"));
        assert_eq!(record.meaning.as_deref(), Some("mountain"));
    }

    #[test]
    fn test_kana_record_uses_romaji_as_id() {
        let record = CharacterRecord::kana("カ", "ka");
        assert_eq!(record.id, "ka");
        assert_eq!(record.answer, "ka");
        assert!(record.meaning.is_none());
    }
}

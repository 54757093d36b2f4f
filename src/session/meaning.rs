use crate::catalog::CharacterRecord;

const KANJI_DIGITS: &[(&str, &str)] = &[
    ("\u{4E00}", "1"),     // 一
    ("\u{4E8C}", "2"),     // 二
    ("\u{4E09}", "3"),     // 三
    ("\u{56DB}", "4"),     // 四
    ("\u{4E94}", "5"),     // 五
    ("\u{516D}", "6"),     // 六
    ("\u{4E03}", "7"),     // 七
    ("\u{516B}", "8"),     // 八
    ("\u{4E5D}", "9"),     // 九
    ("\u{5341}", "10"),    // 十
    ("\u{767E}", "100"),   // 百
    ("\u{5343}", "1000"),  // 千
    ("\u{4E07}", "10000"), // 万
];

const PHRASE_REPLACEMENTS: &[(&str, &str)] = &[
    ("go slowly", "slow"),
    ("hands joined", "join"),
    ("shoot with a bow", "shoot"),
    ("right open box", "box"),
    ("open box", "box"),
    ("down box", "box"),
    ("hiding enclosure", "hide"),
    ("short-tailed bird", "bird"),
    ("soft leather", "leather"),
    ("long hair", "hair"),
    ("sacrificial wine", "wine"),
    ("half of a tree trunk", "trunk"),
    ("lines on a trigram", "trigram"),
];

const TOKEN_REPLACEMENTS: &[(&str, &str)] =
    &[("slowly", "slow"), ("joined", "join"), ("hiding", "hide")];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "with", "and", "to", "in", "on", "by", "for", "right", "left", "up",
    "down", "open", "closed", "close", "soft", "long", "short", "tailed", "previous", "ahead",
];

pub fn numeric_synonym(glyph: &str) -> Option<&'static str> {
    KANJI_DIGITS
        .iter()
        .find(|(kanji, _)| *kanji == glyph)
        .map(|(_, digits)| *digits)
}

fn split_meanings(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(['/', ','])
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Collapse a (possibly multi-word) meaning to one typeable word, e.g.
/// "short-tailed bird" -> "bird", "half of a tree trunk" -> "trunk".
pub fn single_word_meaning(raw: &str) -> String {
    let Some(first) = split_meanings(raw).next() else {
        return String::new();
    };
    if let Some((_, word)) = PHRASE_REPLACEMENTS.iter().find(|(p, _)| *p == first) {
        return word.to_string();
    }

    let normalized = first.replace('-', " ");
    let tokens: Vec<&str> = normalized
        .split_whitespace()
        .map(|t| {
            TOKEN_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == t)
                .map_or(t, |(_, to)| *to)
        })
        .collect();
    let content: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !STOPWORDS.contains(t))
        .collect();
    let pick = if content.is_empty() { &tokens } else { &content };
    pick.last().map_or(first.clone(), |w| w.to_string())
}

/// Every answer accepted for `record` when drilling by meaning.
pub fn meaning_synonyms(record: &CharacterRecord, lang: &str) -> Vec<String> {
    let raw = record.meaning.as_deref().unwrap_or_default();
    let mut synonyms: Vec<String> = split_meanings(raw).collect();

    if let Some(digits) = numeric_synonym(&record.glyph) {
        synonyms.push(digits.to_string());
    }

    let single = single_word_meaning(raw);
    if !single.is_empty() && !synonyms.contains(&single) {
        synonyms.push(single);
    }

    if lang != "en"
        && let Some(localized) = record
            .localized_meaning
            .as_deref()
            .and_then(|l| split_meanings(l).next())
        && !synonyms.contains(&localized)
    {
        synonyms.push(localized);
    }

    synonyms
}

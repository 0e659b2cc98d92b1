//! Language handling for search queries.
//!
//! Callers pass full language strings in Accept-Language form (for example
//! `"en-GB,en;q=0.9"`). Matching only ever uses the primary subtag of the
//! first entry. Logographic scripts are exempt from the short-query guard,
//! since a single character there is a meaningful search unit.

/// Extract the primary language subtag from a full language string.
///
/// `"en-GB,en;q=0.9"` becomes `"en"`, `"zh-Hans"` becomes `"zh"`. An empty
/// input yields an empty subtag, which matches no vernacular rows.
pub fn primary_subtag(language: &str) -> String {
    language
        .split(',')
        .next()
        .unwrap_or("")
        .split('-')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Primary subtags of languages written in logographic (or otherwise
/// unsegmented) scripts, where one character can carry a full word.
const LOGOGRAPHIC_LANGS: &[&str] = &["zh", "cmn", "yue", "ja", "ko"];

/// Check whether a word should be treated as logographic for the given
/// primary language subtag.
///
/// True only when the language family is logographic and every character
/// of the word belongs to a logographic block. A romanized word typed
/// under a `zh` locale still counts as segmented text.
pub fn is_logographic(word: &str, lang_primary: &str) -> bool {
    if !LOGOGRAPHIC_LANGS.contains(&lang_primary) {
        return false;
    }
    !word.is_empty() && word.chars().all(is_logographic_char)
}

fn is_logographic_char(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF         // hiragana and katakana
        | 0x3400..=0x4DBF       // CJK extension A
        | 0x4E00..=0x9FFF       // CJK unified ideographs
        | 0xAC00..=0xD7AF       // hangul syllables
        | 0xF900..=0xFAFF       // CJK compatibility ideographs
        | 0x20000..=0x2A6DF     // CJK extension B
    )
}

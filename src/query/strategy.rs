//! Match-strategy selection for name searches.
//!
//! The external store's full-text index refuses to index tokens shorter
//! than a minimum length (three by default), so a query is split into long
//! and short tokens. Long tokens drive an indexed boolean full-text
//! predicate; short tokens are recovered with substring checks. When no
//! token is long enough to be indexed at all, the whole query falls back
//! to a left-anchored prefix match against name fields.

use crate::core::is_logographic;
use crate::query::tokenizer::tokenize;

/// How a query is matched against name fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Indexed boolean full-text search over the long tokens, with
    /// substring checks for the short tokens.
    FullText {
        /// Long tokens; each must prefix-match a word of the candidate.
        required: Vec<String>,
        /// Short tokens; each must appear as a substring of the candidate.
        contains: Vec<String>,
    },
    /// Left-anchored match of the whole original query.
    Prefix { stem: String },
}

/// Plan a name query, or reject it.
///
/// Returns `None` when the query has no tokens, or when every token is a
/// single non-logographic character: such queries would flood the store
/// with unindexable one-letter matches, and are treated as a no-match
/// rather than an error. Logographic tokens are exempt because a single
/// character there is a whole word.
pub fn plan_query(raw: &str, lang_primary: &str, min_token_len: usize) -> Option<MatchStrategy> {
    let words = tokenize(raw);
    if words.is_empty() {
        return None;
    }
    if words
        .iter()
        .all(|w| w.chars().count() <= 1 && !is_logographic(w, lang_primary))
    {
        return None;
    }

    let (required, contains): (Vec<String>, Vec<String>) = words
        .into_iter()
        .partition(|w| w.chars().count() >= min_token_len);

    if required.is_empty() {
        // Nothing is indexable: match the raw query as a prefix of the
        // whole phrase instead.
        Some(MatchStrategy::Prefix {
            stem: raw.to_string(),
        })
    } else {
        Some(MatchStrategy::FullText { required, contains })
    }
}

impl MatchStrategy {
    /// The full candidate predicate: every term of the strategy must hold.
    ///
    /// Used to select candidate rows, mirroring what the store's combined
    /// full-text-plus-substring (or prefix) query would return.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::FullText { required, contains } => {
                required.iter().all(|w| word_prefix_match(text, w))
                    && contains.iter().all(|w| contains_ci(text, w))
            }
            Self::Prefix { stem } => starts_with_ci(text, stem),
        }
    }

    /// The match-status annotation for vernacular rows.
    ///
    /// In full-text mode only the indexed (long-token) part of the
    /// predicate participates, matching what the text index itself can
    /// report; in prefix mode this is the same as [`Self::matches`].
    pub fn annotates(&self, text: &str) -> bool {
        match self {
            Self::FullText { required, .. } => {
                required.iter().all(|w| word_prefix_match(text, w))
            }
            Self::Prefix { stem } => starts_with_ci(text, stem),
        }
    }
}

/// Case-insensitive check that `term` is a prefix of some word of `text`.
fn word_prefix_match(text: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    tokenize(text)
        .iter()
        .any(|word| word.to_lowercase().starts_with(&term))
}

fn contains_ci(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(&term.to_lowercase())
}

fn starts_with_ci(text: &str, stem: &str) -> bool {
    text.to_lowercase().starts_with(&stem.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: usize = 3;

    #[test]
    fn test_single_long_token_uses_full_text() {
        let strategy = plan_query("panda", "en", MIN).unwrap();
        assert_eq!(
            strategy,
            MatchStrategy::FullText {
                required: vec!["panda".to_string()],
                contains: vec![],
            }
        );
    }

    #[test]
    fn test_mixed_tokens_split_long_and_short() {
        let strategy = plan_query("ox panda", "en", MIN).unwrap();
        assert_eq!(
            strategy,
            MatchStrategy::FullText {
                required: vec!["panda".to_string()],
                contains: vec!["ox".to_string()],
            }
        );
    }

    #[test]
    fn test_all_short_tokens_use_prefix_mode() {
        // Two-letter queries are accepted and served by prefix matching.
        let strategy = plan_query("zz", "en", MIN).unwrap();
        assert_eq!(
            strategy,
            MatchStrategy::Prefix {
                stem: "zz".to_string()
            }
        );
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(plan_query("", "en", MIN).is_none());
        assert!(plan_query("   ", "en", MIN).is_none());
    }

    #[test]
    fn test_single_letter_flood_rejected() {
        assert!(plan_query("a", "en", MIN).is_none());
        assert!(plan_query("a b", "en", MIN).is_none());
    }

    #[test]
    fn test_single_letter_with_long_token_accepted() {
        // One long token rescues the query; the short one becomes a
        // substring check.
        let strategy = plan_query("a panda", "en", MIN).unwrap();
        assert!(matches!(strategy, MatchStrategy::FullText { .. }));
    }

    #[test]
    fn test_logographic_single_character_not_rejected() {
        let strategy = plan_query("熊", "zh", MIN).unwrap();
        assert_eq!(
            strategy,
            MatchStrategy::Prefix {
                stem: "熊".to_string()
            }
        );
    }

    #[test]
    fn test_logographic_exemption_needs_logographic_language() {
        assert!(plan_query("熊", "en", MIN).is_none());
    }

    #[test]
    fn test_full_text_matches_word_prefixes() {
        let strategy = plan_query("pand", "en", MIN).unwrap();
        assert!(strategy.matches("Giant panda"));
        assert!(strategy.matches("PANDA"));
        assert!(!strategy.matches("Red fox"));
    }

    #[test]
    fn test_full_text_prefix_is_word_anchored() {
        let strategy = plan_query("anda", "en", MIN).unwrap();
        // "anda" occurs inside "panda" but is not a word prefix.
        assert!(!strategy.matches("Giant panda"));
    }

    #[test]
    fn test_full_text_short_tokens_match_anywhere() {
        let strategy = plan_query("fox ed", "en", MIN).unwrap();
        // "ed" is a substring of "red", not a word prefix.
        assert!(strategy.matches("Red fox"));
        assert!(!strategy.matches("Grey fox"));
    }

    #[test]
    fn test_prefix_mode_is_left_anchored() {
        let strategy = plan_query("ox", "en", MIN).unwrap();
        assert!(strategy.matches("Ox"));
        assert!(strategy.matches("ox oxon"));
        assert!(!strategy.matches("musk ox"));
    }

    #[test]
    fn test_annotates_ignores_short_tokens_in_full_text_mode() {
        let strategy = plan_query("panda qq", "en", MIN).unwrap();
        // Candidate filtering needs both tokens...
        assert!(!strategy.matches("Giant panda"));
        // ...but the index-backed annotation only sees the long one.
        assert!(strategy.annotates("Giant panda"));
    }

    #[test]
    fn test_annotates_equals_matches_in_prefix_mode() {
        let strategy = plan_query("zz", "en", MIN).unwrap();
        assert!(strategy.annotates("ZZ plant"));
        assert!(!strategy.annotates("plant zz"));
    }
}

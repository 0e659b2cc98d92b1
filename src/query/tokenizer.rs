//! Query tokenization.
//!
//! Raw query text is normalized by mapping punctuation to whitespace and
//! splitting on it. Apostrophe, dash, dot and the multiplication sign stay
//! put, since they occur inside stored names ("King-of-Saxony",
//! "Canis × familiaris").

/// Characters kept verbatim during punctuation normalization.
const KEPT_PUNCTUATION: [char; 4] = ['\'', '-', '.', '×'];

/// Replace every punctuation or symbol character with a space, keeping
/// letters, digits, whitespace, and the in-name punctuation set.
pub fn punctuation_to_space(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Split a raw query into non-empty word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    punctuation_to_space(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Split a sponsorship query into search terms.
///
/// Sponsorship matching is plain substring search, so SQL-wildcard
/// characters are stripped (`%`) or normalized to a space (`_`) before
/// splitting.
pub fn sponsor_terms(text: &str) -> Vec<String> {
    text.replace('%', "")
        .replace('_', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("giant panda"), vec!["giant", "panda"]);
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  giant \t panda  "), vec!["giant", "panda"]);
    }

    #[test]
    fn test_tokenize_punctuation_becomes_separator() {
        assert_eq!(tokenize("panda, giant (bear)"), vec!["panda", "giant", "bear"]);
    }

    #[test]
    fn test_tokenize_keeps_name_punctuation() {
        assert_eq!(
            tokenize("king-of-saxony bird's t. rex"),
            vec!["king-of-saxony", "bird's", "t.", "rex"]
        );
        assert_eq!(tokenize("Canis × familiaris"), vec!["Canis", "×", "familiaris"]);
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("?!,;").is_empty());
    }

    #[test]
    fn test_sponsor_terms_strip_wildcards() {
        assert_eq!(sponsor_terms("ada%"), vec!["ada"]);
        assert_eq!(sponsor_terms("for_my_friend"), vec!["for", "my", "friend"]);
    }

    #[test]
    fn test_sponsor_terms_empty() {
        assert!(sponsor_terms("%%").is_empty());
        assert!(sponsor_terms("___").is_empty());
    }

    proptest! {
        #[test]
        fn prop_tokens_are_never_empty(input in ".{0,64}") {
            for token in tokenize(&input) {
                prop_assert!(!token.is_empty());
            }
        }

        #[test]
        fn prop_tokens_contain_no_whitespace(input in ".{0,64}") {
            for token in tokenize(&input) {
                prop_assert!(!token.chars().any(char::is_whitespace));
            }
        }

        #[test]
        fn prop_sponsor_terms_contain_no_sql_wildcards(input in ".{0,64}") {
            for term in sponsor_terms(&input) {
                prop_assert!(!term.contains('%'));
                prop_assert!(!term.contains('_'));
            }
        }
    }
}

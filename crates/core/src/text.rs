//! Text normalization shared by the scoring rules.

/// Lowercase, drop punctuation (apostrophes survive so "don't" stays one
/// word) and collapse runs of whitespace into a single space.
#[must_use]
pub fn normalize_sentence(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lexical databases store multi-word lemmas with separators (`ice_cream`).
#[must_use]
pub fn normalize_lemma(raw: &str) -> String {
    raw.trim()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Trimmed, non-empty text or nothing.
#[must_use]
pub fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_normalization_strips_punctuation() {
        assert_eq!(
            normalize_sentence("  The quick, brown FOX.  "),
            "the quick brown fox"
        );
        assert_eq!(normalize_sentence("Don't stop!"), "don't stop");
    }

    #[test]
    fn lemma_normalization_replaces_separators() {
        assert_eq!(normalize_lemma("Ice_Cream"), "ice cream");
        assert_eq!(normalize_lemma("well-being"), "well being");
    }

    #[test]
    fn blank_transcripts_become_absent() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" hi ".into())), Some("hi".into()));
        assert_eq!(non_blank(None), None);
    }
}

//! Scoring rules for the two games.

use std::collections::BTreeSet;

use crate::model::RoundOutcome;
use crate::scoring::similarity;
use crate::scoring::synonyms::SynonymResolver;
use crate::text::normalize_sentence;

/// A transcript counts as a synonym when it is this close to one.
pub const SYNONYM_SIMILARITY_THRESHOLD: f64 = 0.8;

/// At most this many synonyms are offered as hints after a miss.
pub const MAX_HINTS: usize = 4;

/// Result of the synonym-match rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynonymVerdict {
    Matched { synonym: String },
    /// Hint order follows the candidate set and is not a stable contract.
    NotMatched { hints: Vec<String> },
}

impl SynonymVerdict {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Feedback line for the player.
    #[must_use]
    pub fn feedback(&self, transcript: &str) -> String {
        match self {
            Self::Matched { synonym } => {
                format!("Good! Recognized: '{transcript}'. Matched synonym: {synonym}")
            }
            Self::NotMatched { hints } if hints.is_empty() => {
                format!("Not matched: '{transcript}'. Try another synonym.")
            }
            Self::NotMatched { hints } => {
                format!(
                    "Not matched: '{transcript}'. Try again. Hints: {}",
                    hints.join(", ")
                )
            }
        }
    }
}

impl From<SynonymVerdict> for RoundOutcome {
    fn from(verdict: SynonymVerdict) -> Self {
        match verdict {
            SynonymVerdict::Matched { synonym } => RoundOutcome::Matched { synonym },
            SynonymVerdict::NotMatched { hints } => RoundOutcome::NotMatched { hints },
        }
    }
}

/// Result of the repeat-sentence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatScore {
    pub percent: u8,
}

impl RepeatScore {
    #[must_use]
    pub fn feedback(&self, transcript: &str) -> String {
        format!("Recognized: '{transcript}' - similarity {}%", self.percent)
    }
}

/// Applies the game rules on top of a synonym resolver.
pub struct GameEvaluator<'a> {
    resolver: &'a dyn SynonymResolver,
}

impl<'a> GameEvaluator<'a> {
    #[must_use]
    pub fn new(resolver: &'a dyn SynonymResolver) -> Self {
        Self { resolver }
    }

    /// Candidate synonyms for a round: resolver output plus any supplied
    /// with the word, lowercased and without blanks or the word itself.
    #[must_use]
    pub fn candidates(&self, word: &str, supplied: &[String]) -> BTreeSet<String> {
        let word_lower = word.to_lowercase();
        let mut set = self.resolver.synonyms_of(word);
        set.extend(
            supplied
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        set.retain(|s| !s.is_empty() && *s != word_lower);
        set
    }

    /// Synonym-match rule.
    ///
    /// A candidate matches when it appears inside the lowercased transcript,
    /// or failing that when the whole transcript scores above
    /// `SYNONYM_SIMILARITY_THRESHOLD` against it.
    #[must_use]
    pub fn judge_synonym(&self, transcript: &str, word: &str, supplied: &[String]) -> SynonymVerdict {
        let candidates = self.candidates(word, supplied);
        let answer = transcript.to_lowercase();

        if let Some(hit) = candidates.iter().find(|s| answer.contains(s.as_str())) {
            return SynonymVerdict::Matched {
                synonym: hit.clone(),
            };
        }

        if let Some(close) = candidates
            .iter()
            .find(|s| similarity::score(&answer, s) > SYNONYM_SIMILARITY_THRESHOLD)
        {
            return SynonymVerdict::Matched {
                synonym: close.clone(),
            };
        }

        SynonymVerdict::NotMatched {
            hints: candidates.into_iter().take(MAX_HINTS).collect(),
        }
    }
}

/// Repeat-sentence rule.
///
/// Both sides are normalized with `normalize_sentence`, so case, punctuation
/// and spacing differences do not lower the score. There is no pass mark.
#[must_use]
pub fn judge_repeat(expected: &str, transcript: &str) -> RepeatScore {
    let expected = normalize_sentence(expected);
    if expected.is_empty() {
        return RepeatScore { percent: 0 };
    }
    RepeatScore {
        percent: similarity::percent(&expected, &normalize_sentence(transcript)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::FallbackResolver;

    fn hints_of(verdict: SynonymVerdict) -> Vec<String> {
        match verdict {
            SynonymVerdict::NotMatched { hints } => hints,
            SynonymVerdict::Matched { synonym } => panic!("unexpected match: {synonym}"),
        }
    }

    #[test]
    fn substring_match_reports_synonym() {
        let resolver = FallbackResolver::new();
        let evaluator = GameEvaluator::new(&resolver);
        let verdict = evaluator.judge_synonym("I feel very glad today", "happy", &[]);
        assert_eq!(
            verdict,
            SynonymVerdict::Matched {
                synonym: "glad".into()
            }
        );
        assert!(verdict.feedback("I feel very glad today").contains("Matched synonym: glad"));
    }

    #[test]
    fn miss_offers_hints_from_candidates() {
        let resolver = FallbackResolver::new();
        let evaluator = GameEvaluator::new(&resolver);
        let hints = hints_of(evaluator.judge_synonym("I feel okay", "happy", &[]));
        assert!(!hints.is_empty());
        assert!(hints.len() <= MAX_HINTS);
        for hint in &hints {
            assert!(["glad", "joyful", "pleased"].contains(&hint.as_str()));
        }
    }

    #[test]
    fn close_transcript_matches_by_similarity() {
        let resolver = FallbackResolver::new();
        let evaluator = GameEvaluator::new(&resolver);
        // No candidate is a substring of "joyfol", but it scores 10/12 against "joyful".
        let verdict = evaluator.judge_synonym("Joyfol", "happy", &[]);
        assert_eq!(
            verdict,
            SynonymVerdict::Matched {
                synonym: "joyful".into()
            }
        );
    }

    #[test]
    fn supplied_synonyms_extend_the_candidates() {
        let resolver = FallbackResolver::new();
        let evaluator = GameEvaluator::new(&resolver);
        let supplied = vec!["Felicitous".to_owned(), "  ".to_owned()];
        let verdict = evaluator.judge_synonym("that was felicitous", "lucky", &supplied);
        assert_eq!(
            verdict,
            SynonymVerdict::Matched {
                synonym: "felicitous".into()
            }
        );
    }

    #[test]
    fn repeating_the_word_itself_is_not_a_synonym() {
        let resolver = FallbackResolver::new();
        let evaluator = GameEvaluator::new(&resolver);
        let supplied = vec!["Happy".to_owned()];
        let verdict = evaluator.judge_synonym("happy", "happy", &supplied);
        assert!(!verdict.is_match());
    }

    #[test]
    fn no_candidates_suggests_another_try() {
        let resolver = FallbackResolver::new();
        let evaluator = GameEvaluator::new(&resolver);
        let verdict = evaluator.judge_synonym("hello", "zebra", &[]);
        assert_eq!(verdict, SynonymVerdict::NotMatched { hints: Vec::new() });
        assert_eq!(verdict.feedback("hello"), "Not matched: 'hello'. Try another synonym.");
    }

    #[test]
    fn repeat_ignores_trailing_punctuation() {
        let score = judge_repeat(
            "The quick brown fox jumps over the lazy dog.",
            "The quick brown fox jumps over the lazy dog",
        );
        assert_eq!(score.percent, 100);
    }

    #[test]
    fn repeat_scores_partial_attempts() {
        let score = judge_repeat("Learning by speaking is very effective.", "learning is effective");
        assert!(score.percent > 0 && score.percent < 100);
        assert_eq!(judge_repeat("", "anything").percent, 0);
        assert_eq!(judge_repeat("Hello.", "").percent, 0);
    }
}

//! Synonym lookup strategies.

use std::collections::BTreeSet;
use std::fmt;

use rand::{Rng, RngCore};

use crate::catalog::FALLBACK_WORDS;

/// A word together with synonyms that came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalEntry {
    pub word: String,
    pub synonyms: Vec<String>,
}

/// Source of synonyms for the synonym game.
///
/// The backend is chosen once at startup; callers never re-check which one
/// they hold. Lookups are independent and not cached.
pub trait SynonymResolver: Send + Sync {
    /// Lowercase synonyms of `word`, never containing `word` itself.
    fn synonyms_of(&self, word: &str) -> BTreeSet<String>;

    /// A random word with at least one synonym, or `None` if the backend has none.
    fn pick_random_entry(&self, rng: &mut dyn RngCore) -> Option<LexicalEntry>;

    /// Short name used in logs.
    fn backend_name(&self) -> &'static str;
}

impl fmt::Debug for dyn SynonymResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynonymResolver")
            .field("backend", &self.backend_name())
            .finish()
    }
}

/// Small built-in word table used when no lexical database is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackResolver;

impl FallbackResolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SynonymResolver for FallbackResolver {
    // Keys are stored lowercase and matched exactly.
    fn synonyms_of(&self, word: &str) -> BTreeSet<String> {
        FALLBACK_WORDS
            .iter()
            .filter(|(key, _)| *key == word)
            .flat_map(|(_, synonyms)| synonyms.iter())
            .map(|s| s.to_lowercase())
            .filter(|s| !s.eq_ignore_ascii_case(word))
            .collect()
    }

    fn pick_random_entry(&self, rng: &mut dyn RngCore) -> Option<LexicalEntry> {
        let (word, synonyms) = FALLBACK_WORDS.get(rng.random_range(0..FALLBACK_WORDS.len()))?;
        Some(LexicalEntry {
            word: (*word).to_owned(),
            synonyms: synonyms.iter().map(|s| (*s).to_owned()).collect(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fallback_returns_table_synonyms() {
        let syns = FallbackResolver::new().synonyms_of("happy");
        let expected: BTreeSet<String> = ["glad", "joyful", "pleased"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(syns, expected);
    }

    #[test]
    fn fallback_never_returns_the_word_itself() {
        let resolver = FallbackResolver::new();
        for (word, _) in FALLBACK_WORDS {
            let syns = resolver.synonyms_of(word);
            assert!(!syns.is_empty());
            assert!(!syns.contains(word));
        }
    }

    #[test]
    fn fallback_lookup_is_exact() {
        let resolver = FallbackResolver::new();
        assert!(resolver.synonyms_of("Happy").is_empty());
        assert!(resolver.synonyms_of("unknown").is_empty());
    }

    #[test]
    fn fallback_random_entry_is_from_table() {
        let resolver = FallbackResolver::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let entry = resolver.pick_random_entry(&mut rng).unwrap();
            assert!(FALLBACK_WORDS.iter().any(|(w, _)| *w == entry.word));
            assert_eq!(entry.synonyms.len(), 3);
        }
    }
}

//! Read-only lexical database: senses grouping interchangeable lemmas.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rand::{Rng, RngCore};
use serde::Deserialize;
use thiserror::Error;

use crate::scoring::synonyms::{LexicalEntry, SynonymResolver};
use crate::text::normalize_lemma;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LexiconError {
    #[error("could not read lexical database: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse lexical database: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("lexical database has no senses")]
    NoSenses,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    senses: Vec<SenseFile>,
}

#[derive(Debug, Deserialize)]
struct SenseFile {
    lemmas: Vec<String>,
}

/// One meaning with its surface forms, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sense {
    lemmas: Vec<String>,
}

impl Sense {
    #[must_use]
    pub fn lemmas(&self) -> &[String] {
        &self.lemmas
    }
}

/// In-memory lexical database with a surface-form index.
#[derive(Debug, Clone)]
pub struct Lexicon {
    senses: Vec<Sense>,
    index: HashMap<String, Vec<usize>>,
}

impl Lexicon {
    /// Load a lexicon from a JSON file of the form
    /// `{"senses": [{"lemmas": ["happy", "glad"]}]}`.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError` if the file cannot be read, parsed, or holds no senses.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a lexicon from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError` on malformed JSON or when no usable sense remains.
    pub fn from_json(raw: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(raw)?;
        Self::from_senses(file.senses.into_iter().map(|s| s.lemmas))
    }

    /// Build a lexicon from raw lemma groups. Empty lemmas and empty senses are dropped.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::NoSenses` when nothing usable remains.
    pub fn from_senses<I, L, S>(senses: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept = Vec::new();
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();

        for lemmas in senses {
            let mut seen = BTreeSet::new();
            let lemmas: Vec<String> = lemmas
                .into_iter()
                .map(|l| normalize_lemma(l.as_ref()))
                .filter(|l| !l.is_empty() && seen.insert(l.clone()))
                .collect();
            if lemmas.is_empty() {
                continue;
            }
            let id = kept.len();
            for lemma in &lemmas {
                index.entry(lemma.clone()).or_default().push(id);
            }
            kept.push(Sense { lemmas });
        }

        if kept.is_empty() {
            return Err(LexiconError::NoSenses);
        }
        Ok(Self {
            senses: kept,
            index,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.senses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }

    /// Every sense in which `word` appears as a surface form.
    #[must_use]
    pub fn senses_of(&self, word: &str) -> Vec<&Sense> {
        self.index
            .get(&normalize_lemma(word))
            .into_iter()
            .flatten()
            .filter_map(|&id| self.senses.get(id))
            .collect()
    }
}

/// Resolves synonyms from a loaded `Lexicon`.
#[derive(Debug, Clone)]
pub struct LexiconResolver {
    lexicon: Lexicon,
    multi: Vec<usize>,
}

impl LexiconResolver {
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        let multi = lexicon
            .senses
            .iter()
            .enumerate()
            .filter(|(_, s)| s.lemmas.len() >= 2)
            .map(|(id, _)| id)
            .collect();
        Self { lexicon, multi }
    }
}

impl SynonymResolver for LexiconResolver {
    fn synonyms_of(&self, word: &str) -> BTreeSet<String> {
        let query = normalize_lemma(word);
        self.lexicon
            .senses_of(word)
            .into_iter()
            .flat_map(|sense| sense.lemmas.iter())
            .filter(|lemma| **lemma != query)
            .cloned()
            .collect()
    }

    fn pick_random_entry(&self, rng: &mut dyn RngCore) -> Option<LexicalEntry> {
        if self.multi.is_empty() {
            return None;
        }
        let id = self.multi[rng.random_range(0..self.multi.len())];
        let sense = self.lexicon.senses.get(id)?;
        let (word, rest) = sense.lemmas.split_first()?;

        let mut seen = BTreeSet::new();
        let synonyms = rest
            .iter()
            .filter(|l| *l != word && seen.insert((*l).clone()))
            .cloned()
            .collect();
        Some(LexicalEntry {
            word: word.clone(),
            synonyms,
        })
    }

    fn backend_name(&self) -> &'static str {
        "lexicon"
    }
}

mod evaluator;
mod lexicon;
pub mod similarity;
mod synonyms;

pub use evaluator::{
    GameEvaluator, MAX_HINTS, RepeatScore, SYNONYM_SIMILARITY_THRESHOLD, SynonymVerdict,
    judge_repeat,
};
pub use lexicon::{Lexicon, LexiconError, LexiconResolver, Sense};
pub use synonyms::{FallbackResolver, LexicalEntry, SynonymResolver};

use std::path::Path;
use std::sync::Arc;

use buddy_core::scoring::{FallbackResolver, Lexicon, LexiconResolver, SynonymResolver};

/// Choose the synonym backend once for the life of the process.
///
/// A lexical database that is missing, unreadable or empty is logged and the
/// built-in word table is used instead.
#[must_use]
pub fn select_resolver(lexicon_path: Option<&Path>) -> Arc<dyn SynonymResolver> {
    let Some(path) = lexicon_path else {
        tracing::info!("no lexical database configured; using built-in word table");
        return Arc::new(FallbackResolver::new());
    };

    match Lexicon::load(path) {
        Ok(lexicon) => {
            tracing::info!(path = %path.display(), senses = lexicon.len(), "lexical database loaded");
            Arc::new(LexiconResolver::new(lexicon))
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "lexical database unavailable; using built-in word table"
            );
            Arc::new(FallbackResolver::new())
        }
    }
}

use std::ops::Index;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PromptError {
    #[error("a session needs at least one prompt")]
    Empty,

    #[error("prompt {index} is blank")]
    BlankPrompt { index: usize },
}

/// Ordered, immutable list of prompts for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptList(Vec<String>);

impl PromptList {
    /// Validate a list of prompts.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::Empty` for an empty list and
    /// `PromptError::BlankPrompt` if any entry is whitespace only.
    pub fn new<I, S>(prompts: I) -> Result<Self, PromptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompts: Vec<String> = prompts.into_iter().map(Into::into).collect();
        if prompts.is_empty() {
            return Err(PromptError::Empty);
        }
        if let Some(index) = prompts.iter().position(|p| p.trim().is_empty()) {
            return Err(PromptError::BlankPrompt { index });
        }
        Ok(Self(prompts))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Index<usize> for PromptList {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::question::{OptionIndex, QuestionIndex};

/// Options selected for one question. Ordered storage, set semantics.
pub type AnswerSet = BTreeSet<OptionIndex>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("answers are frozen")]
    Frozen,
}

/// The learner's current selections, keyed by question index.
///
/// An empty selection is never stored, so "absent" and "empty" read the same.
/// Range checks are the caller's job; the store only knows indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    entries: BTreeMap<QuestionIndex, AnswerSet>,
    frozen: bool,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every selection and accept mutations again.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.frozen = false;
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Replace the selection for `question` with exactly `option` (radio).
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Frozen` once the store is frozen.
    pub fn choose(&mut self, question: QuestionIndex, option: OptionIndex) -> Result<(), AnswerError> {
        self.ensure_mutable()?;
        self.entries.insert(question, BTreeSet::from([option]));
        Ok(())
    }

    /// Flip membership of `option` for `question` (checkbox).
    ///
    /// Returns whether the option is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Frozen` once the store is frozen.
    pub fn toggle(&mut self, question: QuestionIndex, option: OptionIndex) -> Result<bool, AnswerError> {
        self.ensure_mutable()?;
        let set = self.entries.entry(question).or_default();
        let selected = if set.remove(&option) {
            false
        } else {
            set.insert(option);
            true
        };
        if set.is_empty() {
            self.entries.remove(&question);
        }
        Ok(selected)
    }

    /// Selection for `question`, `None` when nothing is selected.
    #[must_use]
    pub fn get(&self, question: QuestionIndex) -> Option<&AnswerSet> {
        self.entries.get(&question)
    }

    #[must_use]
    pub fn is_answered(&self, question: QuestionIndex) -> bool {
        self.entries.contains_key(&question)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    fn ensure_mutable(&self) -> Result<(), AnswerError> {
        if self.frozen {
            Err(AnswerError::Frozen)
        } else {
            Ok(())
        }
    }
}

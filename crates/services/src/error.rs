//! Shared error types for the services crate.

use std::fmt;

use thiserror::Error;

use quiz_core::model::{ConfigError, QuestionError};

use crate::sessions::SessionState;

/// Which kind of index a command got wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTarget {
    Question,
    Option,
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTarget::Question => write!(f, "question"),
            IndexTarget::Option => write!(f, "option"),
        }
    }
}

/// Errors emitted by session commands and queries.
///
/// All of them are local validation failures; retrying the same call cannot
/// succeed without a state change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("{target} index {index} out of range (count {len})")]
    OutOfRange {
        target: IndexTarget,
        index: usize,
        len: usize,
    },

    #[error("malformed question bank: {0}")]
    MalformedBank(#[from] QuestionError),

    #[error("cannot {command} while session is {state}")]
    InvalidTransition {
        command: &'static str,
        state: SessionState,
    },
}

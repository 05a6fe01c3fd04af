use async_trait::async_trait;
use quiz_core::model::{QuestionBank, QuestionError};
use thiserror::Error;

/// Errors surfaced by question bank sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("malformed question bank: {0}")]
    MalformedBank(#[from] QuestionError),
}

/// Where a session's questions come from.
///
/// Loading happens once, before any session starts.
#[async_trait]
pub trait QuestionBankSource: Send + Sync {
    /// Load and validate the full bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MalformedBank` if any question is invalid, or
    /// other storage errors if the bank cannot be read.
    async fn load_bank(&self) -> Result<QuestionBank, StorageError>;
}

/// Source serving a bank already held in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    bank: QuestionBank,
}

impl InMemorySource {
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl QuestionBankSource for InMemorySource {
    async fn load_bank(&self) -> Result<QuestionBank, StorageError> {
        Ok(self.bank.clone())
    }
}

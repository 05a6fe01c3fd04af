#![forbid(unsafe_code)]

pub mod json;
pub mod repository;

pub use json::{JsonFileSource, parse_bank};
pub use repository::{InMemorySource, QuestionBankSource, StorageError};

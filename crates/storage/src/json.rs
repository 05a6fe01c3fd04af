use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::{QuestionBank, QuestionRecord};

use crate::repository::{QuestionBankSource, StorageError};

/// Parse a JSON array of question records and validate it into a bank.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the text is not a JSON array of
/// records, or `StorageError::MalformedBank` for structural violations.
pub fn parse_bank(raw: &str) -> Result<QuestionBank, StorageError> {
    let records: Vec<QuestionRecord> =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(QuestionBank::from_records(records)?)
}

/// Question bank stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionBankSource for JsonFileSource {
    async fn load_bank(&self) -> Result<QuestionBank, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(self.path.display().to_string()),
                _ => StorageError::Io(e.to_string()),
            })?;

        let bank = parse_bank(&raw).inspect_err(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "rejected question bank");
        })?;
        tracing::info!(
            path = %self.path.display(),
            questions = bank.len(),
            topics = bank.topics().len(),
            "loaded question bank"
        );
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionError;

    #[test]
    fn parses_camel_case_records() {
        let bank = parse_bank(
            r#"[
                { "question": "Who can delete a repo?", "options": ["Admin", "Read"], "correctAnswers": [0], "topic": "Repos" },
                { "question": "Pick two", "options": ["a", "b", "c"], "correctAnswers": [2, 0], "topic": "Actions" }
            ]"#,
        )
        .unwrap();

        assert_eq!(bank.len(), 2);
        assert!(bank.get(1).unwrap().is_multiple());
        assert_eq!(bank.get(0).unwrap().text(), "Who can delete a repo?");
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let err = parse_bank(
            r#"[{ "question": "Q", "options": ["a", "b"], "correctAnswers": [5], "topic": "T" }]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StorageError::MalformedBank(QuestionError::CorrectAnswerOutOfRange { answer: 5, .. })
        ));
    }

    #[test]
    fn rejects_empty_options() {
        let err = parse_bank(r#"[{ "question": "Q", "correctAnswers": [0], "topic": "T" }]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::MalformedBank(QuestionError::TooFewOptions { index: 0, found: 0 })
        ));
    }

    #[test]
    fn rejects_negative_answer_as_malformed() {
        let err = parse_bank(
            r#"[{ "question": "Q", "options": ["a", "b"], "correctAnswers": [-1], "topic": "T" }]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StorageError::MalformedBank(QuestionError::CorrectAnswerOutOfRange {
                index: 0,
                answer: -1,
                options: 2
            })
        ));
    }

    #[test]
    fn rejects_null_options_as_malformed() {
        let err = parse_bank(
            r#"[{ "question": "Q", "options": null, "correctAnswers": [0], "topic": "T" }]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StorageError::MalformedBank(QuestionError::TooFewOptions { index: 0, found: 0 })
        ));
    }

    #[test]
    fn non_array_is_a_serialization_error() {
        let err = parse_bank(r#"{ "question": "Q" }"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}

use std::io::Write;

use quiz_core::model::{Question, QuestionBank, QuestionError};
use storage::{InMemorySource, JsonFileSource, QuestionBankSource, StorageError};

const BANK: &str = r#"[
    { "question": "Which role can manage billing?", "options": ["Owner", "Member", "Outside collaborator"], "correctAnswers": [0], "topic": "Organizations" },
    { "question": "Which are valid branch protection rules?", "options": ["Require reviews", "Require emoji", "Require status checks"], "correctAnswers": [0, 2], "topic": "Repositories" }
]"#;

#[tokio::test]
async fn loads_bank_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BANK.as_bytes()).unwrap();

    let source = JsonFileSource::new(file.path());
    let bank = source.load_bank().await.unwrap();

    assert_eq!(bank.len(), 2);
    assert_eq!(bank.topics(), vec!["Organizations", "Repositories"]);
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonFileSource::new(dir.path().join("questions.json"));

    let err = source.load_bank().await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn malformed_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"[{ "question": "Q", "options": ["a", "b"], "correctAnswers": [], "topic": "T" }]"#,
    )
    .unwrap();

    let err = JsonFileSource::new(file.path()).load_bank().await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::MalformedBank(QuestionError::NoCorrectAnswers { index: 0 })
    ));
}

#[tokio::test]
async fn in_memory_source_returns_its_bank() {
    let question = Question::new(0, "Q", vec!["a".into(), "b".into()], &[1], "T").unwrap();
    let bank = QuestionBank::new(vec![question]).unwrap();

    let loaded = InMemorySource::new(bank.clone()).load_bank().await.unwrap();
    assert_eq!(loaded, bank);
}

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Position of a question within its bank.
pub type QuestionIndex = usize;

/// Position of an option within its question.
pub type OptionIndex = usize;

/// Minimum number of options a question must offer.
pub const MIN_OPTIONS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems found while loading a question bank.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {index} must have at least 2 options, found {found}")]
    TooFewOptions { index: QuestionIndex, found: usize },

    #[error("question {index} has no correct answers")]
    NoCorrectAnswers { index: QuestionIndex },

    #[error("question {index} marks option {answer} correct but only has {options} options")]
    CorrectAnswerOutOfRange {
        index: QuestionIndex,
        answer: i64,
        options: usize,
    },

    #[error("question {index} marks option {answer} correct more than once")]
    DuplicateCorrectAnswer {
        index: QuestionIndex,
        answer: OptionIndex,
    },

    #[error("question {index} has no topic")]
    MissingTopic { index: QuestionIndex },

    #[error("question at position {expected} carries index {found}")]
    IndexMismatch {
        expected: QuestionIndex,
        found: QuestionIndex,
    },
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Wire shape of one question in a bank file.
///
/// Field names follow the JSON format (`question`, `options`, `correctAnswers`,
/// `topic`). Missing or `null` lists deserialize to empty, and answers are
/// read as signed integers, so that validation, not parsing, reports what is
/// wrong with the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub correct_answers: Vec<i64>,
    #[serde(default)]
    pub topic: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuestionRecord {
    /// Validate the record into a `Question` at the given bank position.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the record violates the bank format.
    pub fn into_question(self, index: QuestionIndex) -> Result<Question, QuestionError> {
        let topic = self.topic.ok_or(QuestionError::MissingTopic { index })?;
        let correct = self
            .correct_answers
            .iter()
            .map(|&answer| {
                OptionIndex::try_from(answer).map_err(|_| QuestionError::CorrectAnswerOutOfRange {
                    index,
                    answer,
                    options: self.options.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Question::new(index, self.question, self.options, &correct, topic)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    index: QuestionIndex,
    text: String,
    options: Vec<String>,
    correct_answers: BTreeSet<OptionIndex>,
    topic: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TooFewOptions` if fewer than two options are given.
    /// Returns `QuestionError::NoCorrectAnswers` if `correct_answers` is empty.
    /// Returns `QuestionError::CorrectAnswerOutOfRange` or
    /// `QuestionError::DuplicateCorrectAnswer` for bad answer indices.
    /// Returns `QuestionError::MissingTopic` if the topic is blank.
    pub fn new(
        index: QuestionIndex,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answers: &[OptionIndex],
        topic: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if options.len() < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                index,
                found: options.len(),
            });
        }
        if correct_answers.is_empty() {
            return Err(QuestionError::NoCorrectAnswers { index });
        }

        let mut correct = BTreeSet::new();
        for &answer in correct_answers {
            if answer >= options.len() {
                return Err(QuestionError::CorrectAnswerOutOfRange {
                    index,
                    answer: i64::try_from(answer).unwrap_or(i64::MAX),
                    options: options.len(),
                });
            }
            if !correct.insert(answer) {
                return Err(QuestionError::DuplicateCorrectAnswer { index, answer });
            }
        }

        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(QuestionError::MissingTopic { index });
        }

        Ok(Self {
            index,
            text: text.into(),
            options,
            correct_answers: correct,
            topic,
        })
    }

    #[must_use]
    pub fn index(&self) -> QuestionIndex {
        self.index
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_answers(&self) -> &BTreeSet<OptionIndex> {
        &self.correct_answers
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the learner may pick more than one option (checkbox semantics).
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.correct_answers.len() > 1
    }

    #[must_use]
    pub fn is_correct_option(&self, option: OptionIndex) -> bool {
        self.correct_answers.contains(&option)
    }
}

/// Display label for an option position: `A`, `B`, `C`, ...
///
/// Returns `None` past `Z`.
#[must_use]
pub fn option_label(position: OptionIndex) -> Option<char> {
    let offset = u8::try_from(position).ok().filter(|p| *p < 26)?;
    Some(char::from(b'A' + offset))
}

/// Inverse of [`option_label`], case-insensitive.
#[must_use]
pub fn option_from_label(label: char) -> Option<OptionIndex> {
    let upper = label.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(usize::from(upper as u8 - b'A'))
    } else {
        None
    }
}

use crate::model::question::{Question, QuestionError, QuestionIndex, QuestionRecord};

/// Ordered, immutable collection of questions for one assessment.
///
/// A bank can only be built from validated questions, so a value of this type
/// is never malformed. It may be empty; sessions refuse to start on one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::IndexMismatch` if a question's index does not
    /// match its position.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        for (expected, question) in questions.iter().enumerate() {
            if question.index() != expected {
                return Err(QuestionError::IndexMismatch {
                    expected,
                    found: question.index(),
                });
            }
        }
        Ok(Self { questions })
    }

    /// Validate parsed records into a bank, failing on the first bad record.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` encountered, in bank order.
    pub fn from_records(records: Vec<QuestionRecord>) -> Result<Self, QuestionError> {
        let questions = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_question(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: QuestionIndex) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Distinct topics in order of first appearance.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::new();
        for question in &self.questions {
            if !topics.contains(&question.topic()) {
                topics.push(question.topic());
            }
        }
        topics
    }
}

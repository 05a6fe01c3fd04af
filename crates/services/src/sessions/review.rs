use quiz_core::model::{AnswerSet, OptionIndex, Question, option_label};
use quiz_core::scoring;

/// How one option should be marked when reviewing a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Picked, and part of the correct set.
    SelectedCorrect,
    /// Picked, but not part of the correct set.
    SelectedWrong,
    /// Part of the correct set, but not picked.
    MissedCorrect,
    Unmarked,
}

/// One option of a reviewed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionReview<'a> {
    pub position: OptionIndex,
    pub label: Option<char>,
    pub text: &'a str,
    pub selected: bool,
    pub correct: bool,
}

impl OptionReview<'_> {
    #[must_use]
    pub fn mark(&self) -> OptionMark {
        match (self.selected, self.correct) {
            (true, true) => OptionMark::SelectedCorrect,
            (true, false) => OptionMark::SelectedWrong,
            (false, true) => OptionMark::MissedCorrect,
            (false, false) => OptionMark::Unmarked,
        }
    }
}

/// A question paired with what the learner picked and what was correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    question: &'a Question,
    selected: AnswerSet,
    is_correct: bool,
}

impl<'a> ReviewItem<'a> {
    pub(crate) fn new(question: &'a Question, selected: Option<&AnswerSet>) -> Self {
        Self {
            question,
            is_correct: scoring::is_correct(question, selected),
            selected: selected.cloned().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn question(&self) -> &'a Question {
        self.question
    }

    #[must_use]
    pub fn selected(&self) -> &AnswerSet {
        &self.selected
    }

    #[must_use]
    pub fn correct(&self) -> &'a AnswerSet {
        self.question.correct_answers()
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn options(&self) -> impl Iterator<Item = OptionReview<'a>> + '_ {
        self.question
            .options()
            .iter()
            .enumerate()
            .map(move |(position, text)| OptionReview {
                position,
                label: option_label(position),
                text: text.as_str(),
                selected: self.selected.contains(&position),
                correct: self.question.is_correct_option(position),
            })
    }
}

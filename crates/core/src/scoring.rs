//! Exact-set grading and weighted scoring.
//!
//! Every question is worth `1000 / question_count` points. A question earns its
//! value only when the learner's selection equals the correct set exactly;
//! there is no partial credit. The grand total is summed in full precision and
//! rounded once at the end.

use std::collections::HashMap;

use crate::model::{
    AnswerSet, AnswerStore, MAX_POINTS, Question, QuestionBank, ScoreResult, TopicResult,
    round_half_up,
};

/// Decimals kept on displayed point values.
const POINT_DECIMALS: i32 = 2;

/// Worth of one question in a bank of `question_count` questions.
#[must_use]
pub fn question_value(question_count: usize) -> f64 {
    if question_count == 0 {
        return 0.0;
    }
    MAX_POINTS / question_count as f64
}

/// Exact-set match between the selection and the correct answers.
///
/// `None` means nothing was selected.
#[must_use]
pub fn is_correct(question: &Question, selected: Option<&AnswerSet>) -> bool {
    match selected {
        Some(selected) => selected == question.correct_answers(),
        None => false,
    }
}

struct TopicTally<'a> {
    topic: &'a str,
    earned: f64,
    question_count: usize,
    correct_count: usize,
}

/// Score the answers against the bank.
#[must_use]
pub fn score(bank: &QuestionBank, answers: &AnswerStore) -> ScoreResult {
    let value = question_value(bank.len());
    let mut total = 0.0_f64;
    let mut correct_count = 0_usize;
    let mut tallies: Vec<TopicTally<'_>> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for question in bank.iter() {
        let slot = *slots.entry(question.topic()).or_insert_with(|| {
            tallies.push(TopicTally {
                topic: question.topic(),
                earned: 0.0,
                question_count: 0,
                correct_count: 0,
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[slot];
        tally.question_count += 1;

        if is_correct(question, answers.get(question.index())) {
            total += value;
            tally.earned += value;
            tally.correct_count += 1;
            correct_count += 1;
        }
    }

    let total_points = round_half_up(total, POINT_DECIMALS).clamp(0.0, MAX_POINTS);
    let topic_results = tallies
        .into_iter()
        .map(|tally| {
            TopicResult::new(
                tally.topic.to_owned(),
                round_half_up(tally.earned, POINT_DECIMALS),
                round_half_up(tally.question_count as f64 * value, POINT_DECIMALS),
                tally.question_count,
                tally.correct_count,
            )
        })
        .collect();

    ScoreResult::new(total_points, value, bank.len(), correct_count, topic_results)
}

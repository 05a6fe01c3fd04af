use std::fmt::Write;

use quiz_core::model::{MAX_POINTS, PASS_MARK_POINTS, ScoreResult, option_label};
use services::{OptionMark, ReviewItem, SessionController};

/// Seconds as `MM:SS`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn label(position: usize) -> String {
    option_label(position).map_or_else(|| (position + 1).to_string(), String::from)
}

/// The question currently on screen, with the learner's marks.
#[must_use]
pub fn question_screen(session: &SessionController) -> String {
    let mut out = String::new();
    let Some(question) = session.current_question() else {
        return out;
    };
    let progress = session.progress();
    let selected = session.answers_for(question.index());

    let _ = writeln!(
        out,
        "Question {} of {}    Time left {}",
        progress.current + 1,
        progress.total,
        format_clock(progress.time_remaining)
    );
    let _ = writeln!(out, "Q{}. {}", question.index() + 1, question.text());
    if question.is_multiple() {
        let _ = writeln!(out, "(select all that apply)");
    }
    for (position, text) in question.options().iter().enumerate() {
        let checked = selected.is_some_and(|set| set.contains(&position));
        let mark = match (question.is_multiple(), checked) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(*)",
            (false, false) => "( )",
        };
        let _ = writeln!(out, "  {mark} {}. {text}", label(position));
    }
    let _ = write!(
        out,
        "Progress: {}%  Answered: {}/{}{}",
        progress.percent,
        progress.answered,
        progress.total,
        if progress.is_last() { "  (last question, `submit` to finish)" } else { "" }
    );
    out
}

/// Total, verdict, time taken and per-topic breakdown.
#[must_use]
pub fn results_screen(result: &ScoreResult, elapsed_secs: Option<u32>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Results");
    let _ = writeln!(
        out,
        "Score: {} / {MAX_POINTS} - {}%",
        result.total_points(),
        result.percent()
    );
    let _ = writeln!(
        out,
        "{} (pass mark {PASS_MARK_POINTS})",
        if result.is_pass() { "PASS" } else { "FAIL" }
    );
    if let Some(secs) = elapsed_secs {
        let _ = writeln!(out, "Time taken: {}", format_clock(secs));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Per-topic breakdown");
    for topic in result.topic_results() {
        let _ = writeln!(out, "  {}", topic.topic());
        let _ = writeln!(
            out,
            "    {} / {} pts - {}%",
            topic.earned_points(),
            topic.possible_points(),
            topic.percent()
        );
        let _ = writeln!(
            out,
            "    Correct: {} / {}",
            topic.correct_count(),
            topic.question_count()
        );
    }
    out
}

/// Every question with the learner's picks and the correct options.
#[must_use]
pub fn review_screen(items: &[ReviewItem<'_>]) -> String {
    let mut out = String::from("Review answers\n");
    for item in items {
        let question = item.question();
        let verdict = if item.is_correct() { "correct" } else { "wrong" };
        let _ = writeln!(out, "Q{}. {} [{verdict}]", question.index() + 1, question.text());
        for option in item.options() {
            let note = match option.mark() {
                OptionMark::SelectedCorrect => "  <- your answer, correct",
                OptionMark::SelectedWrong => "  <- your answer, wrong",
                OptionMark::MissedCorrect => "  <- correct",
                OptionMark::Unmarked => "",
            };
            let _ = writeln!(out, "    {}. {}{note}", label(option.position), option.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionRecord, QuizConfig};
    use quiz_core::time::fixed_clock;

    fn session() -> SessionController {
        let records = vec![
            QuestionRecord {
                question: "Who can transfer a repo?".into(),
                options: vec!["Admin".into(), "Triage".into()],
                correct_answers: vec![0],
                topic: Some("Repos".into()),
            },
            QuestionRecord {
                question: "Valid secret scopes?".into(),
                options: vec!["Org".into(), "Repo".into(), "Gist".into()],
                correct_answers: vec![0, 1],
                topic: Some("Security".into()),
            },
        ];
        SessionController::from_records(records, fixed_clock()).unwrap()
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(5_400), "90:00");
    }

    #[test]
    fn question_screen_shows_marks() {
        let mut session = session();
        session.start(QuizConfig::new(125)).unwrap();
        session.go_to(1).unwrap();
        session.select(1, 1).unwrap();

        let screen = question_screen(&session);
        assert!(screen.contains("Question 2 of 2    Time left 02:05"));
        assert!(screen.contains("[ ] A. Org"));
        assert!(screen.contains("[x] B. Repo"));
        assert!(screen.contains("(select all that apply)"));
        assert!(screen.contains("last question"));
    }

    #[test]
    fn results_and_review_reflect_the_attempt() {
        let mut session = session();
        session.start(QuizConfig::new(60)).unwrap();
        session.select(0, 0).unwrap();
        session.select(1, 2).unwrap();
        session.submit();

        let results = results_screen(session.result().unwrap(), session.elapsed_secs());
        assert!(results.contains("Score: 500 / 1000 - 50%"));
        assert!(results.contains("Time taken: 00:00"));
        assert!(results.contains("FAIL"));
        assert!(results.contains("500 / 500 pts - 100%"));
        assert!(results.contains("Correct: 0 / 1"));

        let review = review_screen(&session.review().unwrap());
        assert!(review.contains("Q1. Who can transfer a repo? [correct]"));
        assert!(review.contains("C. Gist  <- your answer, wrong"));
        assert!(review.contains("A. Org  <- correct"));
    }
}

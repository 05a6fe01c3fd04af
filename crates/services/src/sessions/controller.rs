use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{
    AnswerSet, AnswerStore, ConfigError, OptionIndex, Question, QuestionBank, QuestionIndex,
    QuestionRecord, QuizConfig, ScoreResult,
};
use quiz_core::scoring;

use super::progress::SessionProgress;
use super::review::ReviewItem;
use super::timer::{Countdown, TimerToken};
use crate::error::{IndexTarget, SessionError};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

/// Why an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Submitted,
    TimedOut,
}

/// Effect of a single timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    /// The countdown hit zero and the attempt was auto-submitted.
    Expired,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine for one quiz attempt.
///
/// Every mutation of answers, navigation and the countdown goes through
/// `&mut self`, so whoever owns the controller is the single sequence point
/// for the attempt. Scoring runs exactly once per attempt, inside
/// [`SessionController::finish`].
pub struct SessionController {
    bank: Arc<QuestionBank>,
    clock: Clock,
    state: SessionState,
    config: Option<QuizConfig>,
    current: usize,
    answers: AnswerStore,
    timer: Countdown,
    result: Option<ScoreResult>,
    finish_reason: Option<FinishReason>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionController {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, clock: Clock) -> Self {
        Self {
            bank,
            clock,
            state: SessionState::NotStarted,
            config: None,
            current: 0,
            answers: AnswerStore::new(),
            timer: Countdown::new(),
            result: None,
            finish_reason: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Validate raw records and build a controller over them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MalformedBank` if any record is invalid.
    pub fn from_records(records: Vec<QuestionRecord>, clock: Clock) -> Result<Self, SessionError> {
        let bank = QuestionBank::from_records(records)?;
        Ok(Self::new(Arc::new(bank), clock))
    }

    //
    // ─── COMMANDS ──────────────────────────────────────────────────────────────
    //

    /// Begin a new attempt, discarding answers and result of any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` while an attempt is in progress.
    /// Returns `SessionError::InvalidConfig` for a zero time limit or an empty bank.
    pub fn start(&mut self, config: QuizConfig) -> Result<TimerToken, SessionError> {
        if self.state == SessionState::InProgress {
            return Err(self.invalid("start"));
        }
        config.validate()?;
        if self.bank.is_empty() {
            return Err(ConfigError::EmptyBank.into());
        }

        self.answers.clear();
        self.result = None;
        self.finish_reason = None;
        self.completed_at = None;
        self.current = 0;
        self.config = Some(config);
        self.started_at = Some(self.clock.now());
        let token = self.timer.arm(config.time_limit_secs());
        self.state = SessionState::InProgress;

        tracing::info!(
            questions = self.bank.len(),
            time_limit_secs = config.time_limit_secs(),
            "quiz started"
        );
        Ok(token)
    }

    /// Record a selection. Radio semantics replace the answer set with
    /// `{option}`; checkbox semantics toggle `option`.
    ///
    /// Checkbox semantics only apply when both `is_multiple` is set and the
    /// question has several correct answers, so a single-answer question never
    /// holds more than one selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    /// Returns `SessionError::OutOfRange` for unknown question or option indices.
    pub fn select_option(
        &mut self,
        question: QuestionIndex,
        option: OptionIndex,
        is_multiple: bool,
    ) -> Result<(), SessionError> {
        self.ensure_in_progress("select an option")?;
        let multiple = {
            let q = self.question_checked(question)?;
            if option >= q.option_count() {
                return Err(SessionError::OutOfRange {
                    target: IndexTarget::Option,
                    index: option,
                    len: q.option_count(),
                });
            }
            is_multiple && q.is_multiple()
        };

        let updated = if multiple {
            self.answers.toggle(question, option).map(|_| ())
        } else {
            self.answers.choose(question, option)
        };
        updated.map_err(|_| self.invalid("select an option"))
    }

    /// Select with the question's own single/multiple semantics.
    ///
    /// # Errors
    ///
    /// Same as [`SessionController::select_option`].
    pub fn select(&mut self, question: QuestionIndex, option: OptionIndex) -> Result<(), SessionError> {
        let is_multiple = self
            .bank
            .get(question)
            .is_some_and(Question::is_multiple);
        self.select_option(question, option, is_multiple)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    /// Returns `SessionError::OutOfRange` past the end of the bank.
    pub fn go_to(&mut self, question: QuestionIndex) -> Result<(), SessionError> {
        self.ensure_in_progress("navigate")?;
        self.question_checked(question)?;
        self.current = question;
        Ok(())
    }

    /// Move forward; a no-op on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress("navigate")?;
        if self.current + 1 < self.bank.len() {
            self.current += 1;
        }
        Ok(())
    }

    /// Move back; a no-op on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress("navigate")?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Consume one second of the countdown, auto-submitting at zero.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        self.ensure_in_progress("tick")?;
        let token = self.timer.token().ok_or_else(|| self.invalid("tick"))?;
        self.tick_armed(token).ok_or_else(|| self.invalid("tick"))
    }

    /// Tick on behalf of a timer task holding `token`.
    ///
    /// Returns `None` when the token is stale or the attempt is no longer in
    /// progress; such ticks have no effect.
    pub fn tick_armed(&mut self, token: TimerToken) -> Option<TickOutcome> {
        if self.state != SessionState::InProgress {
            return None;
        }
        let remaining = self.timer.tick(token)?;
        if remaining > 0 {
            return Some(TickOutcome::Running { remaining });
        }

        tracing::info!("time limit reached, submitting automatically");
        self.finish(FinishReason::TimedOut);
        Some(TickOutcome::Expired)
    }

    /// Learner-initiated submission. See [`SessionController::finish`].
    pub fn submit(&mut self) -> bool {
        self.finish(FinishReason::Submitted)
    }

    /// End the attempt: freeze answers, score once, stop the countdown.
    ///
    /// Returns `true` if this call finished the attempt. Calling it when the
    /// attempt is not in progress does nothing and returns `false`.
    pub fn finish(&mut self, reason: FinishReason) -> bool {
        if self.state != SessionState::InProgress {
            tracing::debug!(state = %self.state, ?reason, "finish ignored");
            return false;
        }

        self.timer.disarm();
        self.answers.freeze();
        let result = scoring::score(&self.bank, &self.answers);
        tracing::info!(
            ?reason,
            total_points = result.total_points(),
            correct = result.correct_count(),
            questions = result.question_count(),
            "quiz finished"
        );

        self.result = Some(result);
        self.finish_reason = Some(reason);
        self.completed_at = Some(self.clock.now());
        self.state = SessionState::Finished;
        true
    }

    /// Return to `NotStarted`, dropping the previous attempt entirely.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` while an attempt is in progress.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::InProgress {
            return Err(self.invalid("reset"));
        }
        self.timer.disarm();
        self.answers.clear();
        self.result = None;
        self.finish_reason = None;
        self.config = None;
        self.current = 0;
        self.started_at = None;
        self.completed_at = None;
        self.state = SessionState::NotStarted;
        Ok(())
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn config(&self) -> Option<QuizConfig> {
        self.config
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.current)
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.timer.remaining()
    }

    /// Token of the running countdown, if any.
    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    /// Current selection for a question; `None` means no answer.
    #[must_use]
    pub fn answers_for(&self, question: QuestionIndex) -> Option<&AnswerSet> {
        self.answers.get(question)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(
            self.bank.len(),
            self.answers.answered_count(),
            self.current,
            self.time_remaining(),
        )
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` until the attempt is finished.
    pub fn result(&self) -> Result<&ScoreResult, SessionError> {
        match (&self.state, &self.result) {
            (SessionState::Finished, Some(result)) => Ok(result),
            _ => Err(self.invalid("read the result")),
        }
    }

    /// Every question paired with the learner's selection and the correct set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` until the attempt is finished.
    pub fn review(&self) -> Result<Vec<ReviewItem<'_>>, SessionError> {
        if self.state != SessionState::Finished {
            return Err(self.invalid("review answers"));
        }
        Ok(self
            .bank
            .iter()
            .map(|question| ReviewItem::new(question, self.answers.get(question.index())))
            .collect())
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Whole seconds between start and finish, once the attempt is over.
    #[must_use]
    pub fn elapsed_secs(&self) -> Option<u32> {
        let taken = self.completed_at? - self.started_at?;
        u32::try_from(taken.num_seconds()).ok()
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn invalid(&self, command: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            command,
            state: self.state,
        }
    }

    fn ensure_in_progress(&self, command: &'static str) -> Result<(), SessionError> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(self.invalid(command))
        }
    }

    fn question_checked(&self, question: QuestionIndex) -> Result<&Question, SessionError> {
        self.bank.get(question).ok_or(SessionError::OutOfRange {
            target: IndexTarget::Question,
            index: question,
            len: self.bank.len(),
        })
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("questions", &self.bank.len())
            .field("state", &self.state)
            .field("current", &self.current)
            .field("answered", &self.answers.answered_count())
            .field("time_remaining", &self.timer.remaining())
            .field("finish_reason", &self.finish_reason)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::{fixed_clock, fixed_now};

    fn record(correct: &[i64], topic: &str) -> QuestionRecord {
        QuestionRecord {
            question: format!("Question about {topic}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answers: correct.to_vec(),
            topic: Some(topic.to_owned()),
        }
    }

    /// Two questions: `[0]` in topic A, `[1, 2]` in topic B.
    fn controller() -> SessionController {
        SessionController::from_records(vec![record(&[0], "A"), record(&[1, 2], "B")], fixed_clock())
            .unwrap()
    }

    fn started(limit: u32) -> SessionController {
        let mut session = controller();
        session.start(QuizConfig::new(limit)).unwrap();
        session
    }

    #[test]
    fn start_resets_position_and_arms_timer() {
        let session = started(90);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_remaining(), 90);
        assert!(session.timer_token().is_some());
        assert_eq!(session.started_at(), Some(fixed_now()));
    }

    #[test]
    fn result_is_unavailable_before_finish() {
        let session = started(60);
        assert_eq!(
            session.result().unwrap_err(),
            SessionError::InvalidTransition {
                command: "read the result",
                state: SessionState::InProgress
            }
        );
        assert!(session.review().is_err());
    }

    #[test]
    fn start_rejects_bad_config_and_double_start() {
        let mut session = controller();
        assert_eq!(
            session.start(QuizConfig::new(0)).unwrap_err(),
            SessionError::InvalidConfig(ConfigError::ZeroTimeLimit)
        );
        assert_eq!(session.state(), SessionState::NotStarted);

        session.start(QuizConfig::new(10)).unwrap();
        assert!(matches!(
            session.start(QuizConfig::new(10)),
            Err(SessionError::InvalidTransition { command: "start", .. })
        ));

        let mut empty = SessionController::new(Arc::new(QuestionBank::default()), fixed_clock());
        assert_eq!(
            empty.start(QuizConfig::new(10)).unwrap_err(),
            SessionError::InvalidConfig(ConfigError::EmptyBank)
        );
    }

    #[test]
    fn malformed_records_are_rejected() {
        let err = SessionController::from_records(vec![record(&[], "A")], fixed_clock()).unwrap_err();
        assert!(matches!(err, SessionError::MalformedBank(_)));
    }

    #[test]
    fn single_answer_selection_is_exclusive() {
        let mut session = started(60);
        session.select(0, 0).unwrap();
        session.select(0, 1).unwrap();
        assert_eq!(session.answers_for(0), Some(&AnswerSet::from([1])));

        // Checkbox semantics requested on a single-answer question still replace.
        session.select_option(0, 2, true).unwrap();
        assert_eq!(session.answers_for(0), Some(&AnswerSet::from([2])));
    }

    #[test]
    fn multi_answer_selection_toggles() {
        let mut session = started(60);
        session.select(1, 0).unwrap();
        session.select(1, 2).unwrap();
        assert_eq!(session.answers_for(1), Some(&AnswerSet::from([0, 2])));

        session.select(1, 0).unwrap();
        assert_eq!(session.answers_for(1), Some(&AnswerSet::from([2])));

        session.select_option(1, 1, false).unwrap();
        assert_eq!(session.answers_for(1), Some(&AnswerSet::from([1])));
    }

    #[test]
    fn selection_validates_indices() {
        let mut session = started(60);
        assert_eq!(
            session.select(5, 0).unwrap_err(),
            SessionError::OutOfRange {
                target: IndexTarget::Question,
                index: 5,
                len: 2
            }
        );
        assert_eq!(
            session.select(0, 3).unwrap_err(),
            SessionError::OutOfRange {
                target: IndexTarget::Option,
                index: 3,
                len: 3
            }
        );
        assert_eq!(session.answers_for(0), None);
    }

    #[test]
    fn navigation_clamps_without_wrapping() {
        let mut session = started(60);
        session.previous().unwrap();
        assert_eq!(session.current_index(), 0);

        session.next().unwrap();
        session.next().unwrap();
        assert_eq!(session.current_index(), 1);

        session.go_to(0).unwrap();
        assert_eq!(session.current_index(), 0);
        assert!(matches!(
            session.go_to(2),
            Err(SessionError::OutOfRange { target: IndexTarget::Question, index: 2, .. })
        ));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn commands_require_in_progress() {
        let mut session = controller();
        assert!(matches!(session.next(), Err(SessionError::InvalidTransition { .. })));
        assert!(matches!(session.select(0, 0), Err(SessionError::InvalidTransition { .. })));
        assert!(matches!(session.tick(), Err(SessionError::InvalidTransition { .. })));
        assert!(!session.submit());
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let mut session = started(60);
        session.select(0, 0).unwrap();
        session.select(1, 1).unwrap();
        session.select(1, 2).unwrap();
        assert!(session.submit());

        let result = session.result().unwrap();
        assert_eq!(result.total_points(), 1000.0);
        for topic in ["A", "B"] {
            let t = result.topic(topic).unwrap();
            assert_eq!((t.correct_count(), t.question_count()), (1, 1));
        }
        assert_eq!(session.finish_reason(), Some(FinishReason::Submitted));
    }

    #[test]
    fn one_wrong_answer_scores_half() {
        let mut session = started(60);
        session.select(0, 1).unwrap();
        session.select(1, 1).unwrap();
        session.select(1, 2).unwrap();
        session.submit();

        assert_eq!(session.result().unwrap().total_points(), 500.0);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut session = started(60);
        session.select(0, 0).unwrap();
        assert!(session.submit());
        let first = session.result().unwrap().clone();

        assert!(!session.submit());
        assert!(!session.finish(FinishReason::TimedOut));
        assert_eq!(session.result().unwrap(), &first);
        assert_eq!(session.finish_reason(), Some(FinishReason::Submitted));
    }

    #[test]
    fn finished_session_rejects_selection() {
        let mut session = started(60);
        session.select(0, 0).unwrap();
        session.submit();

        assert!(matches!(
            session.select(0, 1),
            Err(SessionError::InvalidTransition { state: SessionState::Finished, .. })
        ));
        assert_eq!(session.answers_for(0), Some(&AnswerSet::from([0])));
        assert_eq!(session.time_remaining(), 0);
        assert!(session.timer_token().is_none());
    }

    #[test]
    fn timeout_auto_submits_with_recorded_answers() {
        let mut session = started(1);
        session.select(0, 0).unwrap();

        assert_eq!(session.tick().unwrap(), TickOutcome::Expired);
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.time_remaining(), 0);
        assert_eq!(session.finish_reason(), Some(FinishReason::TimedOut));
        assert_eq!(session.result().unwrap().total_points(), 500.0);
    }

    #[test]
    fn ticks_count_down_before_expiry() {
        let mut session = started(3);
        assert_eq!(session.tick().unwrap(), TickOutcome::Running { remaining: 2 });
        assert_eq!(session.tick().unwrap(), TickOutcome::Running { remaining: 1 });
        assert_eq!(session.time_remaining(), 1);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn stale_tick_after_submit_is_ignored() {
        let mut session = started(1);
        let token = session.timer_token().unwrap();
        session.submit();
        let result = session.result().unwrap().clone();

        assert_eq!(session.tick_armed(token), None);
        assert_eq!(session.finish_reason(), Some(FinishReason::Submitted));
        assert_eq!(session.result().unwrap(), &result);
    }

    #[test]
    fn restart_discards_previous_attempt() {
        let mut session = started(60);
        let old_token = session.timer_token().unwrap();
        session.select(0, 0).unwrap();
        session.submit();

        session.start(QuizConfig::new(30)).unwrap();
        assert_eq!(session.answers_for(0), None);
        assert!(session.result().is_err());
        assert_eq!(session.time_remaining(), 30);
        assert_eq!(session.tick_armed(old_token), None);
        assert_eq!(session.time_remaining(), 30);
    }

    #[test]
    fn reset_returns_to_not_started() {
        let mut session = started(60);
        assert!(session.reset().is_err());
        session.submit();

        session.reset().unwrap();
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(session.result().is_err());
        assert!(session.config().is_none());
    }

    #[test]
    fn timestamps_follow_the_clock() {
        let mut clock = fixed_clock();
        clock.advance(Duration::minutes(5));
        let mut session = SessionController::from_records(vec![record(&[0], "A")], clock).unwrap();
        session.start(QuizConfig::new(10)).unwrap();
        session.submit();

        assert_eq!(session.started_at(), Some(fixed_now() + Duration::minutes(5)));
        assert_eq!(session.completed_at(), session.started_at());
    }

    #[test]
    fn elapsed_is_measured_once_finished() {
        let mut session = started(600);
        assert_eq!(session.elapsed_secs(), None);

        session.clock.advance(Duration::seconds(95));
        session.submit();
        assert_eq!(session.elapsed_secs(), Some(95));

        session.reset().unwrap();
        assert_eq!(session.elapsed_secs(), None);
    }

    #[test]
    fn progress_reports_answered_and_position() {
        let mut session = started(45);
        session.select(1, 1).unwrap();
        session.next().unwrap();

        let progress = session.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.current, 1);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.time_remaining, 45);
        assert!(progress.is_last());
    }
}

mod answers;
mod bank;
mod config;
mod question;
mod score;

pub use answers::{AnswerError, AnswerSet, AnswerStore};
pub use bank::QuestionBank;
pub use config::{ConfigError, DEFAULT_TIME_LIMIT_MINUTES, QuizConfig, TIME_LIMIT_PRESETS_MINUTES};
pub use question::{
    MIN_OPTIONS, OptionIndex, Question, QuestionError, QuestionIndex, QuestionRecord,
    option_from_label, option_label,
};
pub use score::{MAX_POINTS, PASS_MARK_POINTS, ScoreResult, TopicResult, round_half_up};

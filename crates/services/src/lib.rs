#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{IndexTarget, SessionError};
pub use sessions::{
    Countdown, FinishReason, OptionMark, OptionReview, QuizRunner, ReviewItem, SessionController,
    SessionEvent, SessionProgress, SessionState, TickOutcome, TimerToken,
};

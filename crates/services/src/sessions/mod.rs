mod controller;
mod progress;
mod review;
mod runner;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{FinishReason, SessionController, SessionState, TickOutcome};
pub use progress::SessionProgress;
pub use review::{OptionMark, OptionReview, ReviewItem};
pub use runner::{QuizRunner, SessionEvent};
pub use timer::{Countdown, TimerToken};

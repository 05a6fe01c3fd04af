use std::fmt;

use quiz_core::model::{OptionIndex, QuestionIndex, option_from_label};

/// One line of learner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    GoTo(QuestionIndex),
    Select(OptionIndex),
    Submit,
    Time,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    InvalidQuestion { raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "type a command, or `help`"),
            CommandError::Unknown(raw) => write!(f, "unknown command: {raw}"),
            CommandError::InvalidQuestion { raw } => write!(f, "invalid question number: {raw}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Parse a line. A single letter selects that option; question numbers are
    /// 1-based as shown on screen.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for blank, unknown, or malformed input.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Empty);
        };

        let mut chars = head.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if let Some(option) = option_from_label(letter) {
                return Ok(Self::Select(option));
            }
        }

        match head.to_ascii_lowercase().as_str() {
            "next" | ">" => Ok(Self::Next),
            "prev" | "previous" | "<" => Ok(Self::Previous),
            "submit" | "finish" => Ok(Self::Submit),
            "time" => Ok(Self::Time),
            "help" | "?" => Ok(Self::Help),
            "go" | "goto" => {
                let raw = parts.next().unwrap_or_default();
                let number: usize = raw.parse().map_err(|_| CommandError::InvalidQuestion {
                    raw: raw.to_owned(),
                })?;
                number
                    .checked_sub(1)
                    .map(Self::GoTo)
                    .ok_or(CommandError::InvalidQuestion { raw: raw.to_owned() })
            }
            _ => Err(CommandError::Unknown(line.to_owned())),
        }
    }
}

pub const HELP: &str = "\
Commands:
  a, b, c ...   select (or toggle) that option
  next, >       next question
  prev, <       previous question
  go <n>        jump to question n
  time          show time left
  submit        finish the quiz now
  help, ?       this help";

/// Identifies one arming of a [`Countdown`].
///
/// Ticks carrying a token from an earlier arming are ignored, so a tick that
/// was already in flight when the countdown was disarmed (or re-armed) can
/// never reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Single countdown clock, one tick per second while armed.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: u32,
    armed: bool,
    epoch: u64,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `seconds`, invalidating any earlier token.
    pub fn arm(&mut self, seconds: u32) -> TimerToken {
        self.epoch = self.epoch.wrapping_add(1);
        self.remaining = seconds;
        self.armed = true;
        TimerToken(self.epoch)
    }

    /// Stop the countdown and zero it. Outstanding tokens become stale.
    pub fn disarm(&mut self) {
        if self.armed {
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.armed = false;
        self.remaining = 0;
    }

    /// Consume one second. Returns the seconds left, or `None` if the token is
    /// stale or the countdown is not armed.
    pub fn tick(&mut self, token: TimerToken) -> Option<u32> {
        if !self.armed || token.0 != self.epoch {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(self.remaining)
    }

    /// Token of the current arming, if armed.
    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        self.armed.then_some(TimerToken(self.epoch))
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

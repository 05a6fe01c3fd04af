/// Where the learner is in the attempt, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    /// Zero-based position of the question on screen.
    pub current: usize,
    /// `(current + 1) / total` as a whole percentage.
    pub percent: u32,
    pub time_remaining: u32,
}

impl SessionProgress {
    #[must_use]
    pub fn new(total: usize, answered: usize, current: usize, time_remaining: u32) -> Self {
        let percent = if total == 0 {
            0
        } else {
            let scaled = (current + 1) * 200 / total;
            u32::try_from(scaled.div_ceil(2)).unwrap_or(100)
        };
        Self {
            total,
            answered,
            current,
            percent,
            time_remaining,
        }
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(SessionProgress::new(3, 0, 0, 60).percent, 33);
        assert_eq!(SessionProgress::new(8, 0, 0, 60).percent, 13);
        assert_eq!(SessionProgress::new(2, 0, 1, 60).percent, 100);
        assert_eq!(SessionProgress::new(0, 0, 0, 60).percent, 0);
    }

    #[test]
    fn last_question_is_detected() {
        assert!(SessionProgress::new(2, 1, 1, 0).is_last());
        assert!(!SessionProgress::new(2, 1, 0, 0).is_last());
    }
}

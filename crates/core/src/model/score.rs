/// Points awarded for a perfect attempt.
pub const MAX_POINTS: f64 = 1000.0;

/// Minimum total needed to pass.
pub const PASS_MARK_POINTS: f64 = 700.0;

/// Round to `places` decimals, ties away from zero (half up for scores).
///
/// A one-epsilon nudge keeps values like `1.005`, stored just below the tie,
/// on the side a reader expects.
#[must_use]
pub fn round_half_up(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    ((value + f64::EPSILON) * factor).round() / factor
}

/// Aggregated outcome for one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicResult {
    topic: String,
    earned_points: f64,
    possible_points: f64,
    question_count: usize,
    correct_count: usize,
}

impl TopicResult {
    pub(crate) fn new(
        topic: String,
        earned_points: f64,
        possible_points: f64,
        question_count: usize,
        correct_count: usize,
    ) -> Self {
        Self {
            topic,
            earned_points,
            possible_points,
            question_count,
            correct_count,
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Points earned in this topic, rounded to 2 decimals for display.
    #[must_use]
    pub fn earned_points(&self) -> f64 {
        self.earned_points
    }

    /// `question_count × question_value`, rounded to 2 decimals.
    #[must_use]
    pub fn possible_points(&self) -> f64 {
        self.possible_points
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Share of the topic's possible points, one decimal.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.possible_points <= 0.0 {
            return 0.0;
        }
        round_half_up(self.earned_points / self.possible_points * 100.0, 1)
    }
}

/// Final score of an attempt. Built once when the attempt finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    total_points: f64,
    question_value: f64,
    question_count: usize,
    correct_count: usize,
    topic_results: Vec<TopicResult>,
}

impl ScoreResult {
    pub(crate) fn new(
        total_points: f64,
        question_value: f64,
        question_count: usize,
        correct_count: usize,
        topic_results: Vec<TopicResult>,
    ) -> Self {
        Self {
            total_points,
            question_value,
            question_count,
            correct_count,
            topic_results,
        }
    }

    /// Grand total in `[0, 1000]`, rounded once to 2 decimals.
    #[must_use]
    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    /// Unrounded worth of a single question.
    #[must_use]
    pub fn question_value(&self) -> f64 {
        self.question_value
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Per-topic results in order of first appearance in the bank.
    #[must_use]
    pub fn topic_results(&self) -> &[TopicResult] {
        &self.topic_results
    }

    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&TopicResult> {
        self.topic_results.iter().find(|t| t.topic == name)
    }

    /// Total as a percentage of the maximum, one decimal.
    #[must_use]
    pub fn percent(&self) -> f64 {
        round_half_up(self.total_points / MAX_POINTS * 100.0, 1)
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.total_points >= PASS_MARK_POINTS
    }
}

/// Aggregated view of how far an attempt has progressed, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total_questions: usize,
    pub answered: usize,
    pub unanswered: usize,
}

impl SessionProgress {
    /// Share of questions answered, in whole percent.
    #[must_use]
    pub fn percent_answered(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let percent = (self.answered as f64 * 100.0 / self.total_questions as f64).round() as u32;
        percent
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-question record of the user's selected options.
///
/// Keys are 0-based question indexes; a missing key means "unanswered".
/// Re-selecting an option for a question overwrites the previous entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    entries: HashMap<usize, usize>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the selected option for a question, replacing any prior choice.
    pub fn select(&mut self, question_index: usize, option_index: usize) {
        self.entries.insert(question_index, option_index);
    }

    /// The selected option for a question, if one was recorded.
    #[must_use]
    pub fn selected(&self, question_index: usize) -> Option<usize> {
        self.entries.get(&question_index).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_means_unanswered() {
        let sheet = AnswerSheet::new();
        assert_eq!(sheet.selected(0), None);
        assert!(sheet.is_empty());
    }

    #[test]
    fn reselecting_overwrites() {
        let mut sheet = AnswerSheet::new();
        sheet.select(2, 0);
        sheet.select(2, 3);

        assert_eq!(sheet.selected(2), Some(3));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn entries_are_independent_per_question() {
        let mut sheet = AnswerSheet::new();
        sheet.select(0, 1);
        sheet.select(4, 2);

        assert_eq!(sheet.selected(0), Some(1));
        assert_eq!(sheet.selected(4), Some(2));
        assert_eq!(sheet.selected(1), None);
        assert_eq!(sheet.answered_count(), 2);
    }
}

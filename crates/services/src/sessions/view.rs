use exam_core::model::{Quiz, QuizResult};
use exam_core::session::SessionState;

use super::progress::SessionProgress;

/// Point-in-time picture of a live session.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings beyond what the Result itself carries
/// - no layout assumptions
///
/// The rendering layer formats and arranges these values as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub paused: bool,
    pub current_question: usize,
    pub remaining_secs: u32,
    pub progress: SessionProgress,
    pub result: Option<QuizResult>,
}

/// Headline numbers for the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub score_line: String,
    pub percentage: u32,
    pub passed: bool,
    pub time_spent: String,
}

impl ResultView {
    #[must_use]
    pub fn from_result(result: &QuizResult) -> Self {
        Self {
            score_line: format!("{}/{}", result.correct_count(), result.total_questions()),
            percentage: result.percentage(),
            passed: result.passed(),
            time_spent: format_clock(result.time_spent_secs()),
        }
    }
}

/// One row of the post-submission review screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question_index: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected_option: Option<usize>,
    pub correct_option: usize,
    pub correct: bool,
    pub explanation: Option<String>,
}

/// Join a finalized Result back onto the quiz content, one item per
/// question, answered or not.
#[must_use]
pub fn build_review(quiz: &Quiz, result: &QuizResult) -> Vec<ReviewItem> {
    result
        .breakdown()
        .iter()
        .filter_map(|outcome| {
            quiz.question(outcome.question_index).map(|question| ReviewItem {
                question_index: outcome.question_index,
                prompt: question.prompt().to_owned(),
                options: question.options().to_vec(),
                selected_option: outcome.selected_option,
                correct_option: outcome.correct_option,
                correct: outcome.correct,
                explanation: question.explanation().map(str::to_owned),
            })
        })
        .collect()
}

/// Countdown colour bucket for the timer display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePressure {
    Calm,
    Warning,
    Critical,
}

/// Classify remaining time: calm above half the limit, warning above a
/// quarter, critical below that.
#[must_use]
pub fn time_pressure(remaining_secs: u32, time_limit_secs: u32) -> TimePressure {
    if time_limit_secs == 0 {
        return TimePressure::Critical;
    }
    let remaining = u64::from(remaining_secs) * 4;
    let limit = u64::from(time_limit_secs);
    if remaining > limit * 2 {
        TimePressure::Calm
    } else if remaining > limit {
        TimePressure::Warning
    } else {
        TimePressure::Critical
    }
}

/// Format seconds as `m:ss` for the countdown display.
#[must_use]
pub fn format_clock(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerSheet, Question, QuizId};

    fn build_quiz() -> Quiz {
        let questions = vec![
            Question::new(
                "first",
                vec!["a".into(), "b".into()],
                1,
                Some("why".into()),
            )
            .unwrap(),
            Question::new("second", vec!["a".into(), "b".into()], 0, None).unwrap(),
        ];
        Quiz::new(QuizId::new(1), "View quiz", None, questions, 600, 1).unwrap()
    }

    #[test]
    fn clock_formats_minutes_and_padded_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(1800), "30:00");
    }

    #[test]
    fn time_pressure_buckets_follow_the_thresholds() {
        assert_eq!(time_pressure(51, 100), TimePressure::Calm);
        assert_eq!(time_pressure(50, 100), TimePressure::Warning);
        assert_eq!(time_pressure(26, 100), TimePressure::Warning);
        assert_eq!(time_pressure(25, 100), TimePressure::Critical);
        assert_eq!(time_pressure(0, 100), TimePressure::Critical);
    }

    #[test]
    fn review_covers_answered_and_unanswered_questions() {
        let quiz = build_quiz();
        let mut answers = AnswerSheet::new();
        answers.select(0, 1);

        let result = QuizResult::score(&quiz, &answers, 90);
        let review = build_review(&quiz, &result);

        assert_eq!(review.len(), 2);
        assert_eq!(review[0].selected_option, Some(1));
        assert!(review[0].correct);
        assert_eq!(review[0].explanation.as_deref(), Some("why"));
        assert_eq!(review[1].selected_option, None);
        assert!(!review[1].correct);
    }

    #[test]
    fn result_view_formats_headline_numbers() {
        let quiz = build_quiz();
        let mut answers = AnswerSheet::new();
        answers.select(0, 1);

        let view = ResultView::from_result(&QuizResult::score(&quiz, &answers, 65));

        assert_eq!(view.score_line, "1/2");
        assert_eq!(view.percentage, 50);
        assert!(view.passed);
        assert_eq!(view.time_spent, "1:05");
    }
}

use thiserror::Error;

use crate::model::{AnswerSheet, Quiz};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("correct count ({correct}) exceeds total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("breakdown has {breakdown} entries for {total} questions")]
    BreakdownMismatch { breakdown: usize, total: u32 },

    #[error("percentage {0} out of range")]
    InvalidPercentage(u32),
}

/// Correctness verdict for one question of a finalized attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_index: usize,
    pub correct: bool,
    pub selected_option: Option<usize>,
    pub correct_option: usize,
}

/// Derived scoring outcome of a completed quiz attempt.
///
/// A Result is a pure function of the quiz and the answer sheet plus the
/// elapsed time; it carries no hidden state and never changes once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    correct_count: u32,
    total_questions: u32,
    percentage: u32,
    passed: bool,
    time_spent_secs: u32,
    breakdown: Vec<QuestionOutcome>,
}

impl QuizResult {
    /// Score an answer sheet against a quiz.
    ///
    /// One point per question whose selected option equals the correct one,
    /// percentage rounded to the nearest whole number, passed when the
    /// correct count reaches the quiz passing score. The submission service
    /// scores with the same rules, so a locally computed Result is
    /// indistinguishable from a remote one.
    #[must_use]
    pub fn score(quiz: &Quiz, answers: &AnswerSheet, time_spent_secs: u32) -> Self {
        let mut breakdown = Vec::with_capacity(quiz.question_count());
        let mut correct_count = 0_u32;

        for (index, question) in quiz.questions().iter().enumerate() {
            let selected_option = answers.selected(index);
            let correct = selected_option == Some(question.correct_option());
            if correct {
                correct_count = correct_count.saturating_add(1);
            }
            breakdown.push(QuestionOutcome {
                question_index: index,
                correct,
                selected_option,
                correct_option: question.correct_option(),
            });
        }

        // Question counts are bounded to human-scale quizzes.
        #[allow(clippy::cast_possible_truncation)]
        let total_questions = quiz.question_count() as u32;

        Self {
            correct_count,
            total_questions,
            percentage: percentage_of(correct_count, total_questions),
            passed: correct_count >= quiz.passing_score(),
            time_spent_secs,
            breakdown,
        }
    }

    /// Rehydrate a Result returned by the submission service.
    ///
    /// # Errors
    ///
    /// Returns `ResultError` if the counts are inconsistent with each other
    /// or with the breakdown.
    pub fn from_parts(
        correct_count: u32,
        total_questions: u32,
        percentage: u32,
        passed: bool,
        time_spent_secs: u32,
        breakdown: Vec<QuestionOutcome>,
    ) -> Result<Self, ResultError> {
        if correct_count > total_questions {
            return Err(ResultError::CountMismatch {
                correct: correct_count,
                total: total_questions,
            });
        }
        if percentage > 100 {
            return Err(ResultError::InvalidPercentage(percentage));
        }
        if breakdown.len() != total_questions as usize {
            return Err(ResultError::BreakdownMismatch {
                breakdown: breakdown.len(),
                total: total_questions,
            });
        }

        Ok(Self {
            correct_count,
            total_questions,
            percentage,
            passed,
            time_spent_secs,
            breakdown,
        })
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        self.time_spent_secs
    }

    #[must_use]
    pub fn breakdown(&self) -> &[QuestionOutcome] {
        &self.breakdown
    }
}

fn percentage_of(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (f64::from(correct) * 100.0 / f64::from(total)).round() as u32;
    percent
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuizId};

    fn build_quiz(correct: &[usize], passing_score: u32) -> Quiz {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                let options = (0..4).map(|o| format!("option {o}")).collect();
                Question::new(format!("question {i}"), options, *answer, None).unwrap()
            })
            .collect();
        Quiz::new(QuizId::new(1), "Scoring", None, questions, 300, passing_score).unwrap()
    }

    #[test]
    fn scores_known_answer_sheet() {
        let quiz = build_quiz(&[1, 2, 1, 3, 0], 3);
        let mut answers = AnswerSheet::new();
        answers.select(0, 1);
        answers.select(1, 2);
        answers.select(2, 0);
        answers.select(3, 3);
        answers.select(4, 1);

        let result = QuizResult::score(&quiz, &answers, 120);

        assert_eq!(result.correct_count(), 3);
        assert_eq!(result.total_questions(), 5);
        assert_eq!(result.percentage(), 60);
        assert!(result.passed());
        assert_eq!(result.time_spent_secs(), 120);
    }

    #[test]
    fn unanswered_questions_earn_no_credit() {
        let quiz = build_quiz(&[0, 0], 1);
        let mut answers = AnswerSheet::new();
        answers.select(0, 0);

        let result = QuizResult::score(&quiz, &answers, 10);

        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.breakdown()[1].selected_option, None);
        assert!(!result.breakdown()[1].correct);
    }

    #[test]
    fn breakdown_covers_every_question() {
        let quiz = build_quiz(&[0, 1, 2], 0);
        let result = QuizResult::score(&quiz, &AnswerSheet::new(), 0);

        assert_eq!(result.breakdown().len(), 3);
        for (index, outcome) in result.breakdown().iter().enumerate() {
            assert_eq!(outcome.question_index, index);
        }
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        let quiz = build_quiz(&[0, 0, 0], 0);
        let mut answers = AnswerSheet::new();
        answers.select(0, 0);
        assert_eq!(QuizResult::score(&quiz, &answers, 0).percentage(), 33);

        answers.select(1, 0);
        assert_eq!(QuizResult::score(&quiz, &answers, 0).percentage(), 67);
    }

    #[test]
    fn passing_is_reaching_the_threshold() {
        let quiz = build_quiz(&[0, 0], 2);
        let mut answers = AnswerSheet::new();
        answers.select(0, 0);
        assert!(!QuizResult::score(&quiz, &answers, 0).passed());

        answers.select(1, 0);
        assert!(QuizResult::score(&quiz, &answers, 0).passed());
    }

    #[test]
    fn from_parts_rejects_inconsistent_counts() {
        let err = QuizResult::from_parts(3, 2, 100, true, 10, Vec::new()).unwrap_err();
        assert_eq!(err, ResultError::CountMismatch { correct: 3, total: 2 });

        let err = QuizResult::from_parts(1, 2, 150, false, 10, Vec::new()).unwrap_err();
        assert_eq!(err, ResultError::InvalidPercentage(150));

        let err = QuizResult::from_parts(1, 2, 50, false, 10, Vec::new()).unwrap_err();
        assert_eq!(
            err,
            ResultError::BreakdownMismatch {
                breakdown: 0,
                total: 2
            }
        );
    }

    #[test]
    fn from_parts_accepts_a_remote_result() {
        let breakdown = vec![
            QuestionOutcome {
                question_index: 0,
                correct: true,
                selected_option: Some(1),
                correct_option: 1,
            },
            QuestionOutcome {
                question_index: 1,
                correct: false,
                selected_option: None,
                correct_option: 0,
            },
        ];

        let result = QuizResult::from_parts(1, 2, 50, true, 30, breakdown).unwrap();
        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.percentage(), 50);
        assert_eq!(result.breakdown().len(), 2);
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use exam_core::model::{AnswerSheet, Quiz, QuizId, QuizResult};
use exam_core::time::Clock;

/// Errors surfaced by the exam backend and its stand-ins.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("remote API is not configured")]
    Disabled,

    #[error("not found")]
    NotFound,

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid payload: {0}")]
    Payload(String),
}

/// One scored attempt as kept by the submission service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub id: String,
    pub quiz_id: QuizId,
    pub submitted_at: DateTime<Utc>,
    pub correct_count: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub passed: bool,
}

impl AttemptRecord {
    #[must_use]
    pub fn from_result(quiz_id: QuizId, submitted_at: DateTime<Utc>, result: &QuizResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            quiz_id,
            submitted_at,
            correct_count: result.correct_count(),
            total_questions: result.total_questions(),
            percentage: result.percentage(),
            passed: result.passed(),
        }
    }
}

/// Serves quiz content by identifier.
#[async_trait]
pub trait QuizProvider: Send + Sync {
    /// Fetch a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no such quiz exists, or other
    /// variants for transport and decoding failures.
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError>;
}

/// Accepts finished answer sheets and returns scored Results.
#[async_trait]
pub trait AttemptGateway: Send + Sync {
    /// Score an answer sheet for a quiz and record the attempt.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the attempt cannot be scored remotely; the
    /// caller is expected to fall back to local scoring.
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &AnswerSheet,
        time_spent_secs: u32,
    ) -> Result<QuizResult, ApiError>;

    /// List recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or decoding failures.
    async fn attempt_history(&self, limit: u32) -> Result<Vec<AttemptRecord>, ApiError>;
}

/// In-memory backend for tests and offline runs.
///
/// Scores with the same rules as the hosted submission service, so swapping
/// it in is invisible to the session layer.
#[derive(Clone)]
pub struct InMemoryApi {
    clock: Clock,
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
    attempts: Arc<Mutex<Vec<AttemptRecord>>>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            quizzes: Arc::new(Mutex::new(HashMap::new())),
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make a quiz available for fetching.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the store is unusable.
    pub fn insert_quiz(&self, quiz: Quiz) -> Result<(), ApiError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        guard.insert(quiz.id(), quiz);
        Ok(())
    }
}

impl Default for InMemoryApi {
    fn default() -> Self {
        Self::new(Clock::default())
    }
}

#[async_trait]
impl QuizProvider for InMemoryApi {
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        guard.get(&id).cloned().ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl AttemptGateway for InMemoryApi {
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &AnswerSheet,
        time_spent_secs: u32,
    ) -> Result<QuizResult, ApiError> {
        let quiz = self.fetch_quiz(quiz_id).await?;
        let result = QuizResult::score(&quiz, answers, time_spent_secs);

        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        guard.push(AttemptRecord::from_result(quiz_id, self.clock.now(), &result));

        Ok(result)
    }

    async fn attempt_history(&self, limit: u32) -> Result<Vec<AttemptRecord>, ApiError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(guard
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::Question;
    use exam_core::time::fixed_clock;

    fn build_quiz(id: u64) -> Quiz {
        let questions = vec![
            Question::new(
                "pick B",
                vec!["a".into(), "b".into(), "c".into()],
                1,
                None,
            )
            .unwrap(),
            Question::new(
                "pick A",
                vec!["a".into(), "b".into(), "c".into()],
                0,
                None,
            )
            .unwrap(),
        ];
        Quiz::new(QuizId::new(id), "Gateway quiz", None, questions, 120, 1).unwrap()
    }

    #[tokio::test]
    async fn fetch_missing_quiz_is_not_found() {
        let backend = InMemoryApi::new(fixed_clock());
        let err = backend.fetch_quiz(QuizId::new(9)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn submission_scores_like_the_local_rules() {
        let backend = InMemoryApi::new(fixed_clock());
        let quiz = build_quiz(1);
        backend.insert_quiz(quiz.clone()).unwrap();

        let mut answers = AnswerSheet::new();
        answers.select(0, 1);

        let remote = backend
            .submit_attempt(quiz.id(), &answers, 30)
            .await
            .unwrap();
        let local = QuizResult::score(&quiz, &answers, 30);

        assert_eq!(remote, local);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let backend = InMemoryApi::new(fixed_clock());
        backend.insert_quiz(build_quiz(1)).unwrap();
        backend.insert_quiz(build_quiz(2)).unwrap();
        backend.insert_quiz(build_quiz(3)).unwrap();

        let answers = AnswerSheet::new();
        for id in 1..=3 {
            backend
                .submit_attempt(QuizId::new(id), &answers, 10)
                .await
                .unwrap();
        }

        let history = backend.attempt_history(2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].quiz_id, QuizId::new(3));
        assert_eq!(history[1].quiz_id, QuizId::new(2));
        assert_eq!(history[0].total_questions, 2);
        assert!(!history[0].passed);
    }
}

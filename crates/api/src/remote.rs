use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use exam_core::model::{
    AnswerSheet, Question, QuestionOutcome, Quiz, QuizId, QuizResult,
};

use crate::gateway::{ApiError, AttemptGateway, AttemptRecord, QuizProvider};

/// Connection settings for the exam backend.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl ApiConfig {
    /// Read configuration from `EXAM_API_BASE_URL` / `EXAM_API_TOKEN`.
    ///
    /// Returns `None` when no base URL is set; remote access stays disabled
    /// and every call reports [`ApiError::Disabled`].
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("EXAM_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let token = env::var("EXAM_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Some(Self { base_url, token })
    }
}

/// HTTP client for the exam content and submission endpoints.
#[derive(Clone)]
pub struct RemoteApi {
    client: Client,
    config: Option<ApiConfig>,
}

impl RemoteApi {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ApiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<(String, Option<&str>), ApiError> {
        let config = self.config.as_ref().ok_or(ApiError::Disabled)?;
        let url = format!("{}/{path}", config.base_url.trim_end_matches('/'));
        Ok((url, config.token.as_deref()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (url, token) = self.endpoint(path)?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let (url, token) = self.endpoint(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    response
        .json()
        .await
        .map_err(|e| ApiError::Payload(e.to_string()))
}

#[async_trait]
impl QuizProvider for RemoteApi {
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self.get_json(&format!("quiz/{id}")).await?;
        dto.into_quiz()
    }
}

#[async_trait]
impl AttemptGateway for RemoteApi {
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &AnswerSheet,
        time_spent_secs: u32,
    ) -> Result<QuizResult, ApiError> {
        let payload = AttemptRequest {
            answers,
            time_spent_secs,
        };
        let dto: ResultDto = self
            .post_json(&format!("quiz/{quiz_id}/attempt"), &payload)
            .await?;
        dto.into_result()
    }

    async fn attempt_history(&self, limit: u32) -> Result<Vec<AttemptRecord>, ApiError> {
        let dtos: Vec<AttemptDto> = self.get_json("quiz/history").await?;
        Ok(dtos
            .into_iter()
            .take(limit as usize)
            .map(AttemptDto::into_record)
            .collect())
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptRequest<'a> {
    answers: &'a AnswerSheet,
    time_spent_secs: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDto {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    /// Minutes, as served by the content API.
    time_limit: u32,
    passing_score: u32,
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    explanation: Option<String>,
}

impl QuizDto {
    fn into_quiz(self) -> Result<Quiz, ApiError> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question::new(q.question, q.options, q.correct_answer, q.explanation))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Payload(e.to_string()))?;

        Quiz::new(
            QuizId::new(self.id),
            self.title,
            self.description,
            questions,
            self.time_limit.saturating_mul(60),
            self.passing_score,
        )
        .map_err(|e| ApiError::Payload(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultDto {
    score: u32,
    total_questions: u32,
    percentage: u32,
    passed: bool,
    time_spent: u32,
    correct_answers: Vec<OutcomeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeDto {
    question_index: usize,
    correct: bool,
    #[serde(default)]
    selected_answer: Option<usize>,
    correct_answer: usize,
}

impl ResultDto {
    fn into_result(self) -> Result<QuizResult, ApiError> {
        let breakdown = self
            .correct_answers
            .into_iter()
            .map(|o| QuestionOutcome {
                question_index: o.question_index,
                correct: o.correct,
                selected_option: o.selected_answer,
                correct_option: o.correct_answer,
            })
            .collect();

        QuizResult::from_parts(
            self.score,
            self.total_questions,
            self.percentage,
            self.passed,
            self.time_spent,
            breakdown,
        )
        .map_err(|e| ApiError::Payload(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttemptDto {
    id: String,
    quiz_id: u64,
    submitted_at: DateTime<Utc>,
    score: u32,
    total_questions: u32,
    percentage: u32,
    passed: bool,
}

impl AttemptDto {
    fn into_record(self) -> AttemptRecord {
        AttemptRecord {
            id: self.id,
            quiz_id: QuizId::new(self.quiz_id),
            submitted_at: self.submitted_at,
            correct_count: self.score,
            total_questions: self.total_questions,
            percentage: self.percentage,
            passed: self.passed,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quiz_payload_maps_into_domain() {
        let dto: QuizDto = serde_json::from_value(json!({
            "id": 4,
            "title": "Mechanics",
            "description": "Newton's laws",
            "timeLimit": 30,
            "passingScore": 2,
            "questions": [
                {
                    "question": "Pick B",
                    "options": ["a", "b", "c", "d"],
                    "correctAnswer": 1,
                    "explanation": "because"
                },
                {
                    "question": "Pick D",
                    "options": ["a", "b", "c", "d"],
                    "correctAnswer": 3
                }
            ]
        }))
        .unwrap();

        let quiz = dto.into_quiz().unwrap();
        assert_eq!(quiz.id(), QuizId::new(4));
        assert_eq!(quiz.time_limit_secs(), 1800);
        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.questions()[0].explanation(), Some("because"));
        assert_eq!(quiz.questions()[1].correct_option(), 3);
    }

    #[test]
    fn invalid_quiz_payload_is_a_payload_error() {
        let dto: QuizDto = serde_json::from_value(json!({
            "id": 4,
            "title": "Broken",
            "timeLimit": 30,
            "passingScore": 1,
            "questions": [
                {
                    "question": "Pick the impossible",
                    "options": ["a", "b"],
                    "correctAnswer": 5
                }
            ]
        }))
        .unwrap();

        let err = dto.into_quiz().unwrap_err();
        assert!(matches!(err, ApiError::Payload(_)));
    }

    #[test]
    fn result_payload_maps_into_domain() {
        let dto: ResultDto = serde_json::from_value(json!({
            "score": 1,
            "totalQuestions": 2,
            "percentage": 50,
            "passed": true,
            "timeSpent": 42,
            "correctAnswers": [
                { "questionIndex": 0, "correct": true, "selectedAnswer": 1, "correctAnswer": 1 },
                { "questionIndex": 1, "correct": false, "correctAnswer": 0 }
            ]
        }))
        .unwrap();

        let result = dto.into_result().unwrap();
        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.time_spent_secs(), 42);
        assert_eq!(result.breakdown()[1].selected_option, None);
    }

    #[test]
    fn attempt_request_serializes_with_string_keys() {
        let mut answers = AnswerSheet::new();
        answers.select(0, 1);
        answers.select(3, 2);

        let payload = AttemptRequest {
            answers: &answers,
            time_spent_secs: 95,
        };
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["answers"]["0"], 1);
        assert_eq!(value["answers"]["3"], 2);
        assert_eq!(value["timeSpentSecs"], 95);
    }

    #[test]
    fn history_payload_maps_into_records() {
        let dto: AttemptDto = serde_json::from_value(json!({
            "id": "a3c1",
            "quizId": 7,
            "submittedAt": "2025-06-15T08:13:20Z",
            "score": 4,
            "totalQuestions": 5,
            "percentage": 80,
            "passed": true
        }))
        .unwrap();

        let record = dto.into_record();
        assert_eq!(record.quiz_id, QuizId::new(7));
        assert_eq!(record.percentage, 80);
        assert!(record.passed);
    }

    #[tokio::test]
    async fn unconfigured_client_reports_disabled() {
        let remote = RemoteApi::new(None);
        assert!(!remote.enabled());

        let err = remote.fetch_quiz(QuizId::new(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Disabled));

        let err = remote
            .submit_attempt(QuizId::new(1), &AnswerSheet::new(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Disabled));
    }
}

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::model::{AnswerSheet, Quiz, QuizResult};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one quiz attempt.
///
/// `Submitted` is terminal; pausing is an orthogonal flag on `Active`, not a
/// state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Active,
    Submitted,
}

/// Outcome of one 1 Hz countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick was ignored: the session is paused or not running.
    Idle,
    /// The clock moved; time is still on.
    Running { remaining_secs: u32 },
    /// The countdown reached zero and the session submitted itself.
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Live state of one user taking one quiz attempt.
///
/// Every transition happens on a discrete call (a user action or the 1 Hz
/// countdown tick), so the machine is fully deterministic. Operations that
/// are invalid in the current state are ignored and report `false` instead of
/// erroring; callers may forward UI events without pre-checking.
pub struct QuizSession {
    quiz: Arc<Quiz>,
    state: SessionState,
    paused: bool,
    current: usize,
    answers: AnswerSheet,
    remaining_secs: u32,
    result: Option<QuizResult>,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session in `NotStarted` with the full time limit on the clock.
    #[must_use]
    pub fn new(quiz: Arc<Quiz>) -> Self {
        let remaining_secs = quiz.time_limit_secs();
        Self {
            quiz,
            state: SessionState::NotStarted,
            paused: false,
            current: 0,
            answers: AnswerSheet::new(),
            remaining_secs,
            result: None,
            started_at: None,
            submitted_at: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Index of the question currently in front of the user.
    #[must_use]
    pub fn current_question(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Seconds consumed so far: time limit minus remaining time.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.quiz.time_limit_secs().saturating_sub(self.remaining_secs)
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Begin the attempt. Valid only from `NotStarted`.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != SessionState::NotStarted {
            return false;
        }
        self.state = SessionState::Active;
        self.started_at = Some(now);
        true
    }

    /// Suspend the countdown without leaving `Active`.
    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Active || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    /// Resume the countdown after a pause.
    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Active || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    /// Record an option choice. The answer sheet is mutable only while
    /// `Active`; out-of-range indexes and calls in any other state are
    /// ignored.
    pub fn select_answer(&mut self, question_index: usize, option_index: usize) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        let Some(question) = self.quiz.question(question_index) else {
            return false;
        };
        if option_index >= question.option_count() {
            return false;
        }
        self.answers.select(question_index, option_index);
        true
    }

    /// Move the question pointer to any valid index (random access; answering
    /// in order is not required). Out-of-range indexes are rejected and the
    /// pointer keeps its prior value.
    pub fn go_to_question(&mut self, index: usize) -> bool {
        if index >= self.quiz.question_count() {
            return false;
        }
        self.current = index;
        true
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero submits the session exactly as an explicit [`submit`]
    /// call would; ticks while paused or outside `Active` do nothing.
    ///
    /// [`submit`]: Self::submit
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.state != SessionState::Active || self.paused {
            return TickOutcome::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.finalize(now);
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Close the attempt. Valid only from `Active`; a second call while
    /// already `Submitted` is a no-op, so submission is idempotent.
    pub fn submit(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        self.finalize(now);
        true
    }

    fn finalize(&mut self, now: DateTime<Utc>) {
        self.state = SessionState::Submitted;
        self.paused = false;
        self.submitted_at = Some(now);
    }

    /// Attach the scored Result to a submitted session.
    ///
    /// First write wins: once a Result is attached, whether it came from the
    /// submission service or from local scoring, later Results are
    /// discarded.
    pub fn resolve_result(&mut self, result: QuizResult) -> bool {
        if self.state != SessionState::Submitted || self.result.is_some() {
            return false;
        }
        self.result = Some(result);
        true
    }

    /// Score the attempt locally, for when the submission service fails.
    ///
    /// Available only once submitted; matches the remote scoring contract
    /// exactly (see [`QuizResult::score`]).
    #[must_use]
    pub fn local_result(&self) -> Option<QuizResult> {
        if self.state != SessionState::Submitted {
            return None;
        }
        Some(QuizResult::score(&self.quiz, &self.answers, self.elapsed_secs()))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id())
            .field("state", &self.state)
            .field("paused", &self.paused)
            .field("current", &self.current)
            .field("answered", &self.answers.answered_count())
            .field("remaining_secs", &self.remaining_secs)
            .field("has_result", &self.result.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

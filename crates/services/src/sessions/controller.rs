use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use api::sample;
use api::{ApiError, AttemptGateway, AttemptRecord, QuizProvider};
use exam_core::model::{Quiz, QuizId, QuizResult};
use exam_core::session::{QuizSession, SessionState};
use exam_core::time::Clock;

use super::progress::SessionProgress;
use super::timer::Countdown;
use super::view::{ResultView, ReviewItem, SessionSnapshot, build_review};

/// Lock a shared session. A poisoned lock still holds a structurally valid
/// session, so panics elsewhere never brick the attempt.
pub(crate) fn lock(session: &Mutex<QuizSession>) -> MutexGuard<'_, QuizSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User-driven operations on a live session.
///
/// The rendering layer feeds commands in and renders the snapshot that comes
/// back; it never touches session state directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Pause,
    Resume,
    SelectAnswer {
        question_index: usize,
        option_index: usize,
    },
    GoToQuestion(usize),
    Submit,
    Restart,
}

/// Owns one quiz attempt end to end: the session state machine, the
/// countdown task, and the submission pipeline.
///
/// Cloning is cheap and clones share the same session; the countdown is
/// cancelled on pause, submission and drop of the last clone.
#[derive(Clone)]
pub struct SessionController {
    clock: Clock,
    attempts: Arc<dyn AttemptGateway>,
    quiz: Arc<Quiz>,
    used_fallback: bool,
    session: Arc<Mutex<QuizSession>>,
    timer: Arc<Mutex<Option<Countdown>>>,
}

impl SessionController {
    /// Fetch quiz content and wrap it in a fresh session.
    ///
    /// A provider failure is absorbed by substituting the bundled quiz, so
    /// loading never fails; the substitution is observable through
    /// [`used_fallback`](Self::used_fallback).
    pub async fn load(
        quiz_id: QuizId,
        quizzes: Arc<dyn QuizProvider>,
        attempts: Arc<dyn AttemptGateway>,
        clock: Clock,
    ) -> Self {
        let (quiz, used_fallback) = match quizzes.fetch_quiz(quiz_id).await {
            Ok(quiz) => (quiz, false),
            Err(err) => {
                warn!("quiz {quiz_id} unavailable, using the bundled quiz: {err}");
                (sample::bundled_quiz(), true)
            }
        };
        Self::from_parts(quiz, used_fallback, attempts, clock)
    }

    /// Wrap already-loaded quiz content.
    #[must_use]
    pub fn from_quiz(quiz: Quiz, attempts: Arc<dyn AttemptGateway>, clock: Clock) -> Self {
        Self::from_parts(quiz, false, attempts, clock)
    }

    fn from_parts(
        quiz: Quiz,
        used_fallback: bool,
        attempts: Arc<dyn AttemptGateway>,
        clock: Clock,
    ) -> Self {
        let quiz = Arc::new(quiz);
        let session = Arc::new(Mutex::new(QuizSession::new(Arc::clone(&quiz))));
        Self {
            clock,
            attempts,
            quiz,
            used_fallback,
            session,
            timer: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// True when the quiz on screen is the bundled substitute rather than
    /// the one the provider was asked for.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Apply one command and return the resulting snapshot.
    pub async fn apply(&self, command: SessionCommand) -> SessionSnapshot {
        match command {
            SessionCommand::Start => {
                self.start();
            }
            SessionCommand::Pause => {
                self.pause();
            }
            SessionCommand::Resume => {
                self.resume();
            }
            SessionCommand::SelectAnswer {
                question_index,
                option_index,
            } => {
                self.select_answer(question_index, option_index);
            }
            SessionCommand::GoToQuestion(index) => {
                self.go_to_question(index);
            }
            SessionCommand::Submit => return self.submit().await,
            SessionCommand::Restart => self.restart(),
        }
        self.snapshot()
    }

    /// Begin the attempt and start the countdown. No-op unless `NotStarted`.
    pub fn start(&self) -> bool {
        let started = lock(&self.session).start(self.clock.now());
        if started {
            self.spawn_timer();
        }
        started
    }

    /// Suspend the countdown; the session stays `Active`.
    pub fn pause(&self) -> bool {
        let paused = lock(&self.session).pause();
        if paused {
            self.stop_timer();
        }
        paused
    }

    /// Restart the countdown after a pause.
    pub fn resume(&self) -> bool {
        let resumed = lock(&self.session).resume();
        if resumed {
            self.spawn_timer();
        }
        resumed
    }

    pub fn select_answer(&self, question_index: usize, option_index: usize) -> bool {
        lock(&self.session).select_answer(question_index, option_index)
    }

    /// The option currently recorded for a question, if any.
    #[must_use]
    pub fn selected_answer(&self, question_index: usize) -> Option<usize> {
        lock(&self.session).answers().selected(question_index)
    }

    pub fn go_to_question(&self, index: usize) -> bool {
        lock(&self.session).go_to_question(index)
    }

    /// Close the attempt and resolve its Result.
    ///
    /// Idempotent: repeated calls return the existing outcome. The attempt is
    /// scored by the submission service when possible and locally when not.
    /// Stopping the countdown can abort an expiry pipeline that has not
    /// resolved yet, so the pipeline also runs when the session is already
    /// `Submitted` but still without a Result.
    pub async fn submit(&self) -> SessionSnapshot {
        self.stop_timer();
        let needs_result = {
            let mut guard = lock(&self.session);
            guard.submit(self.clock.now());
            guard.state() == SessionState::Submitted && guard.result().is_none()
        };
        if needs_result {
            self.finish_submission().await;
        }
        self.snapshot()
    }

    /// Throw the current attempt away and put a fresh `NotStarted` session
    /// in its place. The old session object is unaffected wherever it is
    /// still borrowed.
    pub fn restart(&self) {
        self.stop_timer();
        *lock(&self.session) = QuizSession::new(Arc::clone(&self.quiz));
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let guard = lock(&self.session);
        let total_questions = self.quiz.question_count();
        let answered = guard.answers().answered_count();
        SessionSnapshot {
            state: guard.state(),
            paused: guard.is_paused(),
            current_question: guard.current_question(),
            remaining_secs: guard.remaining_secs(),
            progress: SessionProgress {
                total_questions,
                answered,
                unanswered: total_questions.saturating_sub(answered),
            },
            result: guard.result().cloned(),
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        lock(&self.session).result().cloned()
    }

    /// Headline numbers for the results screen, once a Result exists.
    #[must_use]
    pub fn result_view(&self) -> Option<ResultView> {
        self.result().map(|result| ResultView::from_result(&result))
    }

    /// Per-question review rows, once a Result exists.
    #[must_use]
    pub fn review(&self) -> Option<Vec<ReviewItem>> {
        self.result()
            .map(|result| build_review(&self.quiz, &result))
    }

    /// Recent attempts from the submission service, newest first.
    ///
    /// # Errors
    ///
    /// Passes gateway failures through; history has no local fallback.
    pub async fn history(&self, limit: u32) -> Result<Vec<AttemptRecord>, ApiError> {
        self.attempts.attempt_history(limit).await
    }

    /// Remote-first scoring with local fallback; the first completed Result
    /// wins and later ones are discarded.
    pub(crate) async fn finish_submission(&self) {
        let (answers, elapsed) = {
            let guard = lock(&self.session);
            (guard.answers().clone(), guard.elapsed_secs())
        };

        let resolved = match self
            .attempts
            .submit_attempt(self.quiz.id(), &answers, elapsed)
            .await
        {
            Ok(remote) => lock(&self.session).resolve_result(remote),
            Err(err) => {
                warn!(
                    "attempt submission for quiz {} failed, scoring locally: {err}",
                    self.quiz.id()
                );
                let mut guard = lock(&self.session);
                match guard.local_result() {
                    Some(local) => guard.resolve_result(local),
                    None => false,
                }
            }
        };

        if !resolved {
            debug!("a Result was already attached; discarding the later one");
        }
    }

    fn spawn_timer(&self) {
        let ctrl = self.clone();
        let countdown = Countdown::spawn(Arc::clone(&self.session), self.clock, move || async move {
            ctrl.finish_submission().await;
        });
        *self.timer_slot() = Some(countdown);
    }

    fn stop_timer(&self) {
        // Dropping the handle aborts the tick task.
        self.timer_slot().take();
    }

    fn timer_slot(&self) -> MutexGuard<'_, Option<Countdown>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("quiz_id", &self.quiz.id())
            .field("used_fallback", &self.used_fallback)
            .field("session", &lock(&self.session))
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

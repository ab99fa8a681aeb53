use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use exam_core::session::{QuizSession, TickOutcome};
use exam_core::time::Clock;

use super::controller::lock;

/// The running 1 Hz countdown behind an `Active` session.
///
/// The task stops on its own when the session leaves `Active`; dropping the
/// handle aborts it, which covers pause, explicit submission and teardown.
pub(crate) struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawn the countdown loop driving [`QuizSession::tick`].
    ///
    /// `on_expired` runs once if the clock reaches zero, after the session
    /// has already transitioned to `Submitted`.
    pub(crate) fn spawn<F, Fut>(
        session: Arc<Mutex<QuizSession>>,
        clock: Clock,
        on_expired: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of an interval completes immediately; the
            // countdown must not lose a second to it.
            interval.tick().await;

            loop {
                interval.tick().await;
                let outcome = {
                    let mut guard = lock(&session);
                    guard.tick(clock.now())
                };
                match outcome {
                    TickOutcome::Running { .. } => {}
                    TickOutcome::Expired => {
                        on_expired().await;
                        break;
                    }
                    // The session left Active some other way; this task is stale.
                    TickOutcome::Idle => break,
                }
            }
        });

        Self { handle }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

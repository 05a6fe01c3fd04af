use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use quiz_core::model::{OptionIndex, QuestionIndex, QuizConfig};

use super::controller::{FinishReason, SessionController, TickOutcome};
use super::timer::TimerToken;
use crate::error::SessionError;

/// Wall-clock interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Notifications for the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Tick { remaining: u32 },
    Finished { reason: FinishReason, total_points: f64 },
}

/// Runs a [`SessionController`] against wall-clock time.
///
/// The controller lives behind one async mutex shared by command callers and
/// the tick task. Finishing (by submission or timeout) disarms the countdown
/// inside that critical section, so at most one finish ever scores the
/// attempt and no tick lands after it. The tick task's abort handle sits
/// outside the controller lock so dropping the runner can always cancel it.
pub struct QuizRunner {
    controller: Arc<Mutex<SessionController>>,
    ticker: StdMutex<Option<AbortHandle>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(controller: SessionController) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let runner = Self {
            controller: Arc::new(Mutex::new(controller)),
            ticker: StdMutex::new(None),
            events,
        };
        (runner, receiver)
    }

    /// Start an attempt and begin ticking.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from [`SessionController::start`].
    pub async fn start(&self, config: QuizConfig) -> Result<(), SessionError> {
        let mut controller = self.controller.lock().await;
        let token = controller.start(config)?;
        let handle = spawn_ticker(Arc::clone(&self.controller), self.events.clone(), token);
        self.replace_ticker(Some(handle));
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates `SessionError` from [`SessionController::select`].
    pub async fn select(&self, question: QuestionIndex, option: OptionIndex) -> Result<(), SessionError> {
        self.controller.lock().await.select(question, option)
    }

    /// # Errors
    ///
    /// Propagates `SessionError` from [`SessionController::next`].
    pub async fn next(&self) -> Result<(), SessionError> {
        self.controller.lock().await.next()
    }

    /// # Errors
    ///
    /// Propagates `SessionError` from [`SessionController::previous`].
    pub async fn previous(&self) -> Result<(), SessionError> {
        self.controller.lock().await.previous()
    }

    /// # Errors
    ///
    /// Propagates `SessionError` from [`SessionController::go_to`].
    pub async fn go_to(&self, question: QuestionIndex) -> Result<(), SessionError> {
        self.controller.lock().await.go_to(question)
    }

    /// Submit the attempt. Returns `false` if it was already finished.
    pub async fn submit(&self) -> bool {
        let mut controller = self.controller.lock().await;
        if !controller.submit() {
            return false;
        }
        self.replace_ticker(None);
        publish_finished(&self.events, &controller);
        true
    }

    /// # Errors
    ///
    /// Propagates `SessionError` from [`SessionController::reset`].
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.controller.lock().await.reset()
    }

    /// Run a read-only query against the controller.
    pub async fn inspect<R>(&self, query: impl FnOnce(&SessionController) -> R) -> R {
        let controller = self.controller.lock().await;
        query(&controller)
    }

    /// Whether a tick task is still scheduled for the current attempt.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn replace_ticker(&self, next: Option<AbortHandle>) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = std::mem::replace(&mut *slot, next) {
            stale.abort();
        }
    }
}

impl Drop for QuizRunner {
    fn drop(&mut self) {
        self.replace_ticker(None);
    }
}

fn send(events: &mpsc::UnboundedSender<SessionEvent>, event: SessionEvent) {
    if events.send(event).is_err() {
        tracing::debug!("session event receiver dropped");
    }
}

fn publish_finished(events: &mpsc::UnboundedSender<SessionEvent>, controller: &SessionController) {
    if let (Ok(result), Some(reason)) = (controller.result(), controller.finish_reason()) {
        send(
            events,
            SessionEvent::Finished {
                reason,
                total_points: result.total_points(),
            },
        );
    }
}

fn spawn_ticker(
    controller: Arc<Mutex<SessionController>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    token: TimerToken,
) -> AbortHandle {
    let task = tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let mut controller = controller.lock().await;
            match controller.tick_armed(token) {
                Some(TickOutcome::Running { remaining }) => {
                    send(&events, SessionEvent::Tick { remaining });
                }
                Some(TickOutcome::Expired) => {
                    publish_finished(&events, &controller);
                    break;
                }
                None => break,
            }
        }
    });
    task.abort_handle()
}

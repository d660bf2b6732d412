use crate::error::{Result, SuiteError};
use crate::ui::UiContext;
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::any::Any;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

type UiCall = Box<dyn FnOnce(&mut UiContext) + Send>;

/// Hands the UI thread over to an async worker for the duration of a request.
///
/// The UI thread blocks in [`ThreadController::give_control`] and runs every
/// closure the worker sends through its [`ControlHandle`], so console access
/// never leaves the thread that owns it.
pub struct ThreadController {
    calls_tx: Sender<UiCall>,
    calls_rx: Receiver<UiCall>,
    poll_interval: Duration,
}

impl ThreadController {
    pub fn new() -> Self {
        let (calls_tx, calls_rx) = unbounded();
        Self {
            calls_tx,
            calls_rx,
            poll_interval: Duration::from_millis(100),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn handle(&self) -> ControlHandle {
        ControlHandle {
            calls_tx: self.calls_tx.clone(),
        }
    }

    /// Runs `future` on `runtime` while servicing its UI calls on the current
    /// thread. Returns once the future has finished.
    ///
    /// After `token` fires the worker is left to finish on its own, but any
    /// UI call it makes is refused with [`SuiteError::Cancelled`]. A menu
    /// already open on `ui` closes as cancelled.
    pub fn give_control<T, F>(
        &self,
        ui: &mut UiContext,
        runtime: &Handle,
        future: F,
        token: &CancellationToken,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let previous = ui.replace_cancellation(token.clone());
        let result = self.serve(ui, runtime, future, token);
        ui.replace_cancellation(previous);
        result
    }

    fn serve<T, F>(
        &self,
        ui: &mut UiContext,
        runtime: &Handle,
        future: F,
        token: &CancellationToken,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = bounded(1);
        let task = runtime.spawn(future);
        runtime.spawn(async move {
            let _ = done_tx.send(task.await);
        });

        let mut cancelled = false;
        loop {
            if !cancelled && token.is_cancelled() {
                tracing::debug!("Cancellation requested, refusing further UI calls");
                cancelled = true;
            }

            select! {
                recv(self.calls_rx) -> call => {
                    let Ok(call) = call else { continue };
                    if cancelled {
                        // Dropping the call drops its reply sender.
                        drop(call);
                    } else {
                        tracing::debug!("Running worker call on UI thread");
                        call(ui);
                    }
                }
                recv(done_rx) -> outcome => {
                    self.discard_pending();
                    return match outcome {
                        Ok(Ok(result)) => result,
                        Ok(Err(e)) => Err(join_error(e)),
                        Err(_) => Err(SuiteError::TaskPanicked(
                            "worker exited without reporting".to_string(),
                        )),
                    };
                }
                default(self.poll_interval) => {}
            }
        }
    }

    fn discard_pending(&self) {
        while self.calls_rx.try_recv().is_ok() {}
    }
}

impl Default for ThreadController {
    fn default() -> Self {
        Self::new()
    }
}

fn join_error(e: JoinError) -> SuiteError {
    if e.is_panic() {
        SuiteError::TaskPanicked(panic_message(e.into_panic()))
    } else {
        SuiteError::Cancelled
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Worker-side end of a [`ThreadController`].
#[derive(Clone)]
pub struct ControlHandle {
    calls_tx: Sender<UiCall>,
}

impl ControlHandle {
    /// Runs `f` on the UI thread and waits for its result.
    pub async fn invoke<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut UiContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let call: UiCall = Box::new(move |ui| {
            let _ = reply_tx.send(f(ui));
        });

        self.calls_tx
            .send(call)
            .map_err(|_| SuiteError::ControllerClosed)?;
        reply_rx.await.map_err(|_| SuiteError::Cancelled)
    }
}

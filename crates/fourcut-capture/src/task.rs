//! One-way cancellable asynchronous operations.
//!
//! Every timer-driven flow (countdown ticks, inter-shot delays, stream
//! acquisition, file decoding) runs inside a [`CancellableTask`]. The body
//! receives a [`TaskScope`] and must route each suspension through it, so the
//! cancellation check lives in one place.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

/// Returned from a [`TaskScope`] resumption point after cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
struct TaskState {
    cancelled: Cell<bool>,
    settles: bool,
    finished: Cell<bool>,
    join: RefCell<Option<JoinHandle<()>>>,
}

/// A running `spawn_local` task with a monotonic cancellation flag.
///
/// Dropping the value detaches the task; only [`CancellableTask::cancel`]
/// stops it. Tasks from [`CancellableTask::spawn`] are aborted on cancel;
/// tasks from [`CancellableTask::spawn_settling`] keep running until their
/// next [`TaskScope`] checkpoint.
#[derive(Debug)]
pub struct CancellableTask {
    label: &'static str,
    state: Rc<TaskState>,
}

impl CancellableTask {
    /// Spawns `body` on the current `LocalSet`.
    ///
    /// # Panics
    /// Panics when called outside a `tokio::task::LocalSet`.
    pub fn spawn<F, Fut>(label: &'static str, body: F) -> Self
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = Result<(), Cancelled>> + 'static,
    {
        Self::start(label, false, body)
    }

    /// Spawns `body` so that cancellation never drops an in-flight await.
    ///
    /// Use this when the awaited operation completes on the host's side no
    /// matter what (a permission prompt, a device grant) and its result must
    /// still be disposed of. The body observes cancellation at its next
    /// checkpoint.
    ///
    /// # Panics
    /// Panics when called outside a `tokio::task::LocalSet`.
    pub fn spawn_settling<F, Fut>(label: &'static str, body: F) -> Self
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = Result<(), Cancelled>> + 'static,
    {
        Self::start(label, true, body)
    }

    fn start<F, Fut>(label: &'static str, settles: bool, body: F) -> Self
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = Result<(), Cancelled>> + 'static,
    {
        let state = Rc::new(TaskState {
            settles,
            ..TaskState::default()
        });
        let future = body(TaskScope {
            state: Rc::clone(&state),
        });

        let finished = Rc::clone(&state);
        let join = tokio::task::spawn_local(async move {
            if future.await.is_err() {
                tracing::debug!(stage = "task", action = "stopped", task = label);
            }
            finished.finished.set(true);
        });
        *state.join.borrow_mut() = Some(join);

        Self { label, state }
    }

    /// Cancels the task. Idempotent.
    ///
    /// The flag flips before this returns. For aborting tasks the pending
    /// timer is dropped too, so no countdown tick, capture or completion
    /// callback can run afterwards.
    pub fn cancel(&self) {
        if self.state.cancelled.replace(true) {
            return;
        }

        if !self.state.settles {
            let join = self.state.join.borrow_mut().take();
            if let Some(join) = join {
                join.abort();
            }
        }
        tracing::debug!(stage = "task", action = "cancel", task = self.label);
    }

    /// Returns `true` once [`CancellableTask::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Returns `true` when the body ran to its end without being aborted.
    pub fn is_finished(&self) -> bool {
        self.state.finished.get()
    }

    /// Diagnostic label given at spawn time.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// Resumption guard handed to a task body.
#[derive(Debug, Clone)]
pub struct TaskScope {
    state: Rc<TaskState>,
}

impl TaskScope {
    /// Fails with [`Cancelled`] once the owning task was cancelled.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.state.cancelled.get() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Waits `duration`, checking cancellation before and after the timer.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.checkpoint()?;
        tokio::time::sleep(duration).await;
        self.checkpoint()
    }

    /// Awaits `future`, checking cancellation before and after it resolves.
    pub async fn resume<F: Future>(&self, future: F) -> Result<F::Output, Cancelled> {
        self.checkpoint()?;
        let output = future.await;
        self.checkpoint()?;
        Ok(output)
    }

    /// Yields to the event loop once.
    pub async fn yield_now(&self) -> Result<(), Cancelled> {
        self.resume(tokio::task::yield_now()).await
    }
}

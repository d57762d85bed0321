//! Instance-owned background tasks
//!
//! Timers and watchers belong to exactly one controller instance. The handle
//! aborts its task when cancelled or dropped, so a controller going away can
//! never leave a timer running behind it.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Abort-on-drop handle to a spawned task
#[derive(Debug)]
pub struct OwnedTask<T = ()> {
    label: &'static str,
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> OwnedTask<T> {
    /// Spawn `future` on the current tokio runtime
    ///
    /// Panics if called outside a runtime, like `tokio::spawn`.
    pub fn spawn<F>(label: &'static str, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        debug!("Spawning {} task", label);
        Self {
            label,
            handle: Some(tokio::spawn(future)),
        }
    }
}

impl<T> OwnedTask<T> {
    /// Abort the task; returns whether it was still running
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                debug!("Cancelled {} task (was running: {})", self.label, was_running);
                was_running
            }
            None => false,
        }
    }

    /// Wait for the task's output
    ///
    /// A panic inside the task comes back as `Err`. Dropping the returned
    /// future before it completes still aborts the task. `None` if the task
    /// was cancelled earlier.
    pub async fn join(mut self) -> Option<Result<T, JoinError>> {
        let result = self.handle.as_mut()?.await;
        self.handle = None;
        Some(result)
    }

    /// Give up ownership without aborting; the task runs to completion
    pub fn detach(mut self) {
        self.handle = None;
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<T> Drop for OwnedTask<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn a fixed-period timer that calls `on_tick` while `owner` is alive
///
/// The first tick fires one full `period` after spawning. The task exits on
/// its own once the owner has been dropped.
pub fn spawn_interval<T, F>(
    label: &'static str,
    period: Duration,
    owner: Weak<T>,
    mut on_tick: F,
) -> OwnedTask
where
    T: Send + Sync + 'static,
    F: FnMut(&T) + Send + 'static,
{
    OwnedTask::spawn(label, async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let Some(owner) = owner.upgrade() else {
                debug!("{} owner dropped, timer exiting", label);
                break;
            };
            on_tick(&owner);
        }
    })
}

/// Lock a controller's state, recovering the data if a holder panicked
///
/// Controller state stays consistent across every individual transition, so
/// a poisoned lock carries no torn state.
pub(crate) fn lock_state<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

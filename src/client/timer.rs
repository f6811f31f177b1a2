//! Owned inactivity timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Fires a callback once after a period with no recorded activity.
///
/// The countdown restarts on every [`reset`](Self::reset). Dropping the timer
/// cancels it.
#[derive(Debug)]
pub struct InactivityTimer {
    reset: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl InactivityTimer {
    /// Start counting down `idle`, then run `on_expire`.
    pub fn start<F>(idle: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let reset = Arc::new(Notify::new());
        let notified = reset.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = notified.notified() => {}
                    _ = tokio::time::sleep(idle) => break,
                }
            }
            on_expire();
        });

        Self { reset, handle }
    }

    /// Restart the countdown.
    pub fn reset(&self) {
        self.reset.notify_one();
    }

    /// Whether the timer has fired or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

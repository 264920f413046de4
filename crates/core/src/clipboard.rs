use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// "Copied!" indicator next to a copy button.
///
/// Marking an id shows it for `delay`, then clears itself. Marking again
/// before the delay elapses cancels the pending clear and starts a new
/// full delay, so rapid copies never stack timers.
///
/// Reads always honor the deadline. Subscribers are only told about the
/// expiry when `mark` ran inside a tokio runtime; outside one no clear
/// task is spawned and the indicator just reads as gone once due.
pub struct CopyFlash {
    delay: Duration,
    current: Arc<watch::Sender<Option<String>>>,
    generation: Arc<AtomicU64>,
    deadline: Option<Instant>,
    pending_clear: Option<JoinHandle<()>>,
}

impl CopyFlash {
    pub fn new(delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            delay,
            current: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            deadline: None,
            pending_clear: None,
        }
    }

    /// Show the indicator for `id`, restarting the timer.
    pub fn mark(&mut self, id: impl Into<String>) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }

        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.deadline = Some(Instant::now() + self.delay);
        self.current.send_replace(Some(id.into()));

        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let current = Arc::clone(&self.current);
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        self.pending_clear = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer mark owns the indicator now.
            if generation.load(Ordering::SeqCst) == my_generation {
                current.send_replace(None);
            }
        }));
    }

    /// Id currently flashing, if any.
    pub fn current(&self) -> Option<String> {
        if self.expired() {
            return None;
        }
        self.current.borrow().clone()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.current().as_deref() == Some(id)
    }

    /// Watch indicator changes (for redraws).
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    /// Clear immediately and drop the pending timer.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.deadline = None;
        self.current.send_replace(None);
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|due| Instant::now() >= due)
    }
}

impl Drop for CopyFlash {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for CopyFlash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyFlash")
            .field("delay", &self.delay)
            .field("current", &self.current())
            .finish()
    }
}

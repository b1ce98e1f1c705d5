use std::sync::Arc;

use tokio::sync::watch;

/// Run-wide stop flag. Set at most once; every clone observes it, including
/// clones that subscribe after it was set.
#[derive(Debug, Clone)]
pub struct StopSignal {
    stopped_tx: Arc<watch::Sender<bool>>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        let (stopped_tx, _) = watch::channel(false);
        Self {
            stopped_tx: Arc::new(stopped_tx),
        }
    }

    /// Sets the flag. Returns `true` only for the call that set it.
    pub fn trigger(&self) -> bool {
        self.stopped_tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.stopped_tx.borrow()
    }

    /// Resolves once the flag is set.
    pub async fn stopped(&self) {
        let mut stopped_rx = self.stopped_tx.subscribe();
        if stopped_rx.wait_for(|stopped| *stopped).await.is_err() {
            // Sender lives in `self`, so the channel cannot close here.
        }
    }
}

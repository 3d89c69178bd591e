//! Cancellation Token
//!
//! Shared stop request for the long-running tasks. Set once by the stop
//! button; every subscriber observes it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{Receiver, Watch};

/// Maximum concurrent subscribers
pub const MAX_SUBSCRIBERS: usize = 4;

/// Broadcast stop request
pub struct CancelToken {
    watch: Watch<CriticalSectionRawMutex, bool, MAX_SUBSCRIBERS>,
}

impl CancelToken {
    /// Create an untriggered token
    #[must_use]
    pub const fn new() -> Self {
        Self {
            watch: Watch::new(),
        }
    }

    /// Request every subscriber to stop
    pub fn cancel(&self) {
        info!("cancellation requested");
        self.watch.sender().send(true);
    }

    /// Subscribe for the stop request
    ///
    /// Returns `None` once all subscriber slots are taken.
    #[must_use]
    pub fn subscribe(&self) -> Option<Cancelled<'_>> {
        self.watch.receiver().map(Cancelled)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription to a [`CancelToken`]
pub struct Cancelled<'a>(Receiver<'a, CriticalSectionRawMutex, bool, MAX_SUBSCRIBERS>);

impl Cancelled<'_> {
    /// Resolve once the token is cancelled
    pub async fn wait(&mut self) {
        self.0.get_and(|cancelled| *cancelled).await;
    }
}

//! "History changed" signal for observers.
//!
//! Built on a watch channel over a generation counter. Observers only learn
//! that something changed, never what. Rapid mutations may coalesce into one
//! wake-up, but the latest change is always delivered.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Signal all subscribers. Call only after the mutation is durable.
    pub fn notify(&self) {
        self.tx.send_modify(|generation| *generation += 1);
        trace!(
            target: "clipstash::events",
            "History changed (generation {}, {} subscribers)",
            *self.tx.borrow(),
            self.tx.receiver_count()
        );
    }

    /// A subscription that sees changes made after this call.
    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of notifications sent so far.
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[derive(Debug)]
pub struct ChangeSubscription {
    rx: watch::Receiver<u64>,
}

impl ChangeSubscription {
    /// Wait for the next change. Returns `false` once the notifier is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

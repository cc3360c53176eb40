//! Watcher ingest task.
//!
//! Clipboard-change signals from any producer are queued on one channel and
//! turned into captures one at a time.

use crate::db::content_hash;
use crate::{MutationGateway, SystemClipboard};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

/// "The system clipboard changed." Carries no content; the gateway re-reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardSignal;

/// Consume signals until every sender is dropped.
pub fn spawn_watcher(
    gateway: Arc<MutationGateway>,
    mut signals: mpsc::Receiver<ClipboardSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(target: "clipstash::watcher", "Clipboard watcher started");

        while signals.recv().await.is_some() {
            let gateway = gateway.clone();
            match tokio::task::spawn_blocking(move || gateway.capture()).await {
                Ok(Ok(Some(item))) => {
                    debug!(
                        target: "clipstash::watcher",
                        "Captured {} item {}",
                        item.content.kind().as_str(),
                        item.timestamp
                    );
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!(target: "clipstash::watcher", "Capture failed: {}", e);
                }
                Err(e) => {
                    error!(target: "clipstash::watcher", "Capture task panicked: {}", e);
                }
            }
        }

        info!(target: "clipstash::watcher", "Clipboard watcher stopped");
    })
}

/// Poll a clipboard that cannot push change events and raise a signal each
/// time its content differs from the previous poll.
///
/// Whatever the clipboard holds at startup is the baseline and is not
/// signalled. Stops when the signal receiver is gone.
pub fn spawn_clipboard_poller(
    clipboard: Arc<dyn SystemClipboard>,
    period: Duration,
    signals: mpsc::Sender<ClipboardSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(target: "clipstash::watcher", "Polling clipboard every {:?}", period);

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<Option<String>> = None;

        loop {
            ticker.tick().await;

            let clipboard = clipboard.clone();
            let seen = match tokio::task::spawn_blocking(move || clipboard.read()).await {
                Ok(Ok(snapshot)) => snapshot.map(|s| content_hash(&s.content)),
                Ok(Err(e)) => {
                    trace!(target: "clipstash::watcher", "Clipboard read failed: {}", e);
                    continue;
                }
                Err(e) => {
                    error!(target: "clipstash::watcher", "Clipboard poll panicked: {}", e);
                    break;
                }
            };

            let changed = last.as_ref().is_some_and(|previous| *previous != seen);
            last = Some(seen);
            if changed && signals.send(ClipboardSignal).await.is_err() {
                break;
            }
        }

        info!(target: "clipstash::watcher", "Clipboard poller stopped");
    })
}

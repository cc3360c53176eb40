//! Mutation gateway: the single entry point for history changes.
//!
//! Destructive commands pass through the [`ConfirmGate`]. Every completed
//! mutation is followed by exactly one change notification; arming is not a
//! mutation and notifies nobody.

use crate::db::content_hash;
use crate::{
    ChangeNotifier, ChangeSubscription, Clock, ClipstashError, ConfirmGate, GateDecision,
    GatedCommand, HistoryStore, Result, SystemClipboard,
};
use clipstash_types::{GateOutcome, Item, ItemContent, SystemData, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long an armed destructive command waits for its confirmation.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_millis(3000);

/// How long after `copy` a capture of the same content counts as its echo.
const ECHO_WINDOW_MS: i64 = 2_000;

/// Content `copy` just wrote to the clipboard.
#[derive(Debug)]
struct PendingEcho {
    hash: String,
    expires_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub confirm_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }
}

pub struct MutationGateway {
    store: Arc<HistoryStore>,
    clipboard: Arc<dyn SystemClipboard>,
    notifier: ChangeNotifier,
    gate: ConfirmGate,
    clock: Arc<dyn Clock>,
    /// The capture triggered by `copy`'s own write is ignored once, if it
    /// arrives before the window closes.
    pending_echo: Mutex<Option<PendingEcho>>,
}

impl MutationGateway {
    pub fn new(
        store: Arc<HistoryStore>,
        clipboard: Arc<dyn SystemClipboard>,
        config: GatewayConfig,
    ) -> Self {
        let clock = store.clock().clone();
        Self {
            store,
            clipboard,
            notifier: ChangeNotifier::new(),
            gate: ConfirmGate::new(config.confirm_timeout),
            clock,
            pending_echo: Mutex::new(None),
        }
    }

    fn pending_echo(&self) -> MutexGuard<'_, Option<PendingEcho>> {
        self.pending_echo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        self.notifier.subscribe()
    }

    /// History newest-first, optionally filtered by a text query.
    pub fn history(&self, query: Option<&str>, limit: Option<usize>) -> Result<Vec<Item>> {
        match query {
            Some(q) => self.store.search(q, limit),
            None => self.store.list_limited(limit),
        }
    }

    pub fn system_data(&self) -> Result<SystemData> {
        self.store.stats()
    }

    /// React to a "clipboard changed" signal by recording what the clipboard
    /// now holds. Returns `None` when nothing was recorded.
    pub fn capture(&self) -> Result<Option<Item>> {
        let Some(snapshot) = self.clipboard.read()? else {
            debug!(target: "clipstash::gateway", "Clipboard holds nothing capturable");
            return Ok(None);
        };

        if self.take_echo(&snapshot.content) {
            debug!(target: "clipstash::gateway", "Ignoring echo of our own clipboard write");
            return Ok(None);
        }

        let insertion = self.store.insert(snapshot.content, snapshot.source_app)?;
        if let Some(old) = insertion.replaced {
            self.gate.forget_item(old);
        }
        self.notifier.notify();
        Ok(Some(insertion.item))
    }

    /// Put an item back on the clipboard and move it to the front under a new
    /// identity, which is returned.
    pub fn copy(&self, timestamp: Timestamp) -> Result<Timestamp> {
        let item = self.store.promote_with(timestamp, |item| {
            *self.pending_echo() = Some(PendingEcho {
                hash: content_hash(&item.content),
                expires_at: self.clock.now().saturating_add_millis(ECHO_WINDOW_MS),
            });
            self.clipboard.write(&item.content).inspect_err(|e| {
                self.pending_echo().take();
                warn!(target: "clipstash::gateway", "Clipboard write for {} failed: {}", timestamp, e);
            })
        })?;

        self.gate.forget_item(timestamp);
        self.notifier.notify();
        info!(
            target: "clipstash::gateway",
            "Copied item {} (now {})", timestamp, item.timestamp
        );
        Ok(item.timestamp)
    }

    /// Confirm-gated single delete. Arming an identity that does not exist
    /// fails with `NotFound` right away.
    pub fn delete_item(&self, timestamp: Timestamp) -> Result<GateOutcome> {
        if !self.store.contains(timestamp)? {
            return Err(ClipstashError::NotFound(timestamp));
        }

        self.gated(GatedCommand::DeleteItem(timestamp), || {
            self.store.delete(timestamp)?;
            info!(target: "clipstash::gateway", "Deleted item {}", timestamp);
            Ok(())
        })
    }

    /// Confirm-gated "clear all".
    pub fn clear(&self) -> Result<GateOutcome> {
        self.gated(GatedCommand::Clear, || {
            let removed = self.store.clear()?;
            info!(target: "clipstash::gateway", "Cleared history ({} items)", removed);
            Ok(())
        })
    }

    /// Confirm-gated removal of items older than `days` days.
    pub fn clean_old_items(&self, days: u32) -> Result<GateOutcome> {
        self.gated(GatedCommand::CleanOld { days }, || {
            let removed = self.store.clean_older_than(days)?;
            info!(
                target: "clipstash::gateway",
                "Cleaned {} items older than {} days", removed, days
            );
            Ok(())
        })
    }

    /// Retention sweep. Not gated; notifies only when something was removed.
    pub fn purge_expired(&self, days: u32) -> Result<usize> {
        let removed = self.store.clean_older_than(days)?;
        if removed > 0 {
            self.notifier.notify();
        }
        Ok(removed)
    }

    /// Consume the pending echo if `content` is it. A different capture
    /// leaves the marker alone; an expired marker is dropped.
    fn take_echo(&self, content: &ItemContent) -> bool {
        let mut echo = self.pending_echo();
        let Some(pending) = echo.as_ref() else {
            return false;
        };
        if self.clock.now() >= pending.expires_at {
            *echo = None;
            return false;
        }
        if pending.hash == content_hash(content) {
            *echo = None;
            return true;
        }
        false
    }

    fn gated<F>(&self, command: GatedCommand, execute: F) -> Result<GateOutcome>
    where
        F: FnOnce() -> Result<()>,
    {
        match self.gate.invoke(command, self.clock.now()) {
            GateDecision::Arm { expires_at } => {
                debug!(
                    target: "clipstash::gateway",
                    "Armed {:?} until {}", command, expires_at
                );
                Ok(GateOutcome::Armed { expires_at })
            }
            GateDecision::Confirm => {
                execute()?;
                self.notifier.notify();
                Ok(GateOutcome::Executed)
            }
        }
    }
}

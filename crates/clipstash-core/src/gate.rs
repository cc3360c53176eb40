//! Two-step "arm, then confirm" protocol for destructive commands.
//!
//! Armed state is a plain value with an expiry instant, checked whenever the
//! next command arrives. Nothing is scheduled, so a timeout can never race an
//! in-flight confirmation.

use clipstash_types::Timestamp;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A destructive command that needs confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedCommand {
    Clear,
    CleanOld { days: u32 },
    DeleteItem(Timestamp),
}

/// Commands in the same slot replace each other; different slots are
/// independent. Each item identity gets its own delete slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Clear,
    CleanOld,
    DeleteItem(Timestamp),
}

impl GatedCommand {
    fn slot(self) -> Slot {
        match self {
            GatedCommand::Clear => Slot::Clear,
            GatedCommand::CleanOld { .. } => Slot::CleanOld,
            GatedCommand::DeleteItem(ts) => Slot::DeleteItem(ts),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    command: GatedCommand,
    expires_at: Timestamp,
}

/// What the caller should do with the command it just invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Nothing happens yet; the same command before `expires_at` confirms.
    Arm { expires_at: Timestamp },
    /// Execute the command now. The slot is back to idle.
    Confirm,
}

#[derive(Debug)]
pub struct ConfirmGate {
    timeout_ms: i64,
    armed: Mutex<HashMap<Slot, Armed>>,
}

impl ConfirmGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout_ms: i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX),
            armed: Mutex::new(HashMap::new()),
        }
    }

    fn armed(&self) -> MutexGuard<'_, HashMap<Slot, Armed>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register one invocation of `command` at `now`.
    ///
    /// Confirms only if the identical command is armed and `now` is strictly
    /// before its expiry. Otherwise (re)arms the slot.
    pub fn invoke(&self, command: GatedCommand, now: Timestamp) -> GateDecision {
        let mut armed = self.armed();
        armed.retain(|_, a| now < a.expires_at);

        let slot = command.slot();
        if armed.get(&slot).is_some_and(|a| a.command == command) {
            armed.remove(&slot);
            return GateDecision::Confirm;
        }

        let expires_at = now.saturating_add_millis(self.timeout_ms);
        armed.insert(
            slot,
            Armed {
                command,
                expires_at,
            },
        );
        GateDecision::Arm { expires_at }
    }

    pub fn is_armed(&self, command: GatedCommand, now: Timestamp) -> bool {
        self.armed()
            .get(&command.slot())
            .is_some_and(|a| a.command == command && now < a.expires_at)
    }

    /// Drop a pending delete for an identity that no longer exists.
    pub fn forget_item(&self, timestamp: Timestamp) {
        self.armed().remove(&Slot::DeleteItem(timestamp));
    }
}

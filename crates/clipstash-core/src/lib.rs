//! Clipboard history store, confirm-gated mutations and change notification.

mod clipboard;
mod clock;
mod db;
mod error;
mod gate;
mod gateway;
mod notifier;
mod watcher;

pub use clipboard::{ArboardClipboard, MemoryClipboard, SystemClipboard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use db::{HistoryStore, Insertion};
pub use error::{ClipstashError, ErrorKind};
pub use gate::{ConfirmGate, GateDecision, GatedCommand};
pub use gateway::{DEFAULT_CONFIRM_TIMEOUT, GatewayConfig, MutationGateway};
pub use notifier::{ChangeNotifier, ChangeSubscription};
pub use watcher::{ClipboardSignal, spawn_clipboard_poller, spawn_watcher};

/// Result type for clipstash operations.
pub type Result<T> = std::result::Result<T, ClipstashError>;

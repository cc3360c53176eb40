//! WebSocket message types.

use serde::{Deserialize, Serialize};

/// Messages pushed to observers on `/ws/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// The history was mutated; re-read it.
    HistoryChanged,
    /// Sent once after the socket is accepted.
    Connected { version: String },
}

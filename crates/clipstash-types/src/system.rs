//! Aggregate storage statistics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Derived view of the persisted history, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemData {
    /// Location of the history database, for "reveal in file manager".
    pub db_path: PathBuf,
    /// Total on-disk size of the history store.
    pub size_bytes: u64,
    /// Number of live items.
    pub item_count: u64,
    /// Sum of the payload sizes of live items.
    pub payload_bytes: u64,
}

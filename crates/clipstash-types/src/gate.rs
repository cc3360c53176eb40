//! Result of invoking a confirm-gated command.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A destructive command either arms (nothing changes yet) or executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateOutcome {
    /// First invocation. Repeating the same command before `expires_at` executes it.
    Armed { expires_at: Timestamp },
    /// Confirmed and applied.
    Executed,
}

impl GateOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, GateOutcome::Executed)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, GateOutcome::Armed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_outcome_wire_format() {
        let armed = GateOutcome::Armed {
            expires_at: Timestamp::from_millis(3100),
        };
        assert_eq!(
            serde_json::to_value(armed).unwrap(),
            serde_json::json!({ "status": "armed", "expires_at": 3100 })
        );
        assert_eq!(
            serde_json::to_value(GateOutcome::Executed).unwrap(),
            serde_json::json!({ "status": "executed" })
        );
    }
}

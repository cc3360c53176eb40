//! Periodic removal of items past the retention window.

use crate::state::AppState;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Start the retention task. Returns `None` when retention is disabled.
///
/// The first purge runs immediately, then once per configured interval.
pub fn spawn_retention_task(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let days = state.config.retention_days;
    if days == 0 {
        info!(target: "clipstash::retention", "Retention disabled");
        return None;
    }

    let period = state.config.retention_interval();
    info!(
        target: "clipstash::retention",
        "Keeping {} days of history (sweep every {:?})", days, period
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let gateway = state.gateway.clone();
            match tokio::task::spawn_blocking(move || gateway.purge_expired(days)).await {
                Ok(Ok(0)) => debug!(target: "clipstash::retention", "Nothing expired"),
                Ok(Ok(removed)) => {
                    info!(target: "clipstash::retention", "Purged {} expired items", removed)
                }
                Ok(Err(e)) => warn!(target: "clipstash::retention", "Purge failed: {}", e),
                Err(e) => {
                    error!(target: "clipstash::retention", "Purge task panicked: {}", e);
                    break;
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClipboardBackend, Config};
    use clipstash_core::{ManualClock, MemoryClipboard};
    use clipstash_types::{ItemContent, MILLIS_PER_DAY};
    use std::time::Duration;
    use tempfile::TempDir;

    fn state_with(dir: &TempDir, retention_days: u32, clock: Arc<ManualClock>) -> Arc<AppState> {
        let config = Config {
            db_path: dir.path().join("clipboard.db"),
            retention_days,
            clipboard: ClipboardBackend::Memory,
            ..Config::default()
        };
        Arc::new(AppState::with_parts(config, clock, Arc::new(MemoryClipboard::new())).unwrap())
    }

    #[tokio::test]
    async fn test_disabled_retention_spawns_nothing() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, 0, Arc::new(ManualClock::new(1_000)));
        assert!(spawn_retention_task(state).is_none());
    }

    #[tokio::test]
    async fn test_first_sweep_purges_expired_items() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(1_000));
        let state = state_with(&dir, 7, clock.clone());
        let store = state.gateway.store().clone();

        store.insert(ItemContent::text("ancient"), None).unwrap();
        clock.advance(8 * MILLIS_PER_DAY);
        store.insert(ItemContent::text("recent"), None).unwrap();

        let mut changes = state.gateway.subscribe();
        let handle = spawn_retention_task(state.clone()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), changes.changed())
            .await
            .unwrap();

        let items = store.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content.as_text(), Some("recent"));

        handle.abort();
    }
}

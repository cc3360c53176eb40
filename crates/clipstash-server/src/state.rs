//! Shared application state.

use crate::config::{ClipboardBackend, Config};
use clipstash_core::{
    spawn_clipboard_poller, spawn_watcher, ArboardClipboard, ClipboardSignal, Clock,
    GatewayConfig, HistoryStore, MemoryClipboard, MutationGateway, SystemClipboard, SystemClock,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Queue depth for clipboard-change signals awaiting capture.
const SIGNAL_QUEUE: usize = 64;

/// Shared application state.
pub struct AppState {
    pub gateway: Arc<MutationGateway>,
    pub clipboard: Arc<dyn SystemClipboard>,
    pub signals: mpsc::Sender<ClipboardSignal>,
    pub config: Config,
}

impl AppState {
    /// Open the store and start capturing from the configured clipboard.
    /// Must run inside a tokio runtime.
    pub fn new(config: Config) -> clipstash_core::Result<Self> {
        let clipboard: Arc<dyn SystemClipboard> = match config.clipboard {
            ClipboardBackend::System => Arc::new(ArboardClipboard::new()),
            ClipboardBackend::Memory => Arc::new(MemoryClipboard::new()),
        };
        Self::with_parts(config, Arc::new(SystemClock), clipboard)
    }

    pub fn with_parts(
        config: Config,
        clock: Arc<dyn Clock>,
        clipboard: Arc<dyn SystemClipboard>,
    ) -> clipstash_core::Result<Self> {
        let store = Arc::new(HistoryStore::open_with_clock(&config.db_path, clock)?);
        let gateway = Arc::new(MutationGateway::new(
            store,
            clipboard.clone(),
            GatewayConfig {
                confirm_timeout: config.confirm_timeout(),
            },
        ));

        let (signals, rx) = mpsc::channel(SIGNAL_QUEUE);
        spawn_watcher(gateway.clone(), rx);
        if config.clipboard == ClipboardBackend::System {
            spawn_clipboard_poller(clipboard.clone(), config.poll_interval(), signals.clone());
        }

        Ok(Self {
            gateway,
            clipboard,
            signals,
            config,
        })
    }

    /// Whether clipboard changes are picked up by polling rather than by
    /// explicit signals.
    pub fn polls_clipboard(&self) -> bool {
        self.config.clipboard == ClipboardBackend::System
    }
}

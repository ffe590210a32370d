use std::{sync::Arc, time::Duration};

use configs::AppConfig;
use service::RecordStore;

/// Dependencies shared by every handler, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub slow_delay: Duration,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>, slow_delay: Duration) -> Self {
        Self { store, slow_delay }
    }

    /// Fresh, empty store with the configured diagnostic delay.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(Arc::new(RecordStore::new()), cfg.slow_delay())
    }
}

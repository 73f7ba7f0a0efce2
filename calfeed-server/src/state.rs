use std::sync::Arc;
use std::time::Duration;

use calfeed_core::{CalfeedConfig, ListenerRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // Built once at startup; dispatch only reads it
    pub registry: Arc<ListenerRegistry>,
    pub dispatch_timeout: Duration,
}

impl AppState {
    pub fn new(registry: ListenerRegistry, dispatch_timeout: Duration) -> Self {
        AppState {
            registry: Arc::new(registry),
            dispatch_timeout,
        }
    }

    pub fn from_config(config: &CalfeedConfig) -> anyhow::Result<Self> {
        let registry = config.build_registry()?;
        Ok(AppState::new(
            registry,
            Duration::from_secs(config.dispatch.timeout_secs),
        ))
    }
}

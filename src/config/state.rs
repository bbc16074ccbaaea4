// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::calc::OperationTable;

/// Application state
pub struct AppState {
    pub config: Config,
    pub operations: OperationTable,
    /// Fired once when the process should stop accepting connections
    pub shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            operations: OperationTable::standard(),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config as LoadedConfig;

    fn defaults() -> LoadedConfig {
        LoadedConfig::load_from("does-not-exist/calc-state-config", false, None).unwrap()
    }

    #[test]
    fn test_access_log_follows_config() {
        let mut config = defaults();
        config.logging.access_log = true;
        assert!(AppState::new(&config).access_log_enabled());

        config.logging.access_log = false;
        assert!(!AppState::new(&config).access_log_enabled());
    }

    #[test]
    fn test_standard_operations() {
        let state = AppState::new(&defaults());
        assert_eq!(state.operations.symbols(), vec!["*", "+", "-", "/"]);
    }
}

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;

/// Shared handler state. Everything request handling needs is reachable from
/// here; there is no other mutable global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }
}

use std::sync::Arc;

use crate::config::Config;
use crate::gateway::Gateway;

/// Shared by every worker. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub salt: String,
    pub token_ttl: Option<chrono::Duration>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            gateway,
            salt: config.salt.clone(),
            token_ttl: config.token_ttl,
        }
    }
}

use std::sync::Arc;

use crate::auth::{JwtError, JwtKeys};
use crate::config::AppConfig;
use crate::database::Store;

/// Shared, read-only handles every handler gets through `State`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: Arc<JwtKeys>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Result<Self, JwtError> {
        let jwt = JwtKeys::from_config(&config.security)?;
        Ok(Self {
            store,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        })
    }
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::auth::{AuthProvider, GoTrueClient, MemoryAuthProvider, SessionResolver};
use crate::config::AppConfig;
use crate::store::Store;

/// Everything a request handler needs. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: Arc<SessionResolver>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store, auth: Arc<dyn AuthProvider>) -> Self {
        let timeout = Duration::from_millis(config.api.auth_timeout_ms);
        let sessions = SessionResolver::new(auth.clone(), store.clone(), timeout)
            .with_jwt_secret(config.store.jwt_secret.clone());
        Self { config: Arc::new(config), store, auth, sessions: Arc::new(sessions) }
    }

    /// Connect the configured back ends: in-process stores in mock-data mode,
    /// the hosted data and auth APIs otherwise.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = Store::from_config(&config).await.context("failed to initialize record store")?;

        let auth: Arc<dyn AuthProvider> = if config.store.use_mock_data {
            info!("Mock-data mode: sign-in codes are not exchanged");
            Arc::new(MemoryAuthProvider::new())
        } else {
            let timeout = Duration::from_secs(config.store.request_timeout_secs);
            let client = GoTrueClient::new(&config.store.url, config.store.anon_key.clone(), timeout)
                .context("failed to initialize auth client")?;
            Arc::new(client)
        };

        Ok(Self::new(config, store, auth))
    }
}

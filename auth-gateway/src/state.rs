use crate::config::GatewayConfig;
use auth_identity::{build_strategy, AuthStrategy, SessionRepository, UserRepository};
use std::sync::Arc;

/// Shared state handed to the middleware and every handler.
#[derive(Clone)]
pub struct GatewayState {
    /// `None` when `AUTH_TYPE` is unset and nothing is gated
    pub auth: Option<Arc<dyn AuthStrategy>>,
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<GatewayConfig>,
}

impl GatewayState {
    pub fn new(
        config: GatewayConfig,
        users: Arc<dyn UserRepository>,
        auth: Option<Arc<dyn AuthStrategy>>,
    ) -> Self {
        Self {
            auth,
            users,
            config: Arc::new(config),
        }
    }

    /// Select the strategy named by the configuration.
    pub fn from_config(
        config: GatewayConfig,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        let auth = build_strategy(&config.auth, users.clone(), sessions);
        Self::new(config, users, auth)
    }
}

use crate::error::Result;
use auth_identity::{AuthConfig, IdentityError};
use std::time::Duration;

pub const EXCLUDED_PATHS_VAR: &str = "EXCLUDED_PATHS";
pub const SESSION_SWEEP_INTERVAL_VAR: &str = "SESSION_SWEEP_INTERVAL";
pub const API_HOST_VAR: &str = "API_HOST";
pub const API_PORT_VAR: &str = "API_PORT";
pub const CORS_ORIGINS_VAR: &str = "CORS_ORIGINS";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Paths reachable without credentials unless overridden.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    "/api/v1/status/",
    "/api/v1/unauthorized/",
    "/api/v1/forbidden/",
    "/api/v1/auth_session/login/",
];

/// Request pipeline settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub excluded_paths: Vec<String>,
    /// `None` disables the background expiry sweep
    pub sweep_interval: Option<Duration>,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            excluded_paths: DEFAULT_EXCLUDED_PATHS.iter().map(|p| (*p).to_string()).collect(),
            sweep_interval: None,
            cors_origins: vec!["*".to_string()],
            auth: AuthConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Fails on an unknown `AUTH_TYPE` or a port that is not a valid `u16`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let auth = AuthConfig::from_lookup(&lookup)?;

        let port = match lookup(API_PORT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                IdentityError::Configuration(format!("invalid {API_PORT_VAR} '{raw}'"))
            })?,
            None => defaults.port,
        };

        let excluded_paths = lookup(EXCLUDED_PATHS_VAR)
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.excluded_paths);

        let cors_origins = lookup(CORS_ORIGINS_VAR)
            .map(|raw| split_list(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        let sweep_interval = lookup(SESSION_SWEEP_INTERVAL_VAR)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            host: lookup(API_HOST_VAR)
                .filter(|host| !host.trim().is_empty())
                .unwrap_or(defaults.host),
            port,
            excluded_paths,
            sweep_interval,
            cors_origins,
            auth,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

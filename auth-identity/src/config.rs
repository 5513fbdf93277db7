use crate::error::{IdentityError, Result};
use std::fmt;
use std::str::FromStr;

pub const AUTH_TYPE_VAR: &str = "AUTH_TYPE";
pub const SESSION_NAME_VAR: &str = "SESSION_NAME";
pub const SESSION_DURATION_VAR: &str = "SESSION_DURATION";

/// Which authentication strategy the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// Gate every protected route but never resolve a user
    Null,
    BasicAuth,
    SessionAuth,
    SessionExpAuth,
    SessionDbAuth,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Null => "auth",
            AuthType::BasicAuth => "basic_auth",
            AuthType::SessionAuth => "session_auth",
            AuthType::SessionExpAuth => "session_exp_auth",
            AuthType::SessionDbAuth => "session_db_auth",
        }
    }

    /// Whether the strategy issues session cookies.
    pub fn uses_sessions(&self) -> bool {
        matches!(
            self,
            AuthType::SessionAuth | AuthType::SessionExpAuth | AuthType::SessionDbAuth
        )
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "auth" => Ok(AuthType::Null),
            "basic_auth" => Ok(AuthType::BasicAuth),
            "session_auth" => Ok(AuthType::SessionAuth),
            "session_exp_auth" => Ok(AuthType::SessionExpAuth),
            "session_db_auth" => Ok(AuthType::SessionDbAuth),
            other => Err(IdentityError::Configuration(format!(
                "unknown {AUTH_TYPE_VAR} '{other}'"
            ))),
        }
    }
}

/// Session lifetime in seconds. Zero means sessions never expire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionDuration(u64);

impl SessionDuration {
    pub const NEVER: SessionDuration = SessionDuration(0);

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Parse a raw setting. Missing, non-numeric and negative input all
    /// collapse to [`SessionDuration::NEVER`] instead of failing startup.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .and_then(|secs| u64::try_from(secs).ok())
            .map_or(Self::NEVER, Self)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn expires(&self) -> bool {
        self.0 > 0
    }

    /// `None` when the duration does not fit chrono's range.
    pub fn as_chrono(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_seconds(i64::try_from(self.0).ok()?)
    }
}

/// Settings consumed by the authentication core.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// `None` disables request gating entirely
    pub auth_type: Option<AuthType>,
    pub session_name: Option<String>,
    pub session_duration: SessionDuration,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Fails only when `AUTH_TYPE` names an unknown strategy.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_type = lookup(AUTH_TYPE_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<AuthType>())
            .transpose()?;

        let session_name = lookup(SESSION_NAME_VAR).filter(|name| !name.is_empty());
        let session_duration =
            SessionDuration::parse_lenient(lookup(SESSION_DURATION_VAR).as_deref());

        Ok(Self {
            auth_type,
            session_name,
            session_duration,
        })
    }

    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = Some(auth_type);
        self
    }

    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    pub fn with_session_duration(mut self, duration: SessionDuration) -> Self {
        self.session_duration = duration;
        self
    }
}

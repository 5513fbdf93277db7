//! Authentication strategies
//!
//! One strategy is chosen at startup from [`AuthConfig`] and then used
//! through `Arc<dyn AuthStrategy>` for the life of the process. Every
//! method answers with absence rather than an error when authentication
//! does not succeed.

use crate::basic::{credentials_from_header, user_object_from_credentials};
use crate::config::{AuthConfig, AuthType, SessionDuration};
use crate::credentials::{self, AuthRequest};
use crate::error::Result;
use crate::models::User;
use crate::repository::{SessionRepository, UserRepository};
use crate::session::{InMemorySessionStore, PersistentSessionStore, SessionStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn auth_type(&self) -> AuthType;

    /// Name of the session cookie, when one is configured.
    fn session_name(&self) -> Option<&str>;

    fn require_auth(&self, path: &str, excluded_paths: &[String]) -> bool {
        crate::path::require_auth(path, excluded_paths)
    }

    fn authorization_header(&self, request: Option<&dyn AuthRequest>) -> Option<String> {
        credentials::authorization_header(request)
    }

    fn session_cookie(&self, request: Option<&dyn AuthRequest>) -> Option<String> {
        credentials::session_cookie(request, self.session_name())
    }

    /// The user the request authenticates as.
    async fn current_user(&self, _request: Option<&dyn AuthRequest>) -> Option<User> {
        None
    }

    /// Issue a session for `user_id`. Strategies without sessions return
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates a failed durable write from a persistent session store.
    async fn create_session(&self, _user_id: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// End the session named by the request's cookie.
    async fn destroy_session(&self, _request: Option<&dyn AuthRequest>) -> bool {
        false
    }

    /// Drop expired sessions; zero for strategies without sessions.
    async fn purge_expired(&self) -> usize {
        0
    }
}

/// Gates protected routes but never recognises anyone.
#[derive(Debug, Clone, Default)]
pub struct NullAuth {
    session_name: Option<String>,
}

impl NullAuth {
    pub fn new(session_name: Option<String>) -> Self {
        Self { session_name }
    }
}

#[async_trait]
impl AuthStrategy for NullAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::Null
    }

    fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }
}

/// HTTP Basic authentication against the user store.
pub struct BasicAuth {
    users: Arc<dyn UserRepository>,
    session_name: Option<String>,
}

impl BasicAuth {
    pub fn new(users: Arc<dyn UserRepository>, session_name: Option<String>) -> Self {
        Self { users, session_name }
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::BasicAuth
    }

    fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    async fn current_user(&self, request: Option<&dyn AuthRequest>) -> Option<User> {
        let header = self.authorization_header(request)?;
        let credentials = credentials_from_header(&header)?;
        user_object_from_credentials(
            self.users.as_ref(),
            &credentials.username,
            &credentials.password,
        )
        .await
    }
}

/// Cookie-backed sessions over any [`SessionStore`].
pub struct SessionAuth<S = InMemorySessionStore> {
    store: S,
    users: Arc<dyn UserRepository>,
    session_name: Option<String>,
    auth_type: AuthType,
}

/// In-memory sessions that expire after the configured duration.
pub type ExpiringSessionAuth = SessionAuth<InMemorySessionStore>;

/// Sessions stored as durable records.
pub type PersistentSessionAuth = SessionAuth<PersistentSessionStore>;

impl SessionAuth<InMemorySessionStore> {
    /// In-memory sessions that never expire.
    pub fn new(users: Arc<dyn UserRepository>, session_name: Option<String>) -> Self {
        Self::with_store(
            InMemorySessionStore::new(),
            users,
            session_name,
            AuthType::SessionAuth,
        )
    }

    pub fn expiring(
        users: Arc<dyn UserRepository>,
        session_name: Option<String>,
        duration: SessionDuration,
    ) -> Self {
        Self::with_store(
            InMemorySessionStore::with_duration(duration),
            users,
            session_name,
            AuthType::SessionExpAuth,
        )
    }
}

impl SessionAuth<PersistentSessionStore> {
    pub fn persistent(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        session_name: Option<String>,
        duration: SessionDuration,
    ) -> Self {
        Self::with_store(
            PersistentSessionStore::new(sessions, duration),
            users,
            session_name,
            AuthType::SessionDbAuth,
        )
    }
}

impl<S: SessionStore> SessionAuth<S> {
    pub fn with_store(
        store: S,
        users: Arc<dyn UserRepository>,
        session_name: Option<String>,
        auth_type: AuthType,
    ) -> Self {
        Self {
            store,
            users,
            session_name,
            auth_type,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session_duration(&self) -> SessionDuration {
        self.store.session_duration()
    }

    pub async fn user_id_for_session_id(&self, session_id: &str) -> Option<String> {
        self.store.user_id_for_session_id(session_id).await
    }

    async fn load_user(&self, user_id: &str) -> Option<User> {
        match self.users.get(user_id).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User lookup failed during session authentication");
                None
            }
        }
    }
}

#[async_trait]
impl<S: SessionStore> AuthStrategy for SessionAuth<S> {
    fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    async fn current_user(&self, request: Option<&dyn AuthRequest>) -> Option<User> {
        let session_id = self.session_cookie(request)?;
        let user_id = self.store.user_id_for_session_id(&session_id).await?;
        let user = self.load_user(&user_id).await;
        if user.is_none() {
            debug!(user_id = %user_id, "Session refers to an unknown user");
        }
        user
    }

    async fn create_session(&self, user_id: &str) -> Result<Option<String>> {
        self.store.create_session(user_id).await
    }

    async fn destroy_session(&self, request: Option<&dyn AuthRequest>) -> bool {
        let Some(session_id) = self.session_cookie(request) else {
            return false;
        };
        self.store.destroy_session(&session_id).await
    }

    async fn purge_expired(&self) -> usize {
        self.store.purge_expired().await
    }
}

/// Build the strategy named by `config.auth_type`. `None` means requests
/// are not gated at all.
pub fn build_strategy(
    config: &AuthConfig,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
) -> Option<Arc<dyn AuthStrategy>> {
    let auth_type = config.auth_type?;
    let session_name = config.session_name.clone();
    let duration = config.session_duration;

    let strategy: Arc<dyn AuthStrategy> = match auth_type {
        AuthType::Null => Arc::new(NullAuth::new(session_name)),
        AuthType::BasicAuth => Arc::new(BasicAuth::new(users, session_name)),
        AuthType::SessionAuth => Arc::new(SessionAuth::new(users, session_name)),
        AuthType::SessionExpAuth => {
            Arc::new(SessionAuth::expiring(users, session_name, duration))
        }
        AuthType::SessionDbAuth => Arc::new(SessionAuth::persistent(
            users,
            sessions,
            session_name,
            duration,
        )),
    };

    info!(
        auth_type = %auth_type,
        session_duration_secs = duration.as_secs(),
        "Authentication strategy selected"
    );
    Some(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticRequest;
    use crate::error::IdentityError;
    use crate::repository::{InMemorySessionRepository, InMemoryUserRepository, SearchFilter};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const COOKIE: &str = "_my_session_id";

    struct FailingUsers {
        fail: fn() -> IdentityError,
    }

    #[async_trait]
    impl UserRepository for FailingUsers {
        async fn search(&self, _filter: &SearchFilter) -> Result<Vec<User>> {
            Err((self.fail)())
        }

        async fn get(&self, _id: &str) -> Result<Option<User>> {
            Err((self.fail)())
        }

        async fn save(&self, _user: &User) -> Result<()> {
            Err((self.fail)())
        }

        async fn remove(&self, _user: &User) -> Result<()> {
            Err((self.fail)())
        }

        async fn count(&self) -> Result<usize> {
            Err((self.fail)())
        }
    }

    async fn users_with_bob() -> (Arc<InMemoryUserRepository>, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let bob = User::new("bob@hbtn.io", "H0lbertonSchool98!").unwrap();
        users.save(&bob).await.unwrap();
        (users, bob)
    }

    fn basic(user: &str, pass: &str) -> StaticRequest {
        StaticRequest::new().with_header(
            "Authorization",
            format!("Basic {}", STANDARD.encode(format!("{user}:{pass}"))),
        )
    }

    #[tokio::test]
    async fn test_null_auth_never_resolves_a_user() {
        let auth = NullAuth::new(Some(COOKIE.to_string()));
        let request = basic("bob@hbtn.io", "H0lbertonSchool98!");

        assert_eq!(auth.auth_type(), AuthType::Null);
        assert!(auth.current_user(Some(&request)).await.is_none());
        assert_eq!(auth.create_session("42").await.unwrap(), None);
        assert!(!auth.destroy_session(Some(&request)).await);
    }

    #[tokio::test]
    async fn test_basic_auth_current_user() {
        let (users, bob) = users_with_bob().await;
        let auth = BasicAuth::new(users, None);

        let ok = basic("bob@hbtn.io", "H0lbertonSchool98!");
        assert_eq!(auth.current_user(Some(&ok)).await.map(|u| u.id), Some(bob.id));

        let wrong_password = basic("bob@hbtn.io", "nope");
        assert!(auth.current_user(Some(&wrong_password)).await.is_none());

        let unknown = basic("alice@hbtn.io", "H0lbertonSchool98!");
        assert!(auth.current_user(Some(&unknown)).await.is_none());

        let malformed = StaticRequest::new().with_header("Authorization", "Basic %%%");
        assert!(auth.current_user(Some(&malformed)).await.is_none());

        assert!(auth.current_user(None).await.is_none());
        assert_eq!(auth.create_session(&bob.email).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_auth_lifecycle() {
        let (users, bob) = users_with_bob().await;
        let auth = SessionAuth::new(users, Some(COOKIE.to_string()));

        let session_id = auth.create_session(&bob.id).await.unwrap().unwrap();
        assert_eq!(auth.user_id_for_session_id(&session_id).await, Some(bob.id.clone()));

        let request = StaticRequest::new().with_cookie(COOKIE, session_id.clone());
        assert_eq!(auth.current_user(Some(&request)).await.map(|u| u.id), Some(bob.id));

        assert!(auth.destroy_session(Some(&request)).await);
        assert!(!auth.destroy_session(Some(&request)).await);
        assert!(auth.current_user(Some(&request)).await.is_none());
    }

    #[tokio::test]
    async fn test_session_auth_destroy_edge_cases() {
        let (users, _) = users_with_bob().await;
        let auth = SessionAuth::new(users, Some(COOKIE.to_string()));

        assert!(!auth.destroy_session(None).await);
        assert!(!auth.destroy_session(Some(&StaticRequest::new())).await);
        let stale = StaticRequest::new().with_cookie(COOKIE, "not-a-session");
        assert!(!auth.destroy_session(Some(&stale)).await);
    }

    #[tokio::test]
    async fn test_session_for_deleted_user_is_absent() {
        let (users, bob) = users_with_bob().await;
        let auth = SessionAuth::new(users.clone(), Some(COOKIE.to_string()));

        let session_id = auth.create_session(&bob.id).await.unwrap().unwrap();
        users.remove(&bob).await.unwrap();

        let request = StaticRequest::new().with_cookie(COOKIE, session_id);
        assert!(auth.current_user(Some(&request)).await.is_none());
    }

    #[tokio::test]
    async fn test_user_store_failures_resolve_to_no_user() {
        let failures: [fn() -> IdentityError; 2] = [
            || IdentityError::NotFound,
            || IdentityError::Storage("offline".to_string()),
        ];

        for fail in failures {
            let users: Arc<dyn UserRepository> = Arc::new(FailingUsers { fail });

            let sessions = SessionAuth::new(users.clone(), Some(COOKIE.to_string()));
            let session_id = sessions.create_session("42").await.unwrap().unwrap();
            let request = StaticRequest::new().with_cookie(COOKIE, session_id);
            assert!(sessions.current_user(Some(&request)).await.is_none());

            let basic_auth = BasicAuth::new(users, None);
            let request = basic("bob@hbtn.io", "H0lbertonSchool98!");
            assert!(basic_auth.current_user(Some(&request)).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_build_strategy_selects_variant() {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());

        assert!(build_strategy(&AuthConfig::default(), users.clone(), sessions.clone()).is_none());

        for kind in [
            AuthType::Null,
            AuthType::BasicAuth,
            AuthType::SessionAuth,
            AuthType::SessionExpAuth,
            AuthType::SessionDbAuth,
        ] {
            let config = AuthConfig::default()
                .with_auth_type(kind)
                .with_session_name(COOKIE);
            let strategy = build_strategy(&config, users.clone(), sessions.clone()).unwrap();
            assert_eq!(strategy.auth_type(), kind);
            assert_eq!(strategy.session_name(), Some(COOKIE));
        }
    }

    #[test]
    fn test_require_auth_delegates_to_path_rules() {
        let auth = NullAuth::default();
        let excluded = vec!["/api/v1/status/".to_string()];
        assert!(!auth.require_auth("/api/v1/status", &excluded));
        assert!(auth.require_auth("/api/v1/users", &excluded));
    }
}

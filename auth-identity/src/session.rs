//! Session stores
//!
//! Map opaque session identifiers to user identifiers. Two backends exist:
//! an in-process concurrent map and a durable record store. Expiry is
//! checked lazily at read time; nothing is purged unless
//! [`SessionStore::purge_expired`] is called.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionDuration;
use crate::error::{IdentityError, Result};
use crate::models::UserSession;
use crate::repository::{SearchFilter, SessionRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Shared contract of every session backend.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a new session for `user_id`.
    ///
    /// Returns `Ok(None)` for an empty user id.
    ///
    /// # Errors
    ///
    /// Backends that persist sessions fail when the write fails; no
    /// session id is handed out in that case.
    async fn create_session(&self, user_id: &str) -> Result<Option<String>>;

    /// The user owning a live session, if any.
    async fn user_id_for_session_id(&self, session_id: &str) -> Option<String>;

    /// Remove a live session. True only when this call removed it.
    async fn destroy_session(&self, session_id: &str) -> bool;

    /// Drop every expired session, returning how many were removed.
    async fn purge_expired(&self) -> usize;

    fn session_duration(&self) -> SessionDuration;
}

/// Fresh session identifier from a cryptographically strong source.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Leading characters of a session id, safe to log.
pub fn short_id(session_id: &str) -> &str {
    session_id.get(..8).unwrap_or(session_id)
}

fn is_expired(duration: SessionDuration, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if !duration.expires() {
        return false;
    }
    // a deadline past the representable range never arrives
    duration
        .as_chrono()
        .and_then(|lifetime| created_at.checked_add_signed(lifetime))
        .is_some_and(|deadline| now > deadline)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Process-local session map, safe for concurrent use from every request
/// handler.
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionEntry>,
    duration: SessionDuration,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Sessions that never expire
    pub fn new() -> Self {
        Self::with_duration(SessionDuration::NEVER)
    }

    pub fn with_duration(duration: SessionDuration) -> Self {
        Self::with_clock(duration, Arc::new(SystemClock))
    }

    pub fn with_clock(duration: SessionDuration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            duration,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn entry(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self))]
    async fn create_session(&self, user_id: &str) -> Result<Option<String>> {
        if user_id.is_empty() {
            return Ok(None);
        }

        let session_id = generate_session_id();
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                user_id: user_id.to_string(),
                created_at: self.clock.now(),
            },
        );

        info!(session = short_id(&session_id), "Session created");
        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<String> {
        if session_id.is_empty() {
            return None;
        }

        let entry = self.sessions.get(session_id)?;
        if is_expired(self.duration, entry.created_at, self.clock.now()) {
            debug!(session = short_id(session_id), "Session expired");
            return None;
        }
        Some(entry.user_id.clone())
    }

    #[instrument(skip_all, fields(session = short_id(session_id)))]
    async fn destroy_session(&self, session_id: &str) -> bool {
        if session_id.is_empty() {
            return false;
        }

        let now = self.clock.now();
        let removed = self
            .sessions
            .remove_if(session_id, |_, entry| {
                !is_expired(self.duration, entry.created_at, now)
            })
            .is_some();

        if removed {
            info!("Session destroyed");
        }
        removed
    }

    async fn purge_expired(&self) -> usize {
        if !self.duration.expires() {
            return 0;
        }

        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| !is_expired(self.duration, entry.created_at, now));
        let purged = before.saturating_sub(self.sessions.len());

        if purged > 0 {
            info!(purged, "Purged expired sessions");
        }
        purged
    }

    fn session_duration(&self) -> SessionDuration {
        self.duration
    }
}

/// Sessions kept as records in a durable [`SessionRepository`]. The
/// repository is the only source of truth; nothing is cached in memory.
pub struct PersistentSessionStore {
    repository: Arc<dyn SessionRepository>,
    duration: SessionDuration,
    clock: Arc<dyn Clock>,
}

impl PersistentSessionStore {
    pub fn new(repository: Arc<dyn SessionRepository>, duration: SessionDuration) -> Self {
        Self::with_clock(repository, duration, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<dyn SessionRepository>,
        duration: SessionDuration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            duration,
            clock,
        }
    }

    /// First durable record for `session_id`. Store failures count as a miss.
    async fn find_record(&self, session_id: &str) -> Option<UserSession> {
        if session_id.is_empty() {
            return None;
        }

        match self
            .repository
            .search(&SearchFilter::eq("session_id", session_id))
            .await
        {
            Ok(records) => records.into_iter().next(),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(session = short_id(session_id), error = %e, "Session lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl SessionStore for PersistentSessionStore {
    #[instrument(skip(self))]
    async fn create_session(&self, user_id: &str) -> Result<Option<String>> {
        if user_id.is_empty() {
            return Ok(None);
        }

        let session_id = generate_session_id();
        let record = UserSession::new(session_id.clone(), user_id, self.clock.now());

        if let Err(e) = self.repository.save(&record).await {
            error!(error = %e, "Failed to persist session");
            return Err(IdentityError::Storage(format!("failed to persist session: {e}")));
        }

        info!(session = short_id(&session_id), "Persistent session created");
        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<String> {
        let record = self.find_record(session_id).await?;
        if is_expired(self.duration, record.created_at, self.clock.now()) {
            debug!(session = short_id(session_id), "Persistent session expired");
            return None;
        }
        Some(record.user_id)
    }

    #[instrument(skip_all, fields(session = short_id(session_id)))]
    async fn destroy_session(&self, session_id: &str) -> bool {
        if self.user_id_for_session_id(session_id).await.is_none() {
            return false;
        }
        let Some(record) = self.find_record(session_id).await else {
            return false;
        };

        match self.repository.remove(&record).await {
            Ok(()) => {
                info!("Persistent session destroyed");
                true
            }
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                warn!(error = %e, "Failed to remove persistent session");
                false
            }
        }
    }

    async fn purge_expired(&self) -> usize {
        if !self.duration.expires() {
            return 0;
        }

        let records = match self.repository.search(&SearchFilter::all()).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Failed to list sessions for purge");
                return 0;
            }
        };

        let now = self.clock.now();
        let mut purged = 0;
        for record in records
            .iter()
            .filter(|record| is_expired(self.duration, record.created_at, now))
        {
            if self.repository.remove(record).await.is_ok() {
                purged += 1;
            }
        }

        if purged > 0 {
            info!(purged, "Purged expired persistent sessions");
        }
        purged
    }

    fn session_duration(&self) -> SessionDuration {
        self.duration
    }
}

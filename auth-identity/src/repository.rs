use crate::{error::*, models::*};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Equality filter over named record fields. An empty filter matches
/// every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    fields: BTreeMap<String, String>,
}

impl SearchFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::default().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Match against the JSON form of a record.
    pub fn matches<T: Serialize>(&self, record: &T) -> bool {
        if self.fields.is_empty() {
            return true;
        }
        let Ok(value) = serde_json::to_value(record) else {
            return false;
        };
        self.fields.iter().all(|(field, expected)| {
            value.get(field).and_then(serde_json::Value::as_str) == Some(expected.as_str())
        })
    }
}

/// Store of user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Records matching `filter`, in insertion order. Implementations may
    /// raise [`IdentityError::NotFound`] instead of returning an empty list.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<User>>;
    async fn get(&self, id: &str) -> Result<Option<User>>;
    async fn save(&self, user: &User) -> Result<()>;
    async fn remove(&self, user: &User) -> Result<()>;
    async fn count(&self) -> Result<usize>;
}

/// Durable store of session records.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<UserSession>>;
    async fn save(&self, session: &UserSession) -> Result<()>;
    async fn remove(&self, session: &UserSession) -> Result<()>;
}

/// Insertion-ordered concurrent table shared by the in-memory repositories.
struct OrderedTable<T> {
    rows: DashMap<String, (u64, T)>,
    next_seq: AtomicU64,
}

impl<T: Clone + Serialize> OrderedTable<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    fn upsert(&self, key: &str, value: T) {
        match self.rows.entry(key.to_string()) {
            Entry::Occupied(mut row) => row.get_mut().1 = value,
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, value));
            }
        }
    }

    fn search(&self, filter: &SearchFilter) -> Vec<T> {
        let mut hits: Vec<(u64, T)> = self
            .rows
            .iter()
            .filter(|entry| filter.matches(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, value)| value).collect()
    }

    fn get(&self, key: &str) -> Option<T> {
        self.rows.get(key).map(|row| row.1.clone())
    }

    fn remove(&self, key: &str) -> bool {
        self.rows.remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// In-memory user repository for development and testing
pub struct InMemoryUserRepository {
    users: Arc<OrderedTable<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(OrderedTable::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<User>> {
        Ok(self.users.search(filter))
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.get(id))
    }

    async fn save(&self, user: &User) -> Result<()> {
        if user.id.is_empty() {
            return Err(IdentityError::InvalidRecord("user id is required".to_string()));
        }
        self.users.upsert(&user.id, user.clone());
        Ok(())
    }

    async fn remove(&self, user: &User) -> Result<()> {
        if self.users.remove(&user.id) {
            Ok(())
        } else {
            Err(IdentityError::NotFound)
        }
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.len())
    }
}

/// In-memory session record repository for development and testing
pub struct InMemorySessionRepository {
    sessions: Arc<OrderedTable<UserSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(OrderedTable::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.len() == 0
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<UserSession>> {
        Ok(self.sessions.search(filter))
    }

    async fn save(&self, session: &UserSession) -> Result<()> {
        if session.id.is_empty() {
            return Err(IdentityError::InvalidRecord("session record id is required".to_string()));
        }
        self.sessions.upsert(&session.id, session.clone());
        Ok(())
    }

    async fn remove(&self, session: &UserSession) -> Result<()> {
        if self.sessions.remove(&session.id) {
            Ok(())
        } else {
            Err(IdentityError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_in_memory_user_repository() {
        let repo = InMemoryUserRepository::new();
        let bob = User::new("bob@hbtn.io", "pwd").unwrap();
        let alice = User::new("alice@hbtn.io", "pwd").unwrap();

        repo.save(&bob).await.unwrap();
        repo.save(&alice).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        let found = repo.search(&SearchFilter::eq("email", "alice@hbtn.io")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, alice.id);

        assert_eq!(repo.get(&bob.id).await.unwrap(), Some(bob.clone()));
        assert!(repo.get("missing").await.unwrap().is_none());

        repo.remove(&bob).await.unwrap();
        assert!(matches!(repo.remove(&bob).await, Err(IdentityError::NotFound)));
    }

    #[tokio::test]
    async fn test_search_keeps_insertion_order() {
        let repo = InMemorySessionRepository::new();
        let now = Utc::now();
        for sid in ["s1", "s2", "s3"] {
            repo.save(&UserSession::new(sid, "42", now)).await.unwrap();
        }

        let all = repo.search(&SearchFilter::all()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);

        let by_user = repo
            .search(&SearchFilter::eq("user_id", "42").and("session_id", "s2"))
            .await
            .unwrap();
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].session_id, "s2");
    }

    #[test]
    fn test_filter_ignores_non_string_fields() {
        let session = UserSession::new("abc", "42", Utc::now());
        assert!(SearchFilter::all().matches(&session));
        assert!(SearchFilter::eq("session_id", "abc").matches(&session));
        assert!(!SearchFilter::eq("session_id", "abd").matches(&session));
        assert!(!SearchFilter::eq("unknown", "abc").matches(&session));
    }
}

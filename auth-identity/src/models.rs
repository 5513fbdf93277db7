use crate::error::{IdentityError, Result};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record as kept by a [`crate::repository::UserRepository`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidRecord`] for an empty email and
    /// [`IdentityError::Hashing`] if the hasher fails.
    pub fn new(email: impl Into<String>, password: &str) -> Result<Self> {
        let email = email.into();
        if email.is_empty() {
            return Err(IdentityError::InvalidRecord("email is required".to_string()));
        }

        let now = Utc::now();
        let mut user = Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: None,
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        };
        user.set_password(password)?;
        Ok(user)
    }

    pub fn with_name(mut self, first_name: Option<&str>, last_name: Option<&str>) -> Self {
        self.first_name = first_name.map(str::to_string);
        self.last_name = last_name.map(str::to_string);
        self
    }

    pub fn set_password(&mut self, password: &str) -> Result<()> {
        if password.is_empty() {
            self.password_hash = None;
            return Ok(());
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| IdentityError::Hashing)?
            .to_string();
        self.password_hash = Some(hash);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check a plaintext password against the stored hash.
    ///
    /// A user without a password, or with a hash that cannot be parsed,
    /// never validates.
    pub fn is_valid_password(&self, password: &str) -> bool {
        let Some(stored) = self.password_hash.as_deref() else {
            return false;
        };
        if password.is_empty() {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (None, None) => self.email.clone(),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (Some(first), Some(last)) => format!("{first} {last}"),
        }
    }

    /// Serializable view of the user. The password hash is never included.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Durable record backing a persisted session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSession {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let session_id = session_id.into();
        Self {
            id: session_id.clone(),
            session_id,
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

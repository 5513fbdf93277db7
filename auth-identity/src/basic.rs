//! HTTP Basic credential decoding.
//!
//! Every stage returns `None` on bad input; nothing here raises for a
//! malformed header.

use crate::models::User;
use crate::repository::{SearchFilter, UserRepository};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

pub const BASIC_PREFIX: &str = "Basic ";

/// A decoded `username:password` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The token following `"Basic "` in an Authorization header value.
pub fn extract_base64_authorization_header(header: &str) -> Option<&str> {
    header.strip_prefix(BASIC_PREFIX)
}

/// Decode a standard base64 token into UTF-8 text.
pub fn decode_base64_authorization_header(token: &str) -> Option<String> {
    if token.is_empty() {
        return None;
    }
    let bytes = STANDARD.decode(token.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split decoded text on its first colon. The password keeps any further
/// colons.
pub fn extract_user_credentials(decoded: &str) -> Option<Credentials> {
    let (username, password) = decoded.split_once(':')?;
    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Full header-to-credentials pipeline.
pub fn credentials_from_header(header: &str) -> Option<Credentials> {
    let token = extract_base64_authorization_header(header)?;
    let decoded = decode_base64_authorization_header(token)?;
    extract_user_credentials(&decoded)
}

/// Resolve the user whose email is `email`, provided `password` verifies.
pub async fn user_object_from_credentials(
    users: &dyn UserRepository,
    email: &str,
    password: &str,
) -> Option<User> {
    if email.is_empty() || password.is_empty() {
        return None;
    }

    let matches = match users.search(&SearchFilter::eq("email", email)).await {
        Ok(matches) => matches,
        Err(e) if e.is_not_found() => return None,
        Err(e) => {
            warn!(error = %e, "User lookup failed during basic authentication");
            return None;
        }
    };

    let user = matches.into_iter().next()?;
    if user.is_valid_password(password) {
        Some(user)
    } else {
        debug!(user_id = %user.id, "Basic credentials rejected");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IdentityError, Result};
    use async_trait::async_trait;
    use proptest::prelude::*;

    /// User store whose every call fails with the error `fail` builds.
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

    #[tokio::test]
    async fn test_store_failures_resolve_to_no_user() {
        let not_found = FailingUsers {
            fail: || IdentityError::NotFound,
        };
        assert!(user_object_from_credentials(&not_found, "bob@hbtn.io", "pwd")
            .await
            .is_none());

        let offline = FailingUsers {
            fail: || IdentityError::Storage("offline".to_string()),
        };
        assert!(user_object_from_credentials(&offline, "bob@hbtn.io", "pwd")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_credentials_skip_the_store() {
        let users = crate::repository::InMemoryUserRepository::new();
        let bob = User::new("bob@hbtn.io", "pwd").unwrap();
        users.save(&bob).await.unwrap();

        assert!(user_object_from_credentials(&users, "", "pwd").await.is_none());
        assert!(user_object_from_credentials(&users, "bob@hbtn.io", "").await.is_none());
        assert_eq!(
            user_object_from_credentials(&users, "bob@hbtn.io", "pwd")
                .await
                .map(|u| u.id),
            Some(bob.id)
        );
    }

    #[test]
    fn test_extract_requires_exact_prefix() {
        assert_eq!(extract_base64_authorization_header("Basic Ym9i"), Some("Ym9i"));
        assert_eq!(extract_base64_authorization_header("Basic "), Some(""));
        assert_eq!(extract_base64_authorization_header("basic Ym9i"), None);
        assert_eq!(extract_base64_authorization_header("Basic\tYm9i"), None);
        assert_eq!(extract_base64_authorization_header("Bearer Ym9i"), None);
        assert_eq!(extract_base64_authorization_header("Basic"), None);
    }

    #[test]
    fn test_decode_swallows_malformed_input() {
        assert_eq!(
            decode_base64_authorization_header("SG9sYmVydG9u").as_deref(),
            Some("Holberton")
        );
        assert_eq!(decode_base64_authorization_header("Holberton!"), None);
        assert_eq!(decode_base64_authorization_header("SG9sYmVydG9"), None);
        assert_eq!(decode_base64_authorization_header(""), None);
        // valid base64, invalid UTF-8
        assert_eq!(decode_base64_authorization_header("/w=="), None);
    }

    #[test]
    fn test_split_on_first_colon_only() {
        assert_eq!(
            extract_user_credentials("user:pa:ss"),
            Some(Credentials {
                username: "user".to_string(),
                password: "pa:ss".to_string(),
            })
        );
        assert_eq!(extract_user_credentials("no-colon-here"), None);
        assert_eq!(
            extract_user_credentials(":"),
            Some(Credentials {
                username: String::new(),
                password: String::new(),
            })
        );
    }

    #[test]
    fn test_header_round_trip() {
        let header = format!("Basic {}", STANDARD.encode("user:pass"));
        assert_eq!(
            credentials_from_header(&header),
            Some(Credentials {
                username: "user".to_string(),
                password: "pass".to_string(),
            })
        );
    }

    proptest! {
        #[test]
        fn prop_credentials_survive_encoding(user in "[^:]{0,16}", pass in ".{0,16}") {
            let header = format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")));
            let creds = credentials_from_header(&header).unwrap();
            prop_assert_eq!(creds.username, user);
            prop_assert_eq!(creds.password, pass);
        }
    }
}

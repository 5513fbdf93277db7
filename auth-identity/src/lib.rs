//! Authentication core for Gatehouse
//!
//! This module decides who a request belongs to. It provides:
//! - Route exclusion rules deciding which paths need authentication
//! - Credential extraction from an abstract request (header, cookie, form)
//! - HTTP Basic credential decoding and verification
//! - Session stores, in memory (optionally expiring) or durable
//! - Interchangeable authentication strategies behind one trait
//!
//! Authentication failure is never an error here: every lookup resolves to
//! `None` (or `false`) and the caller decides how to reject the request.
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_identity::{
//!     build_strategy, AuthConfig, InMemorySessionRepository, InMemoryUserRepository,
//!     StaticRequest, User, UserRepository,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = Arc::new(InMemoryUserRepository::new());
//!     let bob = User::new("bob@hbtn.io", "H0lbertonSchool98!")?;
//!     users.save(&bob).await?;
//!
//!     let config = AuthConfig::from_env()?;
//!     if let Some(auth) = build_strategy(&config, users, Arc::new(InMemorySessionRepository::new())) {
//!         let session_id = auth.create_session(&bob.id).await?;
//!         let request = StaticRequest::new()
//!             .with_cookie(config.session_name.unwrap_or_default(), session_id.unwrap_or_default());
//!         let user = auth.current_user(Some(&request)).await;
//!         println!("{:?}", user.map(|u| u.email));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod basic;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod path;
pub mod repository;
pub mod session;
pub mod strategy;

pub use basic::Credentials;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::*;
pub use credentials::{AuthRequest, StaticRequest};
pub use error::*;
pub use models::*;
pub use path::require_auth;
pub use repository::*;
pub use session::{InMemorySessionStore, PersistentSessionStore, SessionStore};
pub use strategy::*;

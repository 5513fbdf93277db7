//! Gatehouse HTTP gateway
//!
//! Puts an [`auth_identity::AuthStrategy`] in front of an Axum router: the
//! middleware gates every request, the session endpoints log users in and
//! out, and an optional sweeper purges expired sessions in the background.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use config::GatewayConfig;
pub use error::*;
pub use middleware::CurrentUser;
pub use request::RequestView;
pub use state::GatewayState;

use axum::Router;
use tokio::task::JoinHandle;

/// Create the application router with all routes and middleware
pub fn create_app(state: GatewayState) -> Router {
    routes::create_routes(state)
}

/// Start the expiry sweeper when both a strategy and an interval are
/// configured.
pub fn start_sweeper(state: &GatewayState) -> Option<JoinHandle<()>> {
    let every = state.config.sweep_interval?;
    let auth = state.auth.clone()?;
    Some(sweeper::spawn_sweeper(auth, every))
}

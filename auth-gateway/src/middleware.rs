//! Request gating for Axum
//!
//! Decides, before any handler runs, whether a request may proceed:
//! unauthenticated paths pass, requests carrying no credentials at all are
//! rejected with 401, and requests whose credentials resolve to nobody are
//! rejected with 403.

use crate::error::GatewayError;
use crate::request::RequestView;
use crate::state::GatewayState;
use auth_identity::User;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// The authenticated user, injected into request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let Some(auth) = state.auth.clone() else {
        return Ok(next.run(request).await);
    };

    let path = request.uri().path().to_string();
    if !auth.require_auth(&path, &state.config.excluded_paths) {
        return Ok(next.run(request).await);
    }

    let view = RequestView::from_headers(request.headers());
    // an empty header or cookie value counts as not presented
    let header = auth
        .authorization_header(Some(&view))
        .filter(|value| !value.is_empty());
    let cookie = auth
        .session_cookie(Some(&view))
        .filter(|value| !value.is_empty());

    if header.is_none() && cookie.is_none() {
        debug!(path = %path, "No credentials presented");
        return Err(GatewayError::Unauthorized);
    }

    let Some(user) = auth.current_user(Some(&view)).await else {
        debug!(path = %path, auth_type = %auth.auth_type(), "Credentials did not resolve to a user");
        return Err(GatewayError::Forbidden);
    };

    debug!(path = %path, user_id = %user.id, "Request authenticated");
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

use crate::error::{GatewayError, Result};
use crate::middleware::CurrentUser;
use axum::{Extension, Json};
use serde_json::Value;

/// The user the request authenticated as.
pub async fn me(current_user: Option<Extension<CurrentUser>>) -> Result<Json<Value>> {
    let Extension(CurrentUser(user)) = current_user.ok_or(GatewayError::NotFound)?;
    Ok(Json(user.to_json()))
}

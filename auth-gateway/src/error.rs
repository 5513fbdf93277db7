use auth_identity::IdentityError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0} missing")]
    MissingField(&'static str),

    #[error("no user found for this email")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Sessions are not enabled")]
    SessionsDisabled,

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingField(_) => StatusCode::BAD_REQUEST,
            GatewayError::UserNotFound | GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::WrongPassword | GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::SessionsDisabled => StatusCode::NOT_IMPLEMENTED,
            GatewayError::Identity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            GatewayError::Identity(e) => {
                tracing::error!(error = %e, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

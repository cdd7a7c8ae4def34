use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const MSG_MISSING_FIELDS: &str = "Username and password required";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

/// Errors surfaced to HTTP clients as `{"message": ...}`.
///
/// Internal failures carry only a generic message; the cause is logged where
/// the error is produced.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    /// Unknown user and wrong password share this variant on purpose.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Username already exists")]
    AlreadyExists,
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation(MSG_MISSING_FIELDS).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("Registration error").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_is_the_display_text() {
        assert_eq!(
            ApiError::Validation(MSG_PASSWORD_TOO_SHORT).to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(ApiError::Internal("Authentication error").to_string(), "Authentication error");
    }
}

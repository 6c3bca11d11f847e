use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::{auth::dto::ErrorBody, storage::StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username, email and password are required")]
    MissingFields,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("username or email is already registered")]
    AlreadyRegistered,
    #[error("username and password are required")]
    MissingCredentials,
    /// Same message for unknown user and wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("password hashing error: {0}")]
    Hashing(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingFields
            | AuthError::PasswordTooShort { .. }
            | AuthError::MissingCredentials
            | AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::AlreadyRegistered => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Storage(_) | AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

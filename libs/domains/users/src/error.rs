use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteError, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid user id: {0}")]
    InvalidId(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Maps a failed write, turning a unique-index violation into
    /// [`UserError::DuplicateEmail`] for `email`.
    pub fn from_write(err: mongodb::error::Error, email: &str) -> Self {
        if is_duplicate_key(&err) {
            UserError::DuplicateEmail(email.to_string())
        } else {
            err.into()
        }
    }
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY,
            ..
        }))
    )
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidId(id) => AppError::InvalidId(format!("Invalid user id: {}", id)),
            UserError::NotFound(key) => AppError::NotFound(format!("User {} not found", key)),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("Email already registered: {}", email))
            }
            UserError::InvalidCredentials => {
                AppError::InvalidCredentials("Invalid credentials".to_string())
            }
            UserError::Database(msg) => AppError::Database(msg),
            UserError::PasswordHash(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

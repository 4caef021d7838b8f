use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;

/// Outcomes of the journal services. Every variant is scoped to a single
/// operation; the transaction that produced it has already been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("invalid input: {0:?}")]
    Validation(HashMap<String, String>),
    #[error("an entry with slug `{0}` already exists")]
    DuplicateSlug(String),
    #[error("a user with that username or email already exists")]
    DuplicateUser,
    #[error("only the author may change this entry")]
    Permission,
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl JournalError {
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), message.to_string());
        JournalError::Validation(errors)
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    Template(askama::Error),
    Session(tower_sessions::session::Error),
    Journal(JournalError),
    NotFound,
    Forbidden,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound | AppError::Journal(JournalError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            AppError::Forbidden | AppError::Journal(JournalError::Permission) => {
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Journal(e) => {
                tracing::error!("Journal error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e)
    }
}

impl From<JournalError> for AppError {
    fn from(e: JournalError) -> Self {
        AppError::Journal(e)
    }
}

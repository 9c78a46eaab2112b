//! Error types for marquee.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type alias using marquee's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for marquee operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Favorite entry not found
    #[error("Favorite not found: {0}")]
    FavoriteNotFound(i64),

    /// Request body failed schema validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for the "target row does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::FavoriteNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<ValidationErrors> for Error {
    fn from(e: ValidationErrors) -> Self {
        Error::Validation(e)
    }
}

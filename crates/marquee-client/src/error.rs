//! Client error types.

use marquee_core::FieldError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure of a client operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The server (or the local form check) rejected the request body.
    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// The target entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, reset, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Short text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(fields) => match fields.first() {
                Some(first) if fields.len() == 1 => first.to_string(),
                Some(first) => format!("{} (and {} more)", first, fields.len() - 1),
                None => "Invalid input".to_string(),
            },
            ClientError::NotFound(_) => "This entry no longer exists".to_string(),
            ClientError::Http { status, .. } if *status >= 500 => {
                "Server error, please try again".to_string()
            }
            ClientError::Http { message, .. } => message.clone(),
            ClientError::Transport(_) => "Could not reach the server".to_string(),
            ClientError::Decode(_) => "Unexpected response from the server".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

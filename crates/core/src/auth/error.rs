//! Authentication error types.

use thiserror::Error;

use crate::types::Notice;

/// Errors that can occur when checking credentials.
///
/// Both kinds are reported to the user and can be retried without limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email or password was left blank.
    #[error("please fill in all fields")]
    IncompleteInput,

    /// No directory record matches the email/password pair.
    #[error("email or password incorrect")]
    InvalidCredentials,
}

impl AuthError {
    /// The notice shown to the user for this failure.
    #[must_use]
    pub const fn notice(&self) -> Notice {
        match self {
            Self::IncompleteInput => Notice::IncompleteInput,
            Self::InvalidCredentials => Notice::InvalidCredentials,
        }
    }
}

/// Errors that can occur when loading a credential directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory document is not valid JSON of the expected shape.
    #[error("invalid credential directory: {0}")]
    Parse(#[from] serde_json::Error),
}

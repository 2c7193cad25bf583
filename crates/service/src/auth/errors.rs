use thiserror::Error;

/// Reasons a request fails authentication
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing API token")]
    MissingToken,
    #[error("invalid API token")]
    InvalidToken,
}

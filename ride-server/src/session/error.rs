//! Session token errors.

/// Errors from issuing or verifying a session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token's lifetime has passed
    #[error("session expired")]
    Expired,

    /// Malformed or forged token
    #[error("invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

//! Payment processor error types.

/// Errors from the payment processor client.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {0}")]
    Json(String),

    /// Processor returned an error status
    #[error("processor error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid secret key
    #[error("unauthorized (invalid processor key)")]
    Unauthorized,

    /// Unknown payment intent
    #[error("payment intent {0} not found")]
    IntentNotFound(String),
}

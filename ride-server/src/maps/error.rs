//! Maps client error types.

/// Errors from the distance and place-search providers.
#[derive(Debug, thiserror::Error)]
pub enum DistanceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: String, message: String },

    /// Invalid API key or request denied
    #[error("request denied (check the maps API key)")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by maps API")]
    RateLimited,

    /// No drivable route between the given places
    #[error("no route found: {0}")]
    NoRoute(String),

    /// The response parsed but cannot be used
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Provider could not be reached
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl DistanceError {
    /// Whether a later attempt at the same lookup might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DistanceError::Http(_) | DistanceError::RateLimited | DistanceError::Unavailable(_)
        )
    }
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_ref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

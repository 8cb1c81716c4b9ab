use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulpitError {
    /// HTTP 401/403. The message comes from the server body.
    #[error("Authentication failed: {message}")]
    Authentication { status: u16, message: String },

    /// HTTP 429 after the retry budget ran out.
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    /// No response at all (connection refused, DNS, timeout).
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl PulpitError {
    /// Whether the request loop may try the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

impl From<reqwest::Error> for PulpitError {
    fn from(err: reqwest::Error) -> Self {
        // Builder failures are local misconfiguration, not connectivity.
        if err.is_builder() {
            return Self::Config(format!("HTTP client setup failed: {}", err));
        }
        Self::Network {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PulpitError>;

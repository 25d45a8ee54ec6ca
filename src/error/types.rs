//! Error type definitions
//!
//! Defines the main error types used throughout the API client.

use thiserror::Error;

/// Main error type for the API client
#[derive(Error, Debug)]
pub enum Error {
    /// An endpoint was called before a successful login
    #[error("Not logged in!")]
    NotAuthenticated,

    /// Network/HTTP client errors (connection refused, timeout, TLS)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 429; the cooldown has already been slept when this is returned
    #[error("Too many requests, cooled down for {cooldown_secs}s")]
    RateLimited { cooldown_secs: u64 },

    /// HTTP 400 with the diagnostic fields the API sent back
    #[error("Bad request: {}", message.as_deref().unwrap_or("no message"))]
    BadRequest {
        message: Option<String>,
        error_type: Option<String>,
    },

    /// Any other non-200 status
    #[error("Request returns {status} error")]
    Http {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// Credentials rejected at login
    #[error("Login rejected for '{username}': {reason}")]
    AuthRejected { username: String, reason: String },

    /// Response body could not be decoded or lacks an expected field
    #[error("Malformed response: {context}")]
    MalformedResponse { context: String },

    /// Direct message recipients are unusable
    #[error("Invalid recipients: {0}")]
    InvalidRecipients(String),

    /// Credential store errors
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Proxy configuration errors
    #[error("Proxy error: {config}")]
    Proxy { config: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
        }
    }

    /// Create a credentials error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create an invalid recipients error
    pub fn invalid_recipients(msg: impl Into<String>) -> Self {
        Self::InvalidRecipients(msg.into())
    }

    /// Create an auth rejection error
    pub fn auth_rejected(username: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AuthRejected {
            username: username.into(),
            reason: reason.into(),
        }
    }

    /// Create a proxy error
    pub fn proxy(config: impl Into<String>) -> Self {
        Self::Proxy {
            config: config.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this is an ordinary request failure.
    ///
    /// These are logged and handed back to the caller, who decides whether to
    /// call again. `NotAuthenticated` and local errors are not request failures.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::RateLimited { .. }
                | Self::BadRequest { .. }
                | Self::Http { .. }
                | Self::MalformedResponse { .. }
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::BadRequest { .. } => Some(400),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

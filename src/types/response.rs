//! Response type definitions
//!
//! Defines the envelope every successful request returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Decoded response of a single request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status: u16,
    /// Body as received
    pub raw_body: String,
    /// Body decoded as JSON
    pub json: Value,
    /// Cookies set by this response
    pub cookies: HashMap<String, String>,
}

impl ResponseEnvelope {
    /// Create a new envelope
    pub fn new(status: u16, raw_body: impl Into<String>, json: Value) -> Self {
        Self {
            status,
            raw_body: raw_body.into(),
            json,
            cookies: HashMap::new(),
        }
    }

    /// Attach cookies
    pub fn with_cookies(mut self, cookies: HashMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Look up a cookie by name
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Look up a nested field, e.g. `field(&["logged_in_user", "pk"])`
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.json, |value, key| value.get(key))
    }

    /// Whether the API reported `"status": "ok"`
    pub fn is_ok(&self) -> bool {
        self.json.get("status").and_then(Value::as_str) == Some("ok")
    }
}

/// Diagnostic payload sent with HTTP 400 responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    /// Human readable message
    pub message: Option<String>,
    /// Machine readable error kind
    pub error_type: Option<String>,
}

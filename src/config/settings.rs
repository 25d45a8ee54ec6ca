//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the API client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration settings for the API client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Private API endpoint and signing configuration
    pub api: ApiSettings,
    /// Network configuration
    pub network: NetworkSettings,
    /// Rate-limit cooldown and courtesy delay policy
    pub rate_limit: RateLimitSettings,
    /// Credential store configuration
    pub credentials: CredentialSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Private API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// User agent of the emulated app build
    pub user_agent: String,
    /// HMAC key used for signed bodies
    pub sig_key: String,
    /// Value of `ig_sig_key_version`
    pub sig_key_version: String,
    /// Experiments list sent by `sync_features`
    pub experiments: String,
}

/// Network configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Explicit proxy, overrides the environment proxies
    pub proxy: Option<String>,
    /// HTTPS_PROXY
    pub https_proxy: Option<String>,
    /// HTTP_PROXY
    pub http_proxy: Option<String>,
    /// ALL_PROXY
    pub all_proxy: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Rate-limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Cooldown slept after an HTTP 429
    pub cooldown_secs: u64,
    /// Items accumulated between two courtesy delays
    pub courtesy_every: usize,
    /// Lower bound of the courtesy delay
    pub courtesy_min_secs: u64,
    /// Upper bound of the courtesy delay
    pub courtesy_max_secs: u64,
}

/// Credential store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Secret file path, defaults to `<config dir>/instabot/secret.txt`
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
    /// Log file; `None` logs to the console only
    pub file: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://i.instagram.com/api/v1/".to_string(),
            user_agent: "Instagram 10.26.0 Android (18/4.3; 320dpi; 720x1280; Xiaomi; HM 1SW; armani; qcom; en_US)".to_string(),
            sig_key: "4f8732eb9ba7d1c8e8897a75d6474d4eb3f5279137431b2aafb71fafe2abe178".to_string(),
            sig_key_version: "4".to_string(),
            experiments: "ig_android_sms_consent_in_reg,ig_android_flexible_sampling_universe,ig_android_background_conf_resend_fix,ig_restrict_suggested_users_by_follower_count,ig_android_fb_topsearch_sgp_fork_request,ig_android_direct_inbox_search,ig_android_profile_contextual_feed,ig_android_follow_request_text_buttons".to_string(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            proxy: None,
            https_proxy: None,
            http_proxy: None,
            all_proxy: None,
            timeout_secs: 30,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: 300,
            courtesy_every: 20_000,
            courtesy_min_secs: 120,
            courtesy_max_secs: 180,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
            file: Some(PathBuf::from("instabot.log")),
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("sig_key", &"<redacted>")
            .field("sig_key_version", &self.sig_key_version)
            .field("experiments", &self.experiments)
            .finish()
    }
}

impl fmt::Debug for NetworkSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |p: &Option<String>| p.as_deref().map(redact_proxy_auth);
        f.debug_struct("NetworkSettings")
            .field("proxy", &redacted(&self.proxy))
            .field("https_proxy", &redacted(&self.https_proxy))
            .field("http_proxy", &redacted(&self.http_proxy))
            .field("all_proxy", &redacted(&self.all_proxy))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Replace the `user:pass@` part of a proxy URL with `***@`
pub fn redact_proxy_auth(proxy: &str) -> String {
    let Some(at) = proxy.rfind('@') else {
        return proxy.to_string();
    };
    let start = proxy.find("://").map(|i| i + 3).unwrap_or(0);
    if start > at {
        return proxy.to_string();
    }
    format!("{}***{}", &proxy[..start], &proxy[at..])
}

impl NetworkSettings {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CredentialSettings {
    /// Resolve the secret file path
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("instabot")
                .join("secret.txt")
        })
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Apply environment variable overrides on top of these settings
    pub fn merge_with_env(self) -> crate::Result<Self> {
        self.merge_with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, keyed by environment variable name
    pub fn merge_with_lookup<F>(mut self, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("INSTABOT_API_URL") {
            self.api.base_url = base_url;
        }

        if let Some(user_agent) = lookup("INSTABOT_USER_AGENT") {
            self.api.user_agent = user_agent;
        }

        if let Some(proxy) = lookup("INSTABOT_PROXY") {
            self.network.proxy = Some(proxy);
        }
        if let Some(proxy) = lookup("HTTPS_PROXY") {
            self.network.https_proxy = Some(proxy);
        }
        if let Some(proxy) = lookup("HTTP_PROXY") {
            self.network.http_proxy = Some(proxy);
        }
        if let Some(proxy) = lookup("ALL_PROXY") {
            self.network.all_proxy = Some(proxy);
        }

        if let Some(timeout) = lookup("INSTABOT_TIMEOUT") {
            self.network.timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid timeout: {}", e)))?;
        }

        if let Some(cooldown) = lookup("INSTABOT_COOLDOWN") {
            self.rate_limit.cooldown_secs = cooldown
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid cooldown: {}", e)))?;
        }

        if let Some(path) = lookup("INSTABOT_CREDENTIALS_PATH") {
            self.credentials.path = Some(PathBuf::from(path));
        }

        if let Some(level) = lookup("INSTABOT_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Validate the final configuration
    pub fn validate(&self) -> crate::Result<()> {
        let base = url::Url::parse(&self.api.base_url)
            .map_err(|e| crate::Error::Config(format!("Invalid base URL: {}", e)))?;
        if !base.path().ends_with('/') {
            return Err(crate::Error::config("Base URL must end with '/'"));
        }

        if self.api.sig_key.is_empty() {
            return Err(crate::Error::config("Signature key must not be empty"));
        }

        if self.rate_limit.courtesy_every == 0 {
            return Err(crate::Error::config("courtesy_every must be positive"));
        }

        if self.rate_limit.courtesy_min_secs > self.rate_limit.courtesy_max_secs {
            return Err(crate::Error::config(
                "courtesy_min_secs must not exceed courtesy_max_secs",
            ));
        }

        Ok(())
    }

    /// Proxy to use, in priority order: explicit, HTTPS, HTTP, ALL
    pub fn get_proxy_url(&self) -> Option<&str> {
        self.network
            .proxy
            .as_deref()
            .or(self.network.https_proxy.as_deref())
            .or(self.network.http_proxy.as_deref())
            .or(self.network.all_proxy.as_deref())
    }
}

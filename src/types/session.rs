//! Session state
//!
//! Authentication state owned by one client instance.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No login attempted yet, or the last one was rejected
    #[default]
    Anonymous,
    /// Handshake or credential submission in flight
    Authenticating,
    /// Logged in, endpoints may be called
    Authenticated,
    /// Logged out explicitly
    LoggedOut,
}

/// Authentication state for one account
///
/// `user_id`, `rank_token` and `csrf_token` are written once per login and read
/// by every endpoint that needs the default parameters.
#[derive(Clone, Default, Serialize)]
pub struct Session {
    /// Current lifecycle state
    pub state: SessionState,
    /// Account username
    pub username: String,
    #[serde(skip)]
    pub(crate) password: String,
    /// Numeric account id (`logged_in_user.pk`)
    pub user_id: String,
    /// `<user_id>_<uuid>`, required by ranked feeds and search
    pub rank_token: String,
    /// Value of the `csrftoken` cookie
    pub csrf_token: String,
    /// `android-` prefixed device id derived from the credentials
    pub device_id: String,
    /// Client GUID (dashed UUID) sent as `_uuid`
    pub uuid: String,
    /// Proxy the connection was built with
    pub proxy: Option<String>,
    /// Requests executed by this client so far
    pub request_count: u64,
    /// When the last successful login happened
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether endpoints may be called
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Set the user identity for a new login attempt
    pub(crate) fn set_user(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        device_id: impl Into<String>,
        uuid: impl Into<String>,
    ) {
        self.username = username.into();
        self.password = password.into();
        self.device_id = device_id.into();
        self.uuid = uuid.into();
    }

    /// Record a successful login
    pub(crate) fn authenticate(
        &mut self,
        user_id: impl Into<String>,
        csrf_token: impl Into<String>,
    ) {
        self.user_id = user_id.into();
        self.rank_token = format!("{}_{}", self.user_id, self.uuid);
        self.csrf_token = csrf_token.into();
        self.state = SessionState::Authenticated;
        self.logged_in_at = Some(Utc::now());
    }

    /// Drop the tokens and move to `state`; a logout also forgets the password
    pub(crate) fn reset(&mut self, state: SessionState) {
        if state == SessionState::LoggedOut {
            self.password.clear();
        }
        self.user_id.clear();
        self.rank_token.clear();
        self.csrf_token.clear();
        self.logged_in_at = None;
        self.state = state;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("rank_token", &self.rank_token)
            .field("device_id", &self.device_id)
            .field("uuid", &self.uuid)
            .field("proxy", &self.proxy)
            .field("request_count", &self.request_count)
            .finish()
    }
}

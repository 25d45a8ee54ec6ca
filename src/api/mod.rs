//! # API Client Module
//!
//! The [`InstagramApi`] client owns the session, the HTTP connection and the
//! waiting policies. Endpoint methods live in [`crate::endpoints`]; this module
//! holds the pieces they share:
//!
//! - [`signer`]: signed bodies, device ids, request ids
//! - [`executor`]: one request in, one [`ResponseEnvelope`] (or error) out
//! - [`backoff`]: rate-limit cooldown and courtesy delay
//! - [`pagination`]: "fetch all pages" loop
//! - [`credentials`]: credential store collaborator
//!
//! ## Examples
//!
//! ```rust,no_run
//! use instabot_api::{InstagramApi, Settings};
//!
//! # tokio_test::block_on(async {
//! let api = InstagramApi::new(Settings::default())?;
//! api.login(Some("alice"), Some("secret"), false, None).await?;
//! api.follow("123").await?;
//! api.logout().await;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

pub mod backoff;
pub mod credentials;
pub mod executor;
pub mod pagination;
pub mod signer;

use crate::{
    Error, Result,
    config::Settings,
    types::{RequestBody, ResponseEnvelope, Session, SessionState},
};
use backoff::{CourtesyDelay, Sleeper, TokioSleeper};
use credentials::{CredentialStore, FileCredentialStore};
use executor::RequestExecutor;
use pagination::Paginator;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Convenience type alias for the client with the default tokio sleeper
pub type InstagramApi = InstagramApiGeneric<TokioSleeper>;

/// Authenticated client for the private API
#[derive(Debug)]
pub struct InstagramApiGeneric<S: Sleeper = TokioSleeper> {
    /// Configuration settings
    settings: Arc<Settings>,
    /// Authentication state
    session: RwLock<Session>,
    /// Request transport
    executor: RequestExecutor<S>,
    /// Courtesy delay for bulk pagination
    courtesy: CourtesyDelay,
    /// Where credentials come from and get invalidated
    credential_store: Box<dyn CredentialStore>,
}

impl InstagramApiGeneric<TokioSleeper> {
    /// Creates a client that waits on the tokio timer.
    ///
    /// Credentials are read from the file named in `settings.credentials`.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_sleeper(settings, TokioSleeper)
    }
}

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Creates a client with a custom [`Sleeper`]
    pub fn with_sleeper(settings: Settings, sleeper: S) -> Result<Self> {
        settings.validate()?;
        let executor = RequestExecutor::new(&settings, Arc::new(sleeper))?;
        let courtesy = CourtesyDelay::from(&settings.rate_limit);
        let credential_store = Box::new(FileCredentialStore::new(
            settings.credentials.resolved_path(),
        ));

        Ok(Self {
            settings: Arc::new(settings),
            session: RwLock::new(Session::default()),
            executor,
            courtesy,
            credential_store,
        })
    }

    /// Replace the credential store
    pub fn with_credential_store(mut self, store: impl CredentialStore + 'static) -> Self {
        self.credential_store = Box::new(store);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Snapshot of the session, including the request counter
    pub async fn session(&self) -> Session {
        let mut session = self.session.read().await.clone();
        session.request_count = self.executor.total_requests();
        session
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Requests executed so far, successful or not
    pub fn total_requests(&self) -> u64 {
        self.executor.total_requests()
    }

    /// Log in, or return the live session when already logged in.
    ///
    /// Without a password the credential store is asked for one. `force`
    /// re-runs the whole handshake on an authenticated session. When the API
    /// rejects the credentials the store is told to delete them.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        force: bool,
        proxy: Option<&str>,
    ) -> Result<Session> {
        let credentials = match (username, password) {
            (Some(username), Some(password)) => {
                credentials::Credentials::new(username, password)
            }
            (username, None) => self.credential_store.get_credentials(username).await?,
            (None, Some(_)) => {
                return Err(Error::credentials("a password was given without a username"));
            }
        };

        if self.is_authenticated().await && !force {
            debug!("Already logged in as '{}'", credentials.username);
            return Ok(self.session().await);
        }

        let device_id = signer::derive_device_id(&signer::username_hash(
            &credentials.username,
            &credentials.password,
        ));
        let uuid = signer::new_request_id(true);
        let proxy = proxy
            .map(str::to_string)
            .or_else(|| self.settings.get_proxy_url().map(str::to_string));

        {
            let mut session = self.session.write().await;
            session.reset(SessionState::Authenticating);
            session.set_user(&credentials.username, &credentials.password, &device_id, &uuid);
            session.proxy = proxy.clone();
        }

        match self.authenticate(&credentials, &device_id, &uuid, proxy.as_deref()).await {
            Ok((user_id, csrf_token)) => {
                self.session.write().await.authenticate(user_id, csrf_token);
                info!("Logged-in successfully as '{}'!", credentials.username);
                Ok(self.session().await)
            }
            Err(e) => {
                self.session.write().await.reset(SessionState::Anonymous);
                Err(self.handle_login_failure(&credentials.username, e).await)
            }
        }
    }

    /// Handshake then credential submission; returns `(user_id, csrf_token)`
    async fn authenticate(
        &self,
        credentials: &credentials::Credentials,
        device_id: &str,
        uuid: &str,
        proxy: Option<&str>,
    ) -> Result<(String, String)> {
        self.executor.reset_connection(proxy).await?;

        let handshake = format!(
            "si/fetch_headers/?challenge_type=signup&guid={}",
            signer::new_request_id(false)
        );
        let headers = self.send_request(&handshake, None, true).await?;
        let handshake_token = headers
            .cookie("csrftoken")
            .ok_or_else(|| Error::malformed("handshake did not set the csrftoken cookie"))?
            .to_string();

        let data = json!({
            "phone_id": signer::new_request_id(true),
            "_csrftoken": handshake_token,
            "username": credentials.username,
            "guid": uuid,
            "device_id": device_id,
            "password": credentials.password,
            "login_attempt_count": "0",
        });
        let login = self
            .send_request("accounts/login/", Some(RequestBody::Signed(into_map(data))), true)
            .await
            .map_err(classify_login_failure)?;

        let user_id = match login.field(&["logged_in_user", "pk"]) {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => return Err(Error::malformed("login response lacks logged_in_user.pk")),
        };
        let csrf_token = login
            .cookie("csrftoken")
            .map(str::to_string)
            .unwrap_or(handshake_token);

        Ok((user_id, csrf_token))
    }

    async fn handle_login_failure(&self, username: &str, e: Error) -> Error {
        let reason = match e {
            Error::AuthRejected { reason, .. } => reason,
            other => {
                warn!("Login as '{}' failed: {}", username, other);
                return other;
            }
        };

        info!("Username or password is incorrect.");
        if let Err(store_err) = self.credential_store.delete_credentials().await {
            warn!("Could not delete stored credentials: {}", store_err);
        }
        Error::auth_rejected(username, reason)
    }

    /// Log out. Returns whether the session ended up unauthenticated.
    pub async fn logout(&self) -> bool {
        if !self.is_authenticated().await {
            return true;
        }

        match self.send_request("accounts/logout/", None, false).await {
            Ok(_) => {
                self.session.write().await.reset(SessionState::LoggedOut);
                info!("Logged out");
                true
            }
            Err(e) => {
                warn!("Logout failed: {}", e);
                false
            }
        }
    }

    /// Send a request through the executor.
    ///
    /// Fails with [`Error::NotAuthenticated`] before any I/O when the session
    /// is not logged in, unless `login_phase` is set.
    pub async fn send_request(
        &self,
        endpoint: &str,
        body: Option<RequestBody>,
        login_phase: bool,
    ) -> Result<ResponseEnvelope> {
        if !login_phase && !self.is_authenticated().await {
            error!("Not logged in!");
            return Err(Error::NotAuthenticated);
        }

        self.executor.execute(endpoint, body.as_ref()).await
    }

    /// `{_uuid, _uid, _csrftoken}` sent with every authenticated write
    pub async fn default_data(&self) -> Map<String, Value> {
        let session = self.session.read().await;
        let mut data = Map::new();
        data.insert("_uuid".into(), session.uuid.clone().into());
        data.insert("_uid".into(), session.user_id.clone().into());
        data.insert("_csrftoken".into(), session.csrf_token.clone().into());
        data
    }

    /// `data` merged with [`Self::default_data`]
    pub async fn json_data(&self, data: Value) -> Map<String, Value> {
        let mut merged = into_map(data);
        merged.extend(self.default_data().await);
        merged
    }

    /// Signed POST of `data` plus the default triple
    pub(crate) async fn post(&self, endpoint: &str, data: Value) -> Result<ResponseEnvelope> {
        let body = RequestBody::Signed(self.json_data(data).await);
        self.send_request(endpoint, Some(body), false).await
    }

    /// Plain authenticated GET
    pub(crate) async fn get(&self, endpoint: &str) -> Result<ResponseEnvelope> {
        self.send_request(endpoint, None, false).await
    }

    pub(crate) async fn user_id(&self) -> String {
        self.session.read().await.user_id.clone()
    }

    pub(crate) async fn rank_token(&self) -> String {
        self.session.read().await.rank_token.clone()
    }

    pub(crate) async fn session_field<T>(&self, read: impl FnOnce(&Session) -> T) -> T {
        read(&*self.session.read().await)
    }

    pub(crate) fn paginator(&self) -> Paginator<'_, S> {
        Paginator::new(self.executor.sleeper(), self.courtesy)
    }
}

/// Turn a JSON object into a map; anything else becomes an empty map
pub(crate) fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// HTTP error statuses on credential submission mean the credentials were
/// rejected; transport and rate-limit failures pass through unchanged.
fn classify_login_failure(e: Error) -> Error {
    match e {
        Error::BadRequest {
            message: Some(message),
            ..
        } => Error::auth_rejected(String::new(), message),
        e @ (Error::BadRequest { .. } | Error::Http { .. }) => {
            Error::auth_rejected(String::new(), e.to_string())
        }
        other => other,
    }
}

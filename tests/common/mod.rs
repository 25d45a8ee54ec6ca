//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

/// Test helper functions
pub mod helpers {
    use async_trait::async_trait;
    use instabot_api::{
        InstagramApiGeneric, Result, Settings,
        api::{
            backoff::Sleeper,
            credentials::{CredentialStore, Credentials},
        },
    };
    use serde_json::json;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    /// Sleeper that records waits and returns at once
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn waits(&self) -> Vec<Duration> {
            self.waits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    /// In-memory credential store counting invalidations
    #[derive(Debug, Clone, Default)]
    pub struct MemoryCredentialStore {
        credentials: Option<(String, String)>,
        deletions: Arc<AtomicUsize>,
    }

    impl MemoryCredentialStore {
        pub fn with(username: &str, password: &str) -> Self {
            Self {
                credentials: Some((username.to_string(), password.to_string())),
                deletions: Arc::default(),
            }
        }

        pub fn deletions(&self) -> usize {
            self.deletions.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn get_credentials(&self, _username: Option<&str>) -> Result<Credentials> {
            match &self.credentials {
                Some((user, pass)) => Ok(Credentials::new(user.as_str(), pass.as_str())),
                None => Err(instabot_api::Error::credentials("empty store")),
            }
        }

        async fn delete_credentials(&self) -> Result<()> {
            self.deletions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    pub type TestApi = InstagramApiGeneric<Arc<RecordingSleeper>>;

    /// Settings pointing the client at the mock server
    pub fn create_test_settings(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = format!("{}/api/v1/", server.uri());
        settings.network.timeout_secs = 5;
        settings.logging.file = None;
        settings
    }

    /// Client wired to the mock server, a recording sleeper and `store`
    pub fn create_test_api(
        server: &MockServer,
        store: MemoryCredentialStore,
    ) -> (TestApi, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let api = InstagramApiGeneric::with_sleeper(create_test_settings(server), sleeper.clone())
            .unwrap()
            .with_credential_store(store);
        (api, sleeper)
    }

    /// Handshake that sets the csrftoken cookie
    pub async fn mount_handshake(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v1/si/fetch_headers/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "csrftoken=handshake-token; Path=/")
                    .set_body_json(json!({"status": "ok"})),
            )
            .mount(server)
            .await;
    }

    /// Successful credential submission for account 42
    pub async fn mount_login_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/accounts/login/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "csrftoken=session-token; Path=/")
                    .set_body_json(json!({
                        "status": "ok",
                        "logged_in_user": {"pk": 42, "username": "alice"}
                    })),
            )
            .mount(server)
            .await;
    }

    /// Log `api` in against mounted handshake and login mocks
    pub async fn login(api: &TestApi) {
        api.login(Some("alice"), Some("secret"), false, None)
            .await
            .unwrap();
    }

    /// Decode the `signed_body` JSON payload of a form body
    pub fn signed_payload(body: &[u8]) -> serde_json::Value {
        let body = std::str::from_utf8(body).unwrap();
        let signed = body
            .split('&')
            .find_map(|pair| pair.strip_prefix("signed_body="))
            .unwrap();
        let (_, encoded) = signed.split_once('.').unwrap();
        let decoded = urlencoding::decode(encoded).unwrap();
        serde_json::from_str(&decoded).unwrap()
    }
}

//! Client integration tests against a mock API
//!
//! Covers login, signed writes, failure classification, direct messages and
//! pagination over HTTP.

mod common;

use common::helpers::{
    MemoryCredentialStore, create_test_api, login, mount_handshake, mount_login_ok, signed_payload,
};
use instabot_api::{DirectItem, Error, SessionState, ThreadTarget};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .collect()
}

#[tokio::test]
async fn test_login_success_populates_session() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());

    let session = api
        .login(Some("alice"), Some("secret"), false, None)
        .await
        .unwrap();

    assert_eq!(session.state, SessionState::Authenticated);
    assert_eq!(session.user_id, "42");
    assert_eq!(session.csrf_token, "session-token");
    assert_eq!(session.rank_token, format!("42_{}", session.uuid));
    assert!(session.device_id.starts_with("android-"));
    assert_eq!(session.device_id.len(), "android-".len() + 16);
    assert_eq!(session.request_count, 2);

    let submitted = requests_to(&server, "/api/v1/accounts/login/").await;
    assert_eq!(submitted.len(), 1);
    let payload = signed_payload(&submitted[0].body);
    assert_eq!(payload["username"], "alice");
    assert_eq!(payload["_csrftoken"], "handshake-token");
    assert_eq!(payload["device_id"], session.device_id.as_str());
    assert_eq!(payload["login_attempt_count"], "0");
}

#[tokio::test]
async fn test_login_is_idempotent_unless_forced() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    api.login(Some("alice"), Some("secret"), false, None)
        .await
        .unwrap();
    assert_eq!(api.total_requests(), 2);

    api.login(Some("alice"), Some("secret"), true, None)
        .await
        .unwrap();
    assert_eq!(api.total_requests(), 4);
}

#[tokio::test]
async fn test_login_uses_stored_credentials() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::with("bob", "hunter2"));

    let session = api.login(None, None, false, None).await.unwrap();

    assert_eq!(session.username, "bob");
    let submitted = requests_to(&server, "/api/v1/accounts/login/").await;
    assert_eq!(signed_payload(&submitted[0].body)["password"], "hunter2");
}

#[tokio::test]
async fn test_rejected_credentials_are_invalidated() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/login/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "fail",
            "message": "The password you entered is incorrect.",
            "error_type": "bad_password"
        })))
        .mount(&server)
        .await;
    let store = MemoryCredentialStore::with("alice", "wrong");
    let (api, _) = create_test_api(&server, store.clone());

    let err = api.login(None, None, false, None).await.unwrap_err();

    match err {
        Error::AuthRejected { username, reason } => {
            assert_eq!(username, "alice");
            assert!(reason.contains("incorrect"));
        }
        other => panic!("expected AuthRejected, got {:?}", other),
    }
    assert_eq!(store.deletions(), 1);
    assert!(!api.is_authenticated().await);
    assert_eq!(api.session().await.state, SessionState::Anonymous);
}

#[tokio::test]
async fn test_handshake_without_cookie_does_not_invalidate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/si/fetch_headers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    let store = MemoryCredentialStore::with("alice", "secret");
    let (api, _) = create_test_api(&server, store.clone());

    let err = api.login(None, None, false, None).await.unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert_eq!(store.deletions(), 0);
    assert_eq!(api.total_requests(), 1);
}

#[tokio::test]
async fn test_follow_sends_one_signed_post() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/friendships/create/123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "friendship_status": {"following": true}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let response = api.follow("123").await.unwrap();

    assert!(response.is_ok());
    assert_eq!(response.json["friendship_status"]["following"], true);

    let sent = requests_to(&server, "/api/v1/friendships/create/123/").await;
    let body = std::str::from_utf8(&sent[0].body).unwrap();
    assert!(body.starts_with("ig_sig_key_version=4&signed_body="));

    let payload = signed_payload(&sent[0].body);
    let session = api.session().await;
    assert_eq!(payload["user_id"], "123");
    assert_eq!(payload["_uid"], "42");
    assert_eq!(payload["_csrftoken"], "session-token");
    assert_eq!(payload["_uuid"], session.uuid.as_str());
    assert_eq!(session.request_count, 3);
}

#[tokio::test]
async fn test_rate_limit_waits_cooldown() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/media/1_2/like/"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"status": "fail"})))
        .mount(&server)
        .await;
    let (api, sleeper) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let err = api.like("1_2").await.unwrap_err();

    assert!(matches!(err, Error::RateLimited { cooldown_secs: 300 }));
    assert!(err.is_request_failure());
    assert_eq!(sleeper.waits(), vec![Duration::from_secs(300)]);
    assert_eq!(api.total_requests(), 3);
}

#[tokio::test]
async fn test_bad_request_and_other_statuses() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/media/1_2/comment/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "feedback_required",
            "error_type": "spam"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/news/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/discover/explore/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;
    let (api, sleeper) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let err = api.comment("1_2", "nice").await.unwrap_err();
    assert!(matches!(
        err,
        Error::BadRequest { ref message, ref error_type }
            if message.as_deref() == Some("feedback_required")
                && error_type.as_deref() == Some("spam")
    ));
    assert_eq!(err.status(), Some(400));

    let err = api.get_following_recent_activity().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 500, body: None }));

    let err = api.explore().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));

    assert!(sleeper.waits().is_empty());
    assert!(api.is_authenticated().await);
}

#[tokio::test]
async fn test_unauthenticated_calls_send_nothing() {
    let server = MockServer::start().await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());

    assert!(matches!(api.follow("123").await, Err(Error::NotAuthenticated)));
    assert!(matches!(api.get_timeline().await, Err(Error::NotAuthenticated)));
    assert!(matches!(
        api.get_total_user_feed("123", None).await,
        Err(Error::NotAuthenticated)
    ));

    assert_eq!(api.total_requests(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_closes_session() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/logout/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    assert!(api.logout().await);

    let session = api.session().await;
    assert_eq!(session.state, SessionState::LoggedOut);
    assert!(session.csrf_token.is_empty());
    assert!(matches!(api.follow("123").await, Err(Error::NotAuthenticated)));
    assert_eq!(api.total_requests(), 3);
}

#[tokio::test]
async fn test_rejected_logout_keeps_session() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/logout/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/friendships/create/123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    assert!(!api.logout().await);
    assert!(api.is_authenticated().await);
    assert_eq!(api.session().await.state, SessionState::Authenticated);

    // The gate stays open, so writes still reach the network
    api.follow("123").await.unwrap();
    assert_eq!(requests_to(&server, "/api/v1/friendships/create/123/").await.len(), 1);
    assert_eq!(api.total_requests(), 4);
}

#[tokio::test]
async fn test_direct_message_body() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/direct_v2/threads/broadcast/text/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(2)
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    api.send_direct_item(&DirectItem::message("hi"), &["10", "20"], None)
        .await
        .unwrap();
    api.send_direct_item(
        &DirectItem::message("again"),
        &["10"],
        Some(&ThreadTarget::quoted("99")),
    )
    .await
    .unwrap();

    let sent = requests_to(&server, "/api/v1/direct_v2/threads/broadcast/text/").await;
    let first = signed_payload(&sent[0].body);
    assert_eq!(first["recipient_users"], "[[10,20]]");
    assert_eq!(first["text"], "hi");
    assert_eq!(first["action"], "send_item");
    assert_eq!(first["_uid"], "42");
    assert!(first.get("thread_ids").is_none());
    assert_eq!(first["client_context"].as_str().unwrap().len(), 36);

    let second = signed_payload(&sent[1].body);
    assert_eq!(second["thread_ids"], "[\"99\"]");
}

#[tokio::test]
async fn test_total_followers_follows_cursor() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "user": {"pk": 7, "follower_count": 3}
        })))
        .mount(&server)
        .await;
    // Registered first so it wins over the catch-all first page below
    Mock::given(method("GET"))
        .and(path("/api/v1/friendships/7/followers/"))
        .and(query_param("max_id", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"pk": 3}],
            "big_list": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/friendships/7/followers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"pk": 1}, {"pk": 2}],
            "big_list": true,
            "next_max_id": "c1"
        })))
        .mount(&server)
        .await;
    let (api, sleeper) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let followers = api.get_total_followers("7", None).await.unwrap();

    let pks: Vec<u64> = followers.iter().filter_map(|u| u["pk"].as_u64()).collect();
    assert_eq!(pks, vec![1, 2, 3]);
    assert_eq!(requests_to(&server, "/api/v1/friendships/7/followers/").await.len(), 2);
    assert!(sleeper.waits().is_empty());

    let first_two = api.get_total_followers("7", Some(2)).await.unwrap();
    assert_eq!(first_two.len(), 2);
}

#[tokio::test]
async fn test_total_followers_without_user_object() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let err = api.get_total_followings("7", None).await.unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_private_user_feed_is_empty() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/feed/user/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let items = api.get_total_user_feed("7", None).await.unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_hashtag_feed_stops_at_amount() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/feed/tag/rust/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
            "next_max_id": "next"
        })))
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let items = api.get_total_hashtag_feed("rust", Some(5)).await.unwrap();

    assert_eq!(items.len(), 5);
    assert_eq!(requests_to(&server, "/api/v1/feed/tag/rust/").await.len(), 2);
}

#[tokio::test]
async fn test_address_book_sync_posts_plain_form() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_login_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/address_book/link/"))
        .and(query_param("include", "extra_display_name,thumbnails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    let (api, _) = create_test_api(&server, MemoryCredentialStore::default());
    login(&api).await;

    let contacts = json!([{"first_name": "Ann", "phone_numbers": ["+100"]}]);
    api.sync_from_address_book(&contacts).await.unwrap();

    let sent = requests_to(&server, "/api/v1/address_book/link/").await;
    let body = std::str::from_utf8(&sent[0].body).unwrap();
    let encoded = body.strip_prefix("contacts=").unwrap();
    let decoded: serde_json::Value =
        serde_json::from_str(&urlencoding::decode(encoded).unwrap()).unwrap();
    assert_eq!(decoded, contacts);
    assert!(!body.contains("signed_body"));
}

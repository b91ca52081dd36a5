//! Integration tests for HttpUserApi against a mock backend


use auth_session::{AuthError, Credentials, FilePart, HttpUserApi, Registration, UserApi, UserChanges};
use serde_json::json;
use test_utils::{test_config, user_token, MockResponseBuilder, RequestCounter};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn api_for(server: &MockServer) -> (HttpUserApi, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(&server.uri(), dir.path());
    (HttpUserApi::new(&config).expect("api"), dir)
}

fn credentials() -> Credentials {
    Credentials {
        email: "ana@example.com".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_login_returns_bare_token() {
    let server = MockServer::start().await;
    let token = user_token("1");

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockResponseBuilder::bare(&token)))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    assert_eq!(api.login(&credentials()).await.unwrap(), token);
}

#[tokio::test]
async fn test_login_accepts_plain_text_token() {
    let server = MockServer::start().await;
    let token = user_token("1");

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(token.clone()))
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    assert_eq!(api.login(&credentials()).await.unwrap(), token);
}

#[tokio::test]
async fn test_register_reads_encrypted_field() {
    let server = MockServer::start().await;
    let token = user_token("2");

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .and(body_json(json!({
            "email": "bea@example.com",
            "password": "pw",
            "name": "Bea"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(MockResponseBuilder::encrypted(&token)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    let registration = Registration {
        email: "bea@example.com".to_string(),
        password: "pw".to_string(),
        name: Some("Bea".to_string()),
        ..Default::default()
    };
    assert_eq!(api.register(&registration).await.unwrap(), token);
}

#[tokio::test]
async fn test_register_without_token_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    let result = api.register(&Registration::default()).await;
    assert!(matches!(result, Err(AuthError::MissingToken)));
}

#[tokio::test]
async fn test_fetch_user_by_id() {
    let server = MockServer::start().await;
    let token = user_token("42");

    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockResponseBuilder::encrypted(&token)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    assert_eq!(api.fetch_user("42").await.unwrap(), token);
}

/// An id is one path segment; separators inside it cannot reach other endpoints.
#[tokio::test]
async fn test_user_id_is_escaped_in_path() {
    let server = MockServer::start().await;
    let token = user_token("1");

    Mock::given(method("GET"))
        .and(|req: &Request| req.url.path() == "/users/1%2F..%2F..%2Fauth%2Flogin")
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockResponseBuilder::encrypted(&token)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    assert_eq!(api.fetch_user("1/../../auth/login").await.unwrap(), token);
}

#[tokio::test]
async fn test_user_url_keeps_api_base_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/7"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(&format!("{}/api/", server.uri()), dir.path());
    let api = HttpUserApi::new(&config).expect("api");

    let changes = UserChanges::new().field("name", "Ana");
    assert_eq!(api.update_user("7", changes).await.unwrap(), 202);
}

#[tokio::test]
async fn test_update_sends_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users/7"))
        .and(|req: &Request| {
            let body = String::from_utf8_lossy(&req.body);
            body.contains("form-data; name=\"name\"")
                && body.contains("Ana")
                && body.contains("filename=\"avatar.png\"")
        })
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    let changes = UserChanges::new().field("name", "Ana").file(FilePart {
        field: "image".to_string(),
        file_name: "avatar.png".to_string(),
        mime: Some("image/png".to_string()),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    });

    assert_eq!(api.update_user("7", changes).await.unwrap(), 202);
}

#[tokio::test]
async fn test_update_is_not_retried() {
    let server = MockServer::start().await;
    let counter = RequestCounter::new();
    let seen = counter.clone();

    Mock::given(method("PUT"))
        .and(path("/users/7"))
        .respond_with(move |_req: &Request| {
            seen.increment();
            ResponseTemplate::new(503)
        })
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    let result = api.update_user("7", UserChanges::new().field("name", "Ana")).await;

    assert_eq!(result.unwrap_err().status_code(), Some(503));
    assert_eq!(counter.get(), 1);
}

/// Transient failures are retried for token requests.
#[tokio::test]
async fn test_login_retried_on_server_error() {
    let server = MockServer::start().await;
    let counter = RequestCounter::new();
    let seen = counter.clone();
    let token = user_token("3");
    let body = MockResponseBuilder::bare(&token);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(move |_req: &Request| {
            if seen.increment() < 2 {
                ResponseTemplate::new(503).set_body_string("Service Unavailable")
            } else {
                ResponseTemplate::new(200).set_body_json(body.clone())
            }
        })
        .expect(3)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    assert_eq!(api.login(&credentials()).await.unwrap(), token);
    assert_eq!(counter.get(), 3);
}

/// Client errors fail fast.
#[tokio::test]
async fn test_login_unauthorized_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"Unauthorized"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    let err = api.login(&credentials()).await.unwrap_err();

    match err {
        AuthError::Status { code, body } => {
            assert_eq!(code, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_retries_exhausted_returns_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let (api, _dir) = api_for(&server).await;
    let err = api.fetch_user("1").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

//! End-to-end tests for bearer attachment, the bounded 401 retry, and the
//! single-flight refresh.

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use marigold_client::ApiError;
use marigold_integration_tests::{TestEnv, user_body};

fn empty_page() -> serde_json::Value {
    serde_json::json!({"count": 0, "next": null, "previous": null, "results": []})
}

#[tokio::test]
async fn test_retried_request_uses_the_new_token() {
    let env = TestEnv::start().await;
    env.seed_tokens("old-access", "refresh-token");

    Mock::given(method("GET"))
        .and(path("/orders/"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Given token not valid for any token type"
        })))
        .mount(&env.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access": "new-access" })),
        )
        .expect(1)
        .mount(&env.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orders/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&env.server)
        .await;

    let page = env.api.list_orders().await.expect("retried request");

    assert_eq!(page.count, 0);
    assert_eq!(env.stored_access().as_deref(), Some("new-access"));
}

#[tokio::test]
async fn test_second_401_propagates_without_second_retry() {
    let env = TestEnv::start().await;
    env.seed_tokens("old-access", "refresh-token");

    // Every attempt is rejected, including the one retry.
    Mock::given(method("GET"))
        .and(path("/accounts/profile/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Given token not valid for any token type"
        })))
        .expect(2)
        .mount(&env.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access": "new-access" })),
        )
        .expect(1)
        .mount(&env.server)
        .await;

    let err = env.api.profile().await.expect_err("must fail");

    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_refresh_failure_propagates_original_401_and_clears_tokens() {
    let env = TestEnv::start().await;
    env.seed_tokens("old-access", "refresh-token");

    Mock::given(method("GET"))
        .and(path("/accounts/profile/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Given token not valid for any token type"
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Token is invalid or expired"
        })))
        .mount(&env.server)
        .await;

    let err = env.api.profile().await.expect_err("must fail");

    // The caller sees the original authorization failure, not the refresh's.
    assert!(matches!(&err, ApiError::Unauthorized(detail)
        if detail == "Given token not valid for any token type"));
    assert!(env.stored_access().is_none());
    assert!(env.stored_refresh().is_none());
}

#[tokio::test]
async fn test_401_without_stored_tokens_propagates() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/profile/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Authentication credentials were not provided."
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let err = env.api.profile().await.expect_err("must fail");

    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let env = TestEnv::start().await;
    env.seed_tokens("old-access", "refresh-token");

    Mock::given(method("GET"))
        .and(path("/accounts/profile/"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Given token not valid for any token type"
        })))
        .mount(&env.server)
        .await;

    // The delay keeps the exchange in flight while the other callers hit
    // their own 401s and queue up on the gate.
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access": "new-access" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&env.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/profile/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(1)))
        .mount(&env.server)
        .await;

    let (a, b, c, d) = tokio::join!(
        env.api.profile(),
        env.api.profile(),
        env.api.profile(),
        env.api.profile(),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok() && d.is_ok());
    assert_eq!(env.stored_access().as_deref(), Some("new-access"));
}

#[tokio::test]
async fn test_refresh_rotates_refresh_token_when_returned() {
    let env = TestEnv::start().await;
    env.seed_tokens("old-access", "old-refresh");

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": "new-access",
            "refresh": "new-refresh",
        })))
        .mount(&env.server)
        .await;

    env.api.refresh_tokens(None).await.expect("refresh");

    assert_eq!(env.stored_access().as_deref(), Some("new-access"));
    assert_eq!(env.stored_refresh().as_deref(), Some("new-refresh"));
}

#[tokio::test]
async fn test_refresh_without_refresh_token_fails_fast() {
    let env = TestEnv::start().await;

    let err = env.api.refresh_tokens(None).await.expect_err("must fail");

    assert!(matches!(err, ApiError::NoRefreshToken));
}

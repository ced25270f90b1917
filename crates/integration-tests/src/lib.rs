//! Shared support for end-to-end SDK tests.
//!
//! Each test gets a [`TestEnv`]: a `wiremock` stub backend plus an SDK
//! instance wired to it with its own temporary data directory, so token and
//! cart state never leaks between tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use tempfile::TempDir;
use wiremock::MockServer;

use marigold_client::{ApiClient, AuthSession, ClientConfig, TokenKind};

/// Forge an unsigned JWT in the backend's shape.
///
/// `expires_in` is seconds relative to now; negative values produce an
/// already-expired token.
#[must_use]
pub fn forge_token(token_type: &str, user_id: i32, expires_in: i64) -> String {
    let now = Utc::now().timestamp();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "exp": now + expires_in,
            "iat": now,
            "jti": "0123456789abcdef",
            "token_type": token_type,
            "user_id": user_id,
        })
        .to_string(),
    );
    format!("{header}.{payload}.test-signature")
}

/// Profile endpoint body for the test user.
#[must_use]
pub fn user_body(user_id: i32) -> serde_json::Value {
    serde_json::json!({
        "id": user_id,
        "username": "jdoe",
        "email": "jdoe@example.com",
        "first_name": "Jo",
        "last_name": "Doe",
        "profile": {
            "phone_number": null,
            "address": null,
            "city": null,
            "state": null,
            "postal_code": null,
            "country": null,
            "profile_picture": null,
            "date_of_birth": null,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }
    })
}

/// Product listing body with a single summary entry.
#[must_use]
pub fn product_page_body() -> serde_json::Value {
    serde_json::json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [product_summary_body()]
    })
}

/// One product in the listing shape.
#[must_use]
pub fn product_summary_body() -> serde_json::Value {
    serde_json::json!({
        "id": 3,
        "name": "Linen Shirt",
        "slug": "linen-shirt",
        "category": {"id": 1, "name": "Shirts", "slug": "shirts", "description": null},
        "price": "49.90",
        "featured_image": null,
        "in_stock": true
    })
}

/// Order detail body.
#[must_use]
pub fn order_body(order_id: i32) -> serde_json::Value {
    serde_json::json!({
        "id": order_id,
        "first_name": "Jo",
        "last_name": "Doe",
        "email": "jdoe@example.com",
        "address": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postal_code": "62701",
        "country": "US",
        "phone": "555-0100",
        "total_price": "99.80",
        "status": "pending",
        "payment_id": null,
        "created_at": "2026-02-01T08:00:00Z",
        "updated_at": "2026-02-01T08:00:00Z",
        "items": [{
            "id": 1,
            "product": product_summary_body(),
            "price": "49.90",
            "quantity": 2,
            "color": "white",
            "size": "M"
        }],
        "payment": null
    })
}

/// A stub backend plus an SDK wired to it.
pub struct TestEnv {
    pub server: MockServer,
    pub api: ApiClient,
    pub session: AuthSession,
    data_dir: TempDir,
}

impl TestEnv {
    /// Start a stub backend and an SDK with a fresh data directory.
    ///
    /// # Panics
    ///
    /// Panics when the temporary directory or configuration cannot be set
    /// up; tests have nothing to recover to.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let data_dir = TempDir::new().expect("tempdir");
        let config = ClientConfig::new(&server.uri(), data_dir.path()).expect("config");
        let api = ApiClient::new(&config);
        let session = AuthSession::new(api.clone());
        Self {
            server,
            api,
            session,
            data_dir,
        }
    }

    /// The SDK's data directory.
    #[must_use]
    pub fn data_dir(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Seed the token store directly, as if a login already happened.
    ///
    /// # Panics
    ///
    /// Panics when the store cannot be written.
    pub fn seed_tokens(&self, access: &str, refresh: &str) {
        let store = self.api.token_store();
        store.set(TokenKind::Access, access).expect("set access");
        store.set(TokenKind::Refresh, refresh).expect("set refresh");
    }

    /// Stored access token, if any.
    ///
    /// # Panics
    ///
    /// Panics when the store cannot be read.
    #[must_use]
    pub fn stored_access(&self) -> Option<String> {
        self.api.token_store().get(TokenKind::Access).expect("get access")
    }

    /// Stored refresh token, if any.
    ///
    /// # Panics
    ///
    /// Panics when the store cannot be read.
    #[must_use]
    pub fn stored_refresh(&self) -> Option<String> {
        self.api
            .token_store()
            .get(TokenKind::Refresh)
            .expect("get refresh")
    }
}

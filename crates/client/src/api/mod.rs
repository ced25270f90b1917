//! HTTP client for the storefront REST API.
//!
//! # Architecture
//!
//! - Every request reads the current access token fresh from the
//!   [`TokenStore`] and attaches it as a bearer credential, so a token
//!   written by a refresh is picked up on the next call automatically.
//! - An authorization failure (401) triggers a token refresh and a re-issue
//!   of the original request, bounded by an explicit [`RetryPolicy`]
//!   (default: at most one retry per request).
//! - Concurrent refreshes are single-flighted: callers serialize on an async
//!   gate, and a caller whose failed token was already replaced while it
//!   waited skips the duplicate exchange.
//! - Catalog reads are cached in-memory via `moka` (5-minute TTL).
//!
//! # Example
//!
//! ```rust,ignore
//! use marigold_client::{ApiClient, ClientConfig, ProductQuery};
//!
//! let api = ApiClient::new(&ClientConfig::from_env()?);
//! let page = api.list_products(&ProductQuery::default()).await?;
//! for product in &page.results {
//!     println!("{} - {}", product.name, product.price);
//! }
//! ```

mod account;
mod cache;
mod catalog;
mod orders;

pub use account::{
    PasswordChange, ProfileFields, ProfilePicture, ProfileUpdate, RegisterRequest, RegisteredUser,
};
pub use catalog::{ProductQuery, SortBy};
pub use orders::{NewOrder, NewOrderItem};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::{StorageError, TokenStore};
use crate::token::TokenKind;

use cache::CacheValue;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Bounded retry policy for authorization failures.
///
/// A 401 response triggers a token refresh and a re-issue of the original
/// request at most `max_auth_retries` times. The bound is a visible
/// parameter rather than an incidental flag on the request, which rules out
/// retry loops on a persistently invalid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum refresh-and-retry attempts per request.
    pub max_auth_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_auth_retries: 1 }
    }
}

/// Token pair returned by the issue and refresh endpoints.
///
/// The refresh endpoint may rotate the refresh token; when it does not, the
/// field is absent and the stored refresh token stays valid.
#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Client for the storefront REST API.
///
/// Cheap to clone; all clones share one connection pool, token store,
/// refresh gate, and response cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    tokens: TokenStore,
    refresh_gate: Mutex<()>,
    cache: Cache<String, CacheValue>,
    policy: RetryPolicy,
}

impl ApiClient {
    /// Create a client with the default retry policy.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_policy(config, RetryPolicy::default())
    }

    /// Create a client with an explicit authorization retry policy.
    #[must_use]
    pub fn with_policy(config: &ClientConfig, policy: RetryPolicy) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base: config.api_base.clone(),
                tokens: TokenStore::new(&config.data_dir),
                refresh_gate: Mutex::new(()),
                cache,
                policy,
            }),
        }
    }

    /// The token store backing this client.
    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Current access token, read fresh from storage.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] when storage is unavailable.
    pub fn access_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.inner.tokens.get(TokenKind::Access)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path)?)
    }

    // =========================================================================
    // Token endpoints (credentials in, no bearer, no auth retry)
    // =========================================================================

    /// Exchange credentials for a token pair and store it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on rejected credentials; errors
    /// pass through untouched for the caller to display.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint("token/")?;
        let response = self
            .inner
            .http
            .post(url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let pair: TokenPairResponse = parse_json(response).await?;
        self.inner.tokens.set(TokenKind::Access, &pair.access)?;
        if let Some(refresh) = pair.refresh {
            self.inner.tokens.set(TokenKind::Refresh, &refresh)?;
        }
        debug!("token pair stored");
        Ok(())
    }

    /// Delete both stored tokens. Missing tokens are fine.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when storage is unavailable; both slots
    /// are attempted regardless.
    pub fn clear_tokens(&self) -> Result<(), StorageError> {
        let access = self.inner.tokens.remove(TokenKind::Access);
        let refresh = self.inner.tokens.remove(TokenKind::Refresh);
        access.and(refresh)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Single-flight: concurrent callers serialize on an internal gate. A
    /// caller passes the access token that just failed as `superseded`; if
    /// the stored token already differs by the time the gate is acquired,
    /// another caller completed the refresh and this one returns without a
    /// duplicate exchange.
    ///
    /// On any exchange failure both tokens are deleted before the error
    /// propagates: a failed refresh always leaves a clean logged-out state
    /// rather than stale tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NoRefreshToken`] when no refresh token is stored,
    /// otherwise the transport or response error from the exchange.
    pub async fn refresh_tokens(&self, superseded: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.inner.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited on the gate.
        if let Some(failed) = superseded
            && let Some(current) = self.inner.tokens.get(TokenKind::Access)?
            && current != failed
        {
            debug!("access token already replaced, skipping refresh");
            return Ok(());
        }

        let Some(refresh) = self.inner.tokens.get(TokenKind::Refresh)? else {
            return Err(ApiError::NoRefreshToken);
        };

        match self.exchange_refresh(&refresh).await {
            Ok(pair) => {
                self.inner.tokens.set(TokenKind::Access, &pair.access)?;
                if let Some(rotated) = pair.refresh {
                    self.inner.tokens.set(TokenKind::Refresh, &rotated)?;
                }
                debug!("access token refreshed");
                Ok(())
            }
            Err(err) => {
                // A failed refresh forces a clean logged-out state.
                if let Err(remove_err) = self.clear_tokens() {
                    warn!(error = %remove_err, "failed to clear tokens after refresh failure");
                }
                Err(err)
            }
        }
    }

    async fn exchange_refresh(&self, refresh: &str) -> Result<TokenPairResponse, ApiError> {
        let url = self.endpoint("token/refresh/")?;
        let response = self
            .inner
            .http
            .post(url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        parse_json(response).await
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Issue a request and decode the JSON response body.
    pub(crate) async fn send<T: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<T, ApiError> {
        let response = self.execute(spec).await?;
        parse_json(response).await
    }

    /// Issue a request, applying the bounded authorization retry policy.
    pub(crate) async fn execute(&self, spec: &RequestSpec) -> Result<reqwest::Response, ApiError> {
        let policy = self.inner.policy;
        let mut auth_retries = 0;
        loop {
            let bearer = self.access_token()?;
            let response = self.build(spec, bearer.as_deref())?.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED
                && auth_retries < policy.max_auth_retries
            {
                auth_retries += 1;
                let unauthorized = ApiError::from_response(response).await;
                debug!(path = spec.path.as_str(), "authorization failed, refreshing token");
                match self.refresh_tokens(bearer.as_deref()).await {
                    Ok(()) => continue,
                    Err(refresh_err) => {
                        debug!(error = %refresh_err, "token refresh failed");
                        // The original authorization failure is the caller's error.
                        return Err(unauthorized);
                    }
                }
            }

            if !response.status().is_success() {
                return Err(ApiError::from_response(response).await);
            }

            return Ok(response);
        }
    }

    fn build(
        &self,
        spec: &RequestSpec,
        bearer: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.endpoint(&spec.path)?;
        let mut request = self.inner.http.request(spec.method.clone(), url);

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        request = match &spec.body {
            RequestBody::None => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::FileUpload {
                part,
                file_name,
                bytes,
            } => {
                // Rebuilt per attempt; multipart forms are not reusable.
                let file = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone());
                request.multipart(reqwest::multipart::Form::new().part(*part, file))
            }
        };

        Ok(request)
    }
}

/// What a request sends.
pub(crate) enum RequestBody {
    None,
    Json(serde_json::Value),
    FileUpload {
        part: &'static str,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// A re-buildable request description, so a retried request can be issued
/// again with a fresh bearer token.
pub(crate) struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl RequestSpec {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
        }
    }

    pub(crate) fn post(path: impl Into<String>, json: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Json(json),
        }
    }

    pub(crate) fn put(path: impl Into<String>, json: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Json(json),
        }
    }

    pub(crate) fn upload(
        path: impl Into<String>,
        part: &'static str,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::FileUpload {
                part,
                file_name,
                bytes,
            },
        }
    }

    pub(crate) fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

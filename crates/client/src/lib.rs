//! Marigold Client - SDK for the Marigold storefront REST API.
//!
//! A thin data-fetching layer over the storefront backend: product browsing
//! and search, cart management, checkout, JWT authentication with silent
//! refresh, and account/order management. Tokens and the cart persist to
//! files under a per-user data directory.
//!
//! # Architecture
//!
//! - [`ApiClient`] wraps `reqwest` and attaches the current access token to
//!   every request, read fresh from the [`TokenStore`] at request time. A 401
//!   triggers a single-flight token refresh and at most one retry, governed
//!   by an explicit [`RetryPolicy`].
//! - [`AuthSession`] is the session state machine
//!   (Unknown → Checking → Authenticated | Unauthenticated), constructed
//!   explicitly and passed by handle - no process-wide singleton.
//! - [`CartStore`] owns the locally persisted cart, independent of the
//!   session.
//! - Catalog reads are cached in-memory via `moka` (5-minute TTL).
//!
//! # Example
//!
//! ```rust,ignore
//! use marigold_client::{ApiClient, AuthSession, ClientConfig};
//!
//! let config = ClientConfig::from_env()?;
//! let api = ApiClient::new(&config);
//! let session = AuthSession::new(api.clone());
//!
//! // Restore any stored session, refreshing an expired token silently.
//! session.check_auth_status().await?;
//!
//! let products = api.list_products(&Default::default()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod token;

pub use api::{
    ApiClient, NewOrder, NewOrderItem, PasswordChange, ProductQuery, ProfileFields,
    ProfilePicture, ProfileUpdate, RegisterRequest, RegisteredUser, RetryPolicy, SortBy,
};
pub use cart::{CartItem, CartStore};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, FieldErrors};
pub use session::{AuthSession, SessionState};
pub use storage::{StorageError, TokenStore};
pub use token::TokenKind;

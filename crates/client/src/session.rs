//! Authentication session state machine.
//!
//! [`AuthSession`] is an explicitly constructed handle - no process-wide
//! singleton. Construct it, call [`AuthSession::check_auth_status`] to
//! restore any stored session, and drop it (or call
//! [`AuthSession::logout`]) to tear down.
//!
//! States: `Unknown → Checking → Authenticated | Unauthenticated`.
//! The session is `Authenticated` iff a non-expired access token exists AND
//! the user profile was fetched successfully; it is derived state, rebuilt
//! from the token store on every start and never persisted itself.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::User;
use crate::storage::StorageError;
use crate::token;

/// Session lifecycle states.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Startup; nothing checked yet.
    #[default]
    Unknown,
    /// Session restoration in progress.
    Checking,
    /// A valid token and a fetched user profile.
    Authenticated(User),
    /// No usable session.
    Unauthenticated,
}

impl SessionState {
    /// Whether the session holds an authenticated user.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Whether session restoration has not settled yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Unknown | Self::Checking)
    }

    /// The cached user, when authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Handle to the authentication session. Clones share state.
#[derive(Clone)]
pub struct AuthSession {
    api: ApiClient,
    state: Arc<RwLock<SessionState>>,
}

impl AuthSession {
    /// Create a session in the `Unknown` state.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(SessionState::Unknown)),
        }
    }

    /// The API client backing this session.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.read_state().clone()
    }

    /// Whether the session holds an authenticated user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_authenticated()
    }

    /// Whether session restoration has not settled yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading()
    }

    /// The cached user, when authenticated.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read_state().user().cloned()
    }

    /// Restore the session from stored tokens.
    ///
    /// Reads the access token (absent: `Unauthenticated`); refreshes it if
    /// expired (refresh failure: logout, `Unauthenticated`); then fetches
    /// the profile (failure: `Unauthenticated`). Returns the settled state.
    ///
    /// # Errors
    ///
    /// Only storage failures surface as errors; authentication failures
    /// settle into `Unauthenticated`.
    pub async fn check_auth_status(&self) -> Result<SessionState, ApiError> {
        self.set_state(SessionState::Checking);

        let Some(access) = self.api.access_token()? else {
            return Ok(self.set_state(SessionState::Unauthenticated));
        };

        if token::is_expired(&access) {
            if let Err(err) = self.api.refresh_tokens(Some(&access)).await {
                debug!(error = %err, "token refresh during session restore failed");
                if let Err(storage_err) = self.logout() {
                    warn!(error = %storage_err, "failed to clear tokens during logout");
                }
                return Ok(self.state());
            }
        }

        match self.api.profile().await {
            Ok(user) => Ok(self.set_state(SessionState::Authenticated(user))),
            Err(err) => {
                // Treated as a full auth failure; logged so a transient
                // profile outage stays distinguishable from a bad token.
                warn!(error = %err, "profile fetch during session restore failed");
                Ok(self.set_state(SessionState::Unauthenticated))
            }
        }
    }

    /// Log in with credentials and load the user profile.
    ///
    /// # Errors
    ///
    /// Errors propagate untouched for the caller to display. When the
    /// profile fetch after a successful token issue fails, the tokens stay
    /// stored but the session remains `Unauthenticated`.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        self.api.login(username, password).await?;

        match self.api.profile().await {
            Ok(user) => {
                self.set_state(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(err) => {
                self.set_state(SessionState::Unauthenticated);
                Err(err)
            }
        }
    }

    /// Delete both tokens, clear the cached user, and settle into
    /// `Unauthenticated` unconditionally. No network effect.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when a token slot could not be removed;
    /// the in-memory state is cleared regardless.
    pub fn logout(&self) -> Result<(), StorageError> {
        let result = self.api.clear_tokens();
        self.set_state(SessionState::Unauthenticated);
        result
    }

    /// Re-fetch the profile and overwrite the cached user.
    ///
    /// Used after any profile-mutating operation to keep the cache
    /// consistent.
    ///
    /// # Errors
    ///
    /// Errors propagate to the caller; the cached user is left untouched.
    pub async fn refresh_user(&self) -> Result<User, ApiError> {
        let user = self.api.profile().await?;

        let mut guard = self.write_state();
        if guard.is_authenticated() {
            *guard = SessionState::Authenticated(user.clone());
        }
        drop(guard);

        Ok(user)
    }

    fn set_state(&self, next: SessionState) -> SessionState {
        *self.write_state() = next.clone();
        next
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_loading() {
        let state = SessionState::default();
        assert!(state.is_loading());
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }

    #[test]
    fn test_checking_is_loading() {
        assert!(SessionState::Checking.is_loading());
        assert!(!SessionState::Unauthenticated.is_loading());
    }
}

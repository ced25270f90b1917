//! Access token inspection.
//!
//! The backend issues JWT pairs. The client never verifies signatures - that
//! is the server's job - it only decodes the embedded claims to decide when a
//! token needs refreshing and which user it belongs to.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;

use marigold_core::UserId;

/// Which token slot to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer credential attached to API calls.
    Access,
    /// Longer-lived credential used solely to obtain a new access token.
    Refresh,
}

impl TokenKind {
    pub(crate) const fn file_name(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Claims embedded in a backend-issued token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued-at, seconds since epoch.
    #[serde(default)]
    pub iat: i64,
    /// Unique token identifier.
    #[serde(default)]
    pub jti: String,
    /// `"access"` or `"refresh"`.
    #[serde(default)]
    pub token_type: String,
    /// Subject of the token.
    pub user_id: UserId,
}

/// Decode the claims of a compact JWT without verifying its signature.
///
/// Returns `None` for anything that is not a well-formed three-part token
/// with a base64url JSON payload.
#[must_use]
pub fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether a token's expiry claim has passed.
///
/// Fail-closed: a token that cannot be decoded is treated as expired, which
/// forces the refresh/logout path rather than silent use of a malformed
/// token.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    decode_claims(token).is_none_or(|claims| claims.exp <= Utc::now().timestamp())
}

/// User id claimed by a token, if it decodes.
#[must_use]
pub fn user_id(token: &str) -> Option<UserId> {
    decode_claims(token).map(|claims| claims.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forge(exp: i64, user_id: i32) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "exp": exp,
                "iat": 1_700_000_000,
                "jti": "0123456789abcdef",
                "token_type": "access",
                "user_id": user_id,
            })
            .to_string(),
        );
        format!("{header}.{payload}.forged-signature")
    }

    #[test]
    fn test_expired_token() {
        let past = Utc::now().timestamp() - 3600;
        assert!(is_expired(&forge(past, 1)));
    }

    #[test]
    fn test_expiry_at_now_is_expired() {
        assert!(is_expired(&forge(Utc::now().timestamp(), 1)));
    }

    #[test]
    fn test_valid_token() {
        let future = Utc::now().timestamp() + 3600;
        assert!(!is_expired(&forge(future, 1)));
    }

    #[test]
    fn test_undecodable_token_is_expired() {
        assert!(is_expired("not-a-jwt"));
        assert!(is_expired(""));
        assert!(is_expired("a.b.c"));
        assert!(is_expired("a.!!!invalid-base64!!!.c"));
    }

    #[test]
    fn test_decode_claims() {
        let token = forge(2_000_000_000, 7);
        let claims = decode_claims(&token).expect("claims");
        assert_eq!(claims.exp, 2_000_000_000);
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.user_id, UserId::new(7));
    }

    #[test]
    fn test_user_id() {
        let token = forge(2_000_000_000, 42);
        assert_eq!(user_id(&token), Some(UserId::new(42)));
        assert_eq!(user_id("garbage"), None);
    }
}

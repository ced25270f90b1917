//! Error taxonomy for the storefront API.
//!
//! One [`ApiError`] covers the whole surface: transport failures,
//! authorization failures, validation failures with per-field messages,
//! not-found, storage failures, and everything else as
//! [`ApiError::Unexpected`]. Calling code renders these directly; there is no
//! centralized error boundary.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

/// Per-field validation messages, as returned by the backend on a 400.
///
/// The backend shape is `{"field": ["message", ...]}`; non-field errors
/// arrive under `"detail"` or `"non_field_errors"`. Client-side validation
/// produces the same shape so callers render both sources identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a response body into field errors.
    ///
    /// A body that is not a JSON object becomes a single
    /// `non_field_errors` entry carrying the raw text.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) else {
            return Self::single("non_field_errors", body.trim());
        };

        let mut errors = Self::default();
        for (field, value) in map {
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        match item {
                            serde_json::Value::String(message) => errors.insert(&field, &message),
                            other => errors.insert(&field, &other.to_string()),
                        }
                    }
                }
                serde_json::Value::String(message) => errors.insert(&field, &message),
                other => errors.insert(&field, &other.to_string()),
            }
        }
        errors
    }

    /// A single field/message pair.
    #[must_use]
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    /// Append a message to a field.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    /// Messages for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether any messages are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (field, messages) pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

/// Errors from the storefront API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network/transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Authorization failure (expired or invalid credential).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Validation failure with per-field messages.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client-side storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A token refresh was required but no refresh token is stored.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// A request path did not form a valid URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Any other non-success response.
    #[error("unexpected response ({status}): {body}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl ApiError {
    /// Classify a non-success response by status, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(detail_message(&body)),
            StatusCode::NOT_FOUND => Self::NotFound(detail_message(&body)),
            StatusCode::BAD_REQUEST => Self::Validation(FieldErrors::parse(&body)),
            _ => Self::Unexpected {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Whether this is an authorization failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Pull the `detail` message out of a backend error body, falling back to
/// the raw text.
fn detail_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_errors() {
        let body = r#"{"old_password": ["Wrong password."], "email": ["Enter a valid email address.", "Already in use."]}"#;
        let errors = FieldErrors::parse(body);
        assert_eq!(
            errors.get("old_password"),
            Some(&["Wrong password.".to_owned()][..])
        );
        assert_eq!(errors.get("email").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_parse_non_object_body() {
        let errors = FieldErrors::parse("Bad Request");
        assert_eq!(
            errors.get("non_field_errors"),
            Some(&["Bad Request".to_owned()][..])
        );
    }

    #[test]
    fn test_parse_string_values() {
        let errors = FieldErrors::parse(r#"{"detail": "Invalid input."}"#);
        assert_eq!(errors.get("detail"), Some(&["Invalid input.".to_owned()][..]));
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = FieldErrors::default();
        errors.insert("password2", "Passwords do not match.");
        errors.insert("username", "This field may not be blank.");
        assert_eq!(
            errors.to_string(),
            "password2: Passwords do not match.; username: This field may not be blank."
        );
    }

    #[test]
    fn test_detail_message_fallback() {
        assert_eq!(
            detail_message(r#"{"detail": "Token is invalid or expired"}"#),
            "Token is invalid or expired"
        );
        assert_eq!(detail_message("plain text"), "plain text");
        assert_eq!(detail_message(r#"{"other": 1}"#), r#"{"other": 1}"#);
    }
}

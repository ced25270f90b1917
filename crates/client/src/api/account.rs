//! Account management: registration, profile, password, picture.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use marigold_core::Email;

use crate::error::{ApiError, FieldErrors};
use crate::models::User;
use crate::storage::StorageError;

use super::{ApiClient, RequestSpec};

/// Minimum password length accepted client-side. The backend applies its
/// own, stricter validators on top.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Confirmation copy of `password`.
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    /// Client-side pre-validation, producing the same per-field shape the
    /// backend returns so callers render both sources the same way.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors when any check fails.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.username.trim().is_empty() {
            errors.insert("username", "This field may not be blank.");
        }
        if let Err(err) = Email::parse(&self.email) {
            errors.insert("email", &err.to_string());
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password",
                "Password must be at least 8 characters long.",
            );
        }
        if self.password != self.password2 {
            errors.insert("password2", "Passwords do not match.");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// User record returned by the registration endpoint. The register
/// serializer omits the profile sub-record, so this is narrower than
/// [`User`].
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<i32>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Editable profile sub-record fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Profile update payload: names plus the editable profile fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub profile: ProfileFields,
}

/// Password change payload.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    /// Confirmation copy of `new_password`.
    pub confirm_password: String,
}

/// Response from the picture upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePicture {
    /// URL of the stored picture.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl ApiClient {
    /// Register a new account.
    ///
    /// Registration does not issue tokens; follow up with a login to enter
    /// an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] from the client-side checks or the
    /// backend's response.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        request.validate().map_err(ApiError::Validation)?;
        let spec = RequestSpec::post("accounts/register/", serde_json::to_value(request)?);
        self.send(&spec).await
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a usable session.
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.send(&RequestSpec::get("accounts/profile/")).await
    }

    /// Update names and profile fields; returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects a field.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let spec = RequestSpec::put("accounts/profile/", serde_json::to_value(update)?);
        self.send(&spec).await
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] carrying the backend's field errors
    /// (wrong old password, weak new password).
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        let spec = RequestSpec::put("accounts/change-password/", serde_json::to_value(change)?);
        // Response body is a confirmation message; nothing to decode.
        self.execute(&spec).await?;
        Ok(())
    }

    /// Upload a new profile picture as a multipart PUT.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] when the file cannot be read, or the
    /// backend's response error.
    pub async fn upload_profile_picture(&self, path: &Path) -> Result<ProfilePicture, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            ApiError::Storage(StorageError::Io {
                path: path.to_owned(),
                source,
            })
        })?;
        let file_name = path
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("profile-picture")
            .to_owned();

        let spec = RequestSpec::upload(
            "accounts/profile-picture/",
            "profile_picture",
            file_name,
            bytes,
        );
        self.send(&spec).await
    }
}

//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MARIGOLD_API_BASE` - Base URL of the storefront API
//!   (default: `http://127.0.0.1:8000/api/`)
//! - `MARIGOLD_DATA_DIR` - Directory for the token files and the cart
//!   (default: the platform data directory + `marigold`)

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/";
const DATA_SUBDIR: &str = "marigold";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    /// No data directory could be determined for this platform.
    #[error("no data directory available; set MARIGOLD_DATA_DIR")]
    NoDataDir,
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront API. Always ends with a slash so request
    /// paths join onto it.
    pub api_base: Url,
    /// Directory holding the token files and the cart.
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `MARIGOLD_API_BASE` does not parse as a
    /// URL, or no data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_base =
            env::var("MARIGOLD_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_owned());
        let api_base = parse_api_base(&raw_base).map_err(|err| {
            ConfigError::InvalidEnvVar("MARIGOLD_API_BASE".to_owned(), err.to_string())
        })?;

        let data_dir = match env::var("MARIGOLD_DATA_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .map(|dir| dir.join(DATA_SUBDIR))
                .ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self { api_base, data_dir })
    }

    /// Build a configuration directly, normalizing the base URL to end with
    /// a slash.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if `api_base` does not parse
    /// as a URL.
    pub fn new(api_base: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let api_base = parse_api_base(api_base).map_err(|err| {
            ConfigError::InvalidEnvVar("api_base".to_owned(), err.to_string())
        })?;
        Ok(Self {
            api_base,
            data_dir: data_dir.into(),
        })
    }
}

/// Parse a base URL, appending the trailing slash relative joins require.
fn parse_api_base(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let config = ClientConfig::new("http://shop.example.com/api", "/tmp/marigold")
            .expect("config");
        assert_eq!(config.api_base.as_str(), "http://shop.example.com/api/");
        assert_eq!(
            config.api_base.join("products/").expect("join").as_str(),
            "http://shop.example.com/api/products/"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_kept() {
        let config =
            ClientConfig::new("http://shop.example.com/api/", "/tmp/marigold").expect("config");
        assert_eq!(config.api_base.as_str(), "http://shop.example.com/api/");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ClientConfig::new("not a url", "/tmp/marigold"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}

//! Error types for mangarelay operations.
//!
//! This module defines the main error type [`RelayError`] which represents
//! every failure that can occur while fetching origin pages, decoding opaque
//! tokens, and extracting records from HTML.
//!
//! # Example
//!
//! ```rust
//! use mangarelay_core::{RelayError, decode_url};
//!
//! match decode_url("%%%") {
//!     Ok(url) => println!("decoded {url}"),
//!     Err(RelayError::Decode(reason)) => println!("bad token: {reason}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! ```

use thiserror::Error;

/// Main error type for scraping and proxy operations.
///
/// Origin-specific "missing page" signals (redirects, 404-titled pages, HTML
/// served in place of an image) all collapse into [`RelayError::NotFound`]
/// before they leave the fetch layer.
#[derive(Error, Debug)]
pub enum RelayError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other transport problems. It is never recovered locally.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided or produced while joining origin paths.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The origin page or asset does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An opaque token is not valid URL-safe base64 or not valid UTF-8.
    #[error("Invalid token: {0}")]
    Decode(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RelayError {
    /// Returns true when the error means "this resource cannot exist".
    ///
    /// A token that cannot be decoded cannot reference a real resource, so
    /// callers treat [`RelayError::Decode`] the same as [`RelayError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, RelayError::NotFound(_) | RelayError::Decode(_))
    }
}

/// Result type alias for RelayError.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = RelayError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(RelayError::NotFound("x".into()).is_not_found());
        assert!(RelayError::Decode("x".into()).is_not_found());
        assert!(!RelayError::ConfigError("x".into()).is_not_found());
        assert!(!RelayError::Timeout { timeout: 1 }.is_not_found());
    }
}

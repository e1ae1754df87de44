//! Opaque URL tokens.
//!
//! Origin chapter and image URLs never reach API clients directly. They are
//! wrapped in URL-safe base64 (padding kept) so a token fits in a single path
//! segment, and unwrapped again when the client sends the token back.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use url::Url;

use crate::{RelayError, Result};

/// Encodes an absolute URL into an opaque, path-safe token.
///
/// # Example
///
/// ```rust
/// use mangarelay_core::{decode_url, encode_url};
///
/// let token = encode_url("https://chapmanganato.to/manga-aa1/chapter-1");
/// assert!(!token.contains('/'));
/// assert_eq!(decode_url(&token).unwrap(), "https://chapmanganato.to/manga-aa1/chapter-1");
/// ```
pub fn encode_url(url: &str) -> String {
    URL_SAFE.encode(url.as_bytes())
}

/// Decodes a token produced by [`encode_url`].
///
/// # Errors
///
/// Returns [`RelayError::Decode`] when the token is not canonical URL-safe
/// base64 or its payload is not UTF-8.
pub fn decode_url(token: &str) -> Result<String> {
    let bytes = URL_SAFE
        .decode(token.as_bytes())
        .map_err(|e| RelayError::Decode(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| RelayError::Decode(e.to_string()))
}

/// Decodes a token that must carry an absolute http(s) URL.
///
/// A token that decodes to anything else cannot name an origin resource, so
/// it fails the same way a malformed token does.
pub fn decode_origin_url(token: &str) -> Result<Url> {
    let decoded = decode_url(token)?;
    let url = Url::parse(&decoded).map_err(|e| RelayError::Decode(format!("{}: {}", e, decoded)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RelayError::Decode(format!("unsupported scheme: {}", other))),
    }
}

//! Image proxying.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::fetch::{ByteChunks, Fetcher};
use crate::{Result, decode_origin_url};

/// A proxied image, ready to be written to a response.
pub struct ImageAsset {
    /// Percent-decoded final path segment of the origin URL. Empty when the
    /// path ends in `/`; callers pick their own display name then.
    pub filename: String,
    /// `content-type` and `content-length`, each present only when the origin
    /// sent it.
    pub headers: BTreeMap<&'static str, String>,
    pub chunks: ByteChunks,
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("filename", &self.filename)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Resolves opaque image tokens into origin byte streams.
#[derive(Debug, Clone)]
pub struct ImageProxy {
    fetcher: Fetcher,
}

impl ImageProxy {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Decodes `token` and opens the origin image.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RelayError::Decode`] for a malformed token and
    /// [`crate::RelayError::NotFound`] when the origin answers with HTML.
    pub async fn resolve(&self, token: &str) -> Result<ImageAsset> {
        let url = decode_origin_url(token)?;
        let stream = self.fetcher.open_stream(url.as_str()).await?;

        let mut headers = BTreeMap::new();
        if let Some(length) = stream.content_length {
            headers.insert("content-length", length);
        }
        if let Some(content_type) = stream.content_type {
            headers.insert("content-type", content_type);
        }

        Ok(ImageAsset { filename: filename_from_url(&url), headers, chunks: stream.chunks })
    }
}

/// Percent-decoded last path segment of `url`.
pub fn filename_from_url(url: &Url) -> String {
    let decoded = urlencoding::decode_binary(url.path().as_bytes());
    let path = String::from_utf8_lossy(&decoded);
    path.rsplit('/').next().unwrap_or_default().to_string()
}

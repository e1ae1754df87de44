//! Outbound requests to the origin site.
//!
//! The origin signals a missing page in three different ways: a redirect, a
//! 200 page titled "404 Not Found", or an HTML page served where an image was
//! requested. [`Fetcher`] folds all of them into [`RelayError::NotFound`] so
//! nothing above this module branches on origin quirks.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, REFERER};
use reqwest::{Client, Response, redirect};
use tracing::debug;
use url::Url;

use crate::{RelayError, Result};

/// Size of every buffer yielded by [`ImageStream::chunks`], except the last.
pub const CHUNK_SIZE: usize = 16 * 1024;

static NOT_FOUND_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title>.*404 Not Found.*</title>").unwrap());

/// HTTP client configuration for origin requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds. Applies to whole document fetches and to
    /// image streams up to the arrival of response headers.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Lazily-read response body in fixed-size buffers.
///
/// Dropping the stream drops the underlying response and closes its
/// connection, whether or not the body was fully read.
pub type ByteChunks = BoxStream<'static, Result<Vec<u8>>>;

/// An open binary response: headers are known, the body is still on the wire.
pub struct ImageStream {
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub chunks: ByteChunks,
}

impl fmt::Debug for ImageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Issues GET requests against the origin site.
///
/// Redirects are never followed: the origin uses them to say "missing".
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    referer: String,
}

impl Fetcher {
    /// Builds a fetcher whose image requests carry `referer`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Http`] if the TLS backend cannot be initialized.
    pub fn new(config: FetchConfig, referer: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.timeout))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config, referer: referer.into() })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn map_send_error(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() { RelayError::Timeout { timeout: self.config.timeout } } else { RelayError::Http(err) }
    }

    /// Fetches an HTML page.
    ///
    /// # Errors
    ///
    /// - [`RelayError::NotFound`] if the origin answers with a redirect or a
    ///   page titled "404 Not Found".
    /// - [`RelayError::InvalidUrl`] if `url` does not parse.
    /// - [`RelayError::Timeout`] / [`RelayError::Http`] for transport failures.
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedPage> {
        let parsed = Url::parse(url).map_err(|e| RelayError::InvalidUrl(format!("{}: {}", e, url)))?;

        debug!(%url, "fetching document");

        let response = self
            .client
            .get(parsed)
            .timeout(Duration::from_secs(self.config.timeout))
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_redirection() {
            debug!(%url, %status, "origin redirected, treating as missing");
            return Err(RelayError::NotFound(format!("{} not found", url)));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if NOT_FOUND_TITLE_RE.is_match(&body) {
            debug!(%url, "origin served a 404 page");
            return Err(RelayError::NotFound(format!("{} not found", url)));
        }

        Ok(FetchedPage { status: status.as_u16(), body })
    }

    /// Opens a streamed binary download with the origin referer attached.
    ///
    /// Headers are read before this returns; the body is read only as
    /// [`ImageStream::chunks`] is polled.
    ///
    /// # Errors
    ///
    /// - [`RelayError::NotFound`] if the response is `text/html`, which is
    ///   how the origin answers for a missing asset.
    /// - [`RelayError::Timeout`] if headers do not arrive within the
    ///   configured timeout. The body itself is not time-bounded.
    /// - [`RelayError::InvalidUrl`], [`RelayError::Http`] as for
    ///   [`Fetcher::fetch_document`].
    pub async fn open_stream(&self, url: &str) -> Result<ImageStream> {
        let parsed = Url::parse(url).map_err(|e| RelayError::InvalidUrl(format!("{}: {}", e, url)))?;

        debug!(%url, "opening stream");

        let request = self.client.get(parsed).header(REFERER, &self.referer).send();
        let response = tokio::time::timeout(Duration::from_secs(self.config.timeout), request)
            .await
            .map_err(|_| RelayError::Timeout { timeout: self.config.timeout })?
            .map_err(|e| self.map_send_error(e))?;

        let headers = response.headers();
        let content_type = header_string(headers, &CONTENT_TYPE);

        if content_type.as_deref().is_some_and(|ct| ct.starts_with("text/html")) {
            debug!(%url, "origin served HTML instead of an image");
            return Err(RelayError::NotFound("Image Not Found".to_string()));
        }

        let content_length = header_string(headers, &CONTENT_LENGTH);

        Ok(ImageStream { content_type, content_length, chunks: fixed_chunks(response) })
    }
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

struct ChunkState {
    /// `None` once the body is exhausted or failed.
    response: Option<Response>,
    buffer: Vec<u8>,
}

/// Re-slices a response body into [`CHUNK_SIZE`] buffers.
///
/// After a transport error the stream yields that error once and ends.
fn fixed_chunks(response: Response) -> ByteChunks {
    let state = ChunkState { response: Some(response), buffer: Vec::with_capacity(CHUNK_SIZE) };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.buffer.len() >= CHUNK_SIZE {
                let rest = state.buffer.split_off(CHUNK_SIZE);
                let chunk = std::mem::replace(&mut state.buffer, rest);
                return Some((Ok(chunk), state));
            }

            let Some(response) = state.response.as_mut() else {
                if state.buffer.is_empty() {
                    return None;
                }
                let chunk = std::mem::take(&mut state.buffer);
                return Some((Ok(chunk), state));
            };

            match response.chunk().await {
                Ok(Some(bytes)) => state.buffer.extend_from_slice(&bytes),
                Ok(None) => state.response = None,
                Err(err) => {
                    state.response = None;
                    state.buffer.clear();
                    return Some((Err(RelayError::Http(err)), state));
                }
            }
        }
    })
    .boxed()
}

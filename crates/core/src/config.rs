//! Origin site and link rewriting configuration.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::{RelayError, Result};

/// Which origin host a manga detail page lives on.
///
/// Internal manga ids carry this as a `cu-` or `mu-` prefix so the detail
/// lookup knows which base URL to join the id onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourcePrefix {
    /// The chapter host (`chapmanganato.to` by default).
    Cu,
    /// The main listing host (`manganato.com` by default).
    Mu,
}

impl SourcePrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cu => "cu",
            Self::Mu => "mu",
        }
    }

    /// Splits an internal manga id such as `mu-manga-ab1234` into its prefix
    /// and the origin path (`manga-ab1234`).
    ///
    /// Returns `None` when the id has no known prefix.
    pub fn split_id(id: &str) -> Option<(Self, &str)> {
        let (prefix, rest) = id.split_once('-')?;
        let prefix = prefix.parse().ok()?;
        Some((prefix, rest))
    }
}

impl FromStr for SourcePrefix {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cu" => Ok(Self::Cu),
            "mu" => Ok(Self::Mu),
            _ => Err(RelayError::NotFound(format!("unknown source prefix: {}", s))),
        }
    }
}

impl fmt::Display for SourcePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the origin site lives.
///
/// The defaults point at manganato. Tests and alternative deployments swap
/// in their own hosts.
#[derive(Debug, Clone)]
pub struct OriginConfig {
    /// Listing of recently updated manga. Search paths are resolved
    /// relative to this URL.
    pub updates_url: String,
    /// Host whose manga links are rewritten with the `cu-` prefix.
    pub chapter_host: String,
    /// Base URL for `cu-` detail pages.
    pub chapter_base: String,
    /// Base URL for `mu-` detail pages.
    pub manga_base: String,
    /// Referer sent with image requests; the origin refuses hotlinks without it.
    pub referer: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            updates_url: "https://manganato.com/genre-all".to_string(),
            chapter_host: "chapmanganato.to".to_string(),
            chapter_base: "https://chapmanganato.to".to_string(),
            manga_base: "https://manganato.com".to_string(),
            referer: "https://manganato.com".to_string(),
        }
    }
}

impl OriginConfig {
    /// Builds a config whose every URL points at a single base, deriving the
    /// chapter host from it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigError`] if `base` is not an absolute URL
    /// with a host.
    pub fn single_host(base: &str) -> Result<Self> {
        let parsed = parse_absolute(base)?;
        let host = host_with_port(&parsed);
        let base = base.trim_end_matches('/').to_string();

        Ok(Self {
            updates_url: format!("{}/genre-all", base),
            chapter_host: host,
            chapter_base: base.clone(),
            manga_base: base.clone(),
            referer: base,
        })
    }

    /// Moves `cu-` detail lookups to `base` and classifies listing links by
    /// its host from then on.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigError`] if `base` is not an absolute URL.
    pub fn set_chapter_base(&mut self, base: &str) -> Result<()> {
        let parsed = parse_absolute(base)?;
        self.chapter_host = host_with_port(&parsed);
        self.chapter_base = base.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Detail-page base URL for a source prefix.
    pub fn base_for(&self, prefix: SourcePrefix) -> &str {
        match prefix {
            SourcePrefix::Cu => &self.chapter_base,
            SourcePrefix::Mu => &self.manga_base,
        }
    }

    /// Checks that every URL field is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("updates_url", &self.updates_url),
            ("chapter_base", &self.chapter_base),
            ("manga_base", &self.manga_base),
            ("referer", &self.referer),
        ] {
            parse_absolute(value).map_err(|e| RelayError::ConfigError(format!("{}: {}", name, e)))?;
        }

        if self.chapter_host.is_empty() {
            return Err(RelayError::ConfigError("chapter_host is empty".to_string()));
        }

        Ok(())
    }
}

/// Path prefixes for links rewritten into the API's own URL space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBase {
    pub mangas: String,
    pub chapters: String,
    pub images: String,
}

impl Default for LinkBase {
    fn default() -> Self {
        Self { mangas: "/mangas/".to_string(), chapters: "/chapters/".to_string(), images: "/images/".to_string() }
    }
}

impl LinkBase {
    /// Prepends a route prefix such as `/v1` to every base.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            mangas: format!("{}/mangas/", prefix),
            chapters: format!("{}/chapters/", prefix),
            images: format!("{}/images/", prefix),
        }
    }
}

/// Joins a path onto a link base, keeping exactly one slash between them.
pub(crate) fn join_path(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn host_with_port(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

fn parse_absolute(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| RelayError::ConfigError(format!("{} ({})", e, value)))?;
    if url.host_str().is_none() {
        return Err(RelayError::ConfigError(format!("URL has no host: {}", value)));
    }
    Ok(url)
}

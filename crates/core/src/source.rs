//! Fetch-and-extract entry points, one per origin page shape.

use url::Url;

use crate::config::{LinkBase, OriginConfig, SourcePrefix};
use crate::extract::{extract_chapter_images, extract_detail, extract_listing, extract_search, sanitize_query};
use crate::fetch::{FetchConfig, Fetcher};
use crate::models::{ImageRef, ListingEntry, MangaDetail, SearchEntry};
use crate::parse::Document;
use crate::{RelayError, Result, decode_origin_url};

/// Scrapes one origin site.
///
/// Holds no per-request state; share one instance across all requests.
///
/// # Example
///
/// ```rust,no_run
/// use mangarelay_core::{FetchConfig, LinkBase, MangaSource, OriginConfig};
///
/// # async fn run() -> mangarelay_core::Result<()> {
/// let source = MangaSource::from_config(FetchConfig::default(), OriginConfig::default(), LinkBase::default())?;
/// for entry in source.updates(1).await? {
///     println!("{} {:?}", entry.url, entry.title);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MangaSource {
    fetcher: Fetcher,
    origin: OriginConfig,
    links: LinkBase,
}

impl MangaSource {
    pub fn new(fetcher: Fetcher, origin: OriginConfig, links: LinkBase) -> Self {
        Self { fetcher, origin, links }
    }

    /// Validates `origin` and builds a fetcher that sends its referer.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigError`] for an invalid origin URL, or
    /// [`RelayError::Http`] if the HTTP client cannot be built.
    pub fn from_config(fetch: FetchConfig, origin: OriginConfig, links: LinkBase) -> Result<Self> {
        origin.validate()?;
        let fetcher = Fetcher::new(fetch, origin.referer.clone())?;
        Ok(Self::new(fetcher, origin, links))
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn origin(&self) -> &OriginConfig {
        &self.origin
    }

    pub fn links(&self) -> &LinkBase {
        &self.links
    }

    /// Origin URL of a listing page. Page 1 has no page suffix.
    pub fn updates_url(&self, page: u32) -> String {
        if page > 1 {
            format!("{}/{}", self.origin.updates_url.trim_end_matches('/'), page)
        } else {
            self.origin.updates_url.clone()
        }
    }

    /// Origin URL of a search page for an already-sanitized or raw query.
    pub fn search_url(&self, query: &str, page: u32) -> Result<String> {
        let base = Url::parse(&self.origin.updates_url).map_err(|e| RelayError::InvalidUrl(e.to_string()))?;
        let mut url = base
            .join(&format!("search/story/{}", sanitize_query(query)))
            .map_err(|e| RelayError::InvalidUrl(e.to_string()))?
            .to_string();

        if page > 1 {
            url.push_str(&format!("?page={}", page));
        }

        Ok(url)
    }

    /// Origin URL of a detail page.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] for an empty id or one that would
    /// resolve outside the prefix's origin host.
    pub fn detail_url(&self, id: &str, prefix: SourcePrefix) -> Result<String> {
        if id.is_empty() {
            return Err(RelayError::NotFound(format!("empty {} manga id", prefix)));
        }

        let base = Url::parse(self.origin.base_for(prefix)).map_err(|e| RelayError::InvalidUrl(e.to_string()))?;
        let url = base.join(id).map_err(|_| RelayError::NotFound(format!("invalid manga id: {}", id)))?;

        if url.host_str() != base.host_str() || url.port_or_known_default() != base.port_or_known_default() {
            return Err(RelayError::NotFound(format!("manga id leaves origin: {}", id)));
        }

        Ok(url.to_string())
    }

    /// Recently updated manga, one origin page at a time.
    pub async fn updates(&self, page: u32) -> Result<Vec<ListingEntry>> {
        let fetched = self.fetcher.fetch_document(&self.updates_url(page)).await?;
        let doc = Document::parse(&fetched.body);
        extract_listing(&doc, &self.links, &self.origin.chapter_host)
    }

    /// Searches by title. Characters outside `[a-zA-Z0-9]` become `_`.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchEntry>> {
        let url = self.search_url(query, page)?;
        let fetched = self.fetcher.fetch_document(&url).await?;
        let doc = Document::parse(&fetched.body);
        extract_search(&doc, &self.links, &self.origin.chapter_host)
    }

    /// Full metadata and chapter list for one manga.
    pub async fn detail(&self, id: &str, prefix: SourcePrefix) -> Result<MangaDetail> {
        let url = self.detail_url(id, prefix)?;
        let fetched = self.fetcher.fetch_document(&url).await?;
        let doc = Document::parse(&fetched.body);
        extract_detail(&doc, &self.links)
    }

    /// Page images of the chapter behind an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Decode`] for a malformed token and
    /// [`RelayError::NotFound`] when the origin has no such chapter.
    pub async fn chapter_images(&self, token: &str) -> Result<Vec<ImageRef>> {
        let url = decode_origin_url(token)?;
        let fetched = self.fetcher.fetch_document(url.as_str()).await?;
        let doc = Document::parse(&fetched.body);
        extract_chapter_images(&doc, &self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MangaSource {
        MangaSource::from_config(FetchConfig::default(), OriginConfig::default(), LinkBase::default()).unwrap()
    }

    #[test]
    fn test_updates_url() {
        let source = source();
        assert_eq!(source.updates_url(1), "https://manganato.com/genre-all");
        assert_eq!(source.updates_url(0), "https://manganato.com/genre-all");
        assert_eq!(source.updates_url(3), "https://manganato.com/genre-all/3");
    }

    #[test]
    fn test_search_url_sanitizes_query() {
        let source = source();
        assert_eq!(
            source.search_url("one/piece", 1).unwrap(),
            "https://manganato.com/search/story/one_piece"
        );
        assert_eq!(
            source.search_url("naruto", 2).unwrap(),
            "https://manganato.com/search/story/naruto?page=2"
        );
    }

    #[test]
    fn test_detail_url() {
        let source = source();
        assert_eq!(
            source.detail_url("manga-ab1234", SourcePrefix::Mu).unwrap(),
            "https://manganato.com/manga-ab1234"
        );
        assert_eq!(
            source.detail_url("manga-ab1234", SourcePrefix::Cu).unwrap(),
            "https://chapmanganato.to/manga-ab1234"
        );
    }

    #[test]
    fn test_detail_url_stays_on_origin() {
        let source = source();
        assert!(matches!(
            source.detail_url("https://evil.example/x", SourcePrefix::Mu),
            Err(RelayError::NotFound(_))
        ));
        assert!(matches!(
            source.detail_url("//evil.example/x", SourcePrefix::Mu),
            Err(RelayError::NotFound(_))
        ));
        assert!(matches!(source.detail_url("", SourcePrefix::Mu), Err(RelayError::NotFound(_))));
    }
}

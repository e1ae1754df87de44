//! Record extraction from parsed origin pages.
//!
//! Each function here is pure: it takes an already-parsed [`Document`] and
//! returns records in document order. Every outgoing link is rewritten into
//! the API's own URL space, either as an internal manga path or as an opaque
//! token from [`crate::codec`].

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::{LinkBase, host_with_port, join_path};
use crate::models::{ChapterRef, ImageRef, ListingEntry, MangaDetail, SearchEntry};
use crate::parse::{Document, Element};
use crate::{Result, encode_url, normalize_text};

static UPDATED_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bupdated\s*:\s*").unwrap());

static VIEW_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bview\s*:\s*").unwrap());

/// Rewrites an origin manga link into an internal path.
///
/// Links on `chapter_host` get the `cu-` prefix, every other host gets
/// `mu-`. The origin path, minus its leading slash, is joined onto
/// `mangas_base`. Returns `None` for an empty href.
///
/// # Example
///
/// ```rust
/// use mangarelay_core::extract::rewrite_manga_url;
///
/// assert_eq!(
///     rewrite_manga_url("https://chapmanganato.to/manga-ab1234", "/mangas/", "chapmanganato.to"),
///     Some("/mangas/cu-manga-ab1234".to_string())
/// );
/// assert_eq!(
///     rewrite_manga_url("https://manganato.com/manga-zz9", "/mangas/", "chapmanganato.to"),
///     Some("/mangas/mu-manga-zz9".to_string())
/// );
/// ```
pub fn rewrite_manga_url(href: &str, mangas_base: &str, chapter_host: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }

    let (host, path) = match Url::parse(href) {
        Ok(url) => (host_with_port(&url), url.path().to_string()),
        Err(_) => {
            let path = href.split(['?', '#']).next().unwrap_or_default();
            (String::new(), path.to_string())
        }
    };

    let prefix = if host == chapter_host { "cu" } else { "mu" };
    Some(join_path(
        mangas_base,
        &format!("{}-{}", prefix, path.trim_start_matches('/')),
    ))
}

/// Parses the chapter number from the trailing `-` token of a chapter URL.
///
/// `.../chapter-12.5` yields `12.5`; a non-numeric tail such as
/// `.../chapter-final` yields `None`.
pub fn chapter_number(url: &str) -> Option<f64> {
    let segment = url.rsplit('/').next()?;
    let token = segment.rsplit('-').next()?;
    token.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Replaces every character outside `[a-zA-Z0-9]` with `_`.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn split_authors(raw: &str) -> Vec<String> {
    raw.split(',').map(|part| part.trim().to_string()).collect()
}

fn first_attr(scope: &Element<'_>, selector: &str, attr: &str) -> Result<Option<String>> {
    Ok(scope
        .select(selector)?
        .iter()
        .find_map(|el| el.attr(attr))
        .map(str::to_string))
}

fn first_own_text(scope: &Element<'_>, selector: &str) -> Result<Option<String>> {
    Ok(scope.select(selector)?.iter().find_map(Element::own_text))
}

fn manga_url(item: &Element<'_>, links: &LinkBase, chapter_host: &str) -> Result<Option<String>> {
    Ok(first_attr(item, "a[href]", "href")?.and_then(|href| rewrite_manga_url(&href, &links.mangas, chapter_host)))
}

/// Extracts the recently-updated listing.
///
/// Items without a usable link are skipped rather than emitted with a null
/// URL.
pub fn extract_listing(doc: &Document, links: &LinkBase, chapter_host: &str) -> Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();

    for item in doc.select(r#"div[class*="content-genres-item"]"#)? {
        let Some(url) = manga_url(&item, links, chapter_host)? else {
            continue;
        };

        entries.push(ListingEntry {
            url,
            cover: first_attr(&item, "img[src]", "src")?,
            title: first_own_text(&item, "h3 > a")?,
            author: first_own_text(&item, r#"span[class="genres-item-author"]"#)?.map(|a| split_authors(&a)),
            views: first_own_text(&item, r#"span[class="genres-item-view"]"#)?,
            last_chapter: first_own_text(&item, r#"a[class*="genres-item-chap"]"#)?,
            last_update: first_own_text(&item, r#"span[class="genres-item-time"]"#)?,
        });
    }

    Ok(entries)
}

/// Extracts a search result page.
///
/// The first `item-time` span carries the update date and the second the
/// view count; both lose their "Updated :" / "View :" labels.
pub fn extract_search(doc: &Document, links: &LinkBase, chapter_host: &str) -> Result<Vec<SearchEntry>> {
    let mut entries = Vec::new();

    for item in doc.select(r#"div[class="search-story-item"]"#)? {
        let Some(url) = manga_url(&item, links, chapter_host)? else {
            continue;
        };

        let times = item.select(r#"span[class*="item-time"]"#)?;
        let last_update = times
            .first()
            .and_then(Element::own_text)
            .map(|t| UPDATED_LABEL_RE.replace_all(&t, "").into_owned());
        let views = times
            .get(1)
            .and_then(Element::own_text)
            .map(|t| VIEW_LABEL_RE.replace_all(&t, "").into_owned());

        entries.push(SearchEntry {
            url,
            cover: first_attr(&item, "img[src]", "src")?,
            title: first_own_text(&item, "h3 > a")?,
            author: first_own_text(&item, r#"span[class*="item-author"]"#)?.map(|a| split_authors(&a)),
            last_update,
            views,
        });
    }

    Ok(entries)
}

/// Sibling elements following every `cell` whose own text is `label`.
fn labelled<'a>(doc: &'a Document, cell: &str, sibling: &str, label: &str) -> Result<Vec<Element<'a>>> {
    Ok(doc
        .select(cell)?
        .into_iter()
        .filter(|el| el.has_own_text(label))
        .flat_map(|el| el.following_siblings_named(sibling))
        .collect())
}

fn table_text(doc: &Document, label: &str) -> Result<Option<String>> {
    Ok(labelled(doc, "td", "td", label)?.iter().find_map(Element::own_text))
}

fn table_links(doc: &Document, label: &str) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for cell in labelled(doc, "td", "td", label)? {
        texts.extend(cell.select("a")?.iter().filter_map(Element::own_text));
    }
    Ok(texts)
}

fn extent_text(doc: &Document, label: &str) -> Result<Option<String>> {
    Ok(
        labelled(doc, r#"div[class="story-info-right-extent"] span"#, "span", label)?
            .iter()
            .find_map(Element::own_text),
    )
}

fn extract_chapters(doc: &Document, links: &LinkBase) -> Result<Vec<ChapterRef>> {
    Ok(doc
        .select(r#"ul[class*="row-content-chapter"] a"#)?
        .iter()
        .filter_map(|anchor| {
            let href = anchor.attr("href").filter(|h| !h.is_empty())?;
            Some(ChapterRef {
                url: join_path(&links.chapters, &encode_url(href)),
                title: anchor.own_text(),
                number: chapter_number(href),
            })
        })
        .collect())
}

/// Extracts a manga detail page.
pub fn extract_detail(doc: &Document, links: &LinkBase) -> Result<MangaDetail> {
    let title = doc
        .select(r#"div[class="story-info-right"] > h1"#)?
        .iter()
        .find_map(Element::own_text);

    let cover = doc
        .select(r#"span[class*="info-image"] img[src]"#)?
        .iter()
        .find_map(|img| img.attr("src"))
        .map(str::to_string);

    let raw_description: String = doc
        .select(r#"div[class*="panel-story-info-description"]"#)?
        .iter()
        .map(Element::text)
        .collect();

    Ok(MangaDetail {
        title,
        cover,
        genres: table_links(doc, "Genres :")?,
        status: table_text(doc, "Status :")?,
        author: table_links(doc, "Author(s) :")?,
        views: extent_text(doc, "View :")?,
        last_update: extent_text(doc, "Updated :")?,
        description: normalize_text(&raw_description),
        chapters: extract_chapters(doc, links)?,
    })
}

/// Extracts the page images of a chapter reader, in reading order.
///
/// Images without a `src` attribute carry nothing to proxy and are skipped;
/// `order` counts only the emitted images.
pub fn extract_chapter_images(doc: &Document, links: &LinkBase) -> Result<Vec<ImageRef>> {
    Ok(doc
        .select(r#"div[class*="container-chapter-reader"] img"#)?
        .iter()
        .filter_map(|img| img.attr("src"))
        .enumerate()
        .map(|(order, src)| ImageRef { order, url: join_path(&links.images, &encode_url(src)) })
        .collect())
}

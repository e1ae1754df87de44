//! Records extracted from origin pages.
//!
//! Field names are snake_case; the HTTP layer rewrites keys to camelCase
//! with [`crate::casing`] right before serialization. Optional fields
//! serialize as `null`, never as empty strings.

use serde::Serialize;

/// One manga in the recently-updated listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    /// Internal path such as `/mangas/mu-manga-ab1234`.
    pub url: String,
    pub cover: Option<String>,
    pub title: Option<String>,
    pub author: Option<Vec<String>>,
    pub views: Option<String>,
    pub last_chapter: Option<String>,
    pub last_update: Option<String>,
}

/// One manga in a search result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub url: String,
    pub cover: Option<String>,
    pub title: Option<String>,
    pub author: Option<Vec<String>>,
    /// Date with the "Updated :" label removed.
    pub last_update: Option<String>,
    /// View count with the "View :" label removed.
    pub views: Option<String>,
}

/// Full metadata for a single manga.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MangaDetail {
    pub title: Option<String>,
    pub cover: Option<String>,
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub author: Vec<String>,
    pub views: Option<String>,
    pub last_update: Option<String>,
    pub description: Option<String>,
    /// Chapters in the order the origin lists them.
    pub chapters: Vec<ChapterRef>,
}

/// A link to one chapter of a manga.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterRef {
    /// Internal path carrying the opaque chapter token.
    pub url: String,
    pub title: Option<String>,
    pub number: Option<f64>,
}

/// One page image of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Zero-based position within the chapter.
    pub order: usize,
    /// Internal path carrying the opaque image token.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let chapter = ChapterRef { url: "/chapters/abc=".to_string(), title: None, number: None };
        assert_eq!(
            serde_json::to_value(&chapter).unwrap(),
            json!({"url": "/chapters/abc=", "title": null, "number": null})
        );
    }

    #[test]
    fn test_detail_lists_serialize_as_arrays() {
        let detail = MangaDetail {
            title: Some("Title".to_string()),
            cover: None,
            genres: vec![],
            status: None,
            author: vec!["A".to_string()],
            views: None,
            last_update: None,
            description: None,
            chapters: vec![],
        };
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["genres"], json!([]));
        assert_eq!(value["author"], json!(["A"]));
        assert_eq!(value["last_update"], json!(null));
        assert_eq!(value["description"], json!(null));
    }
}

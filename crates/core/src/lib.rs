//! Scraping core for a read-only manga listing API.
//!
//! Fetches origin pages, extracts listings, manga details and chapter image
//! lists into typed records, and proxies images as byte streams. Origin
//! chapter and image URLs are replaced with opaque tokens (see [`codec`]) so
//! clients never depend on the origin's URL layout.

pub mod casing;
pub mod codec;
pub mod config;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
#[cfg(feature = "fetch")]
pub mod image;
pub mod models;
pub mod normalize;
pub mod parse;
#[cfg(feature = "fetch")]
pub mod source;

pub use casing::{camelize_keys, to_camel_case};
pub use codec::{decode_origin_url, decode_url, encode_url};
pub use config::{LinkBase, OriginConfig, SourcePrefix};
pub use error::{RelayError, Result};
pub use extract::{
    chapter_number, extract_chapter_images, extract_detail, extract_listing, extract_search, rewrite_manga_url,
    sanitize_query,
};
#[cfg(feature = "fetch")]
pub use fetch::{ByteChunks, CHUNK_SIZE, FetchConfig, FetchedPage, Fetcher, ImageStream};
#[cfg(feature = "fetch")]
pub use image::{ImageAsset, ImageProxy, filename_from_url};
pub use models::{ChapterRef, ImageRef, ListingEntry, MangaDetail, SearchEntry};
pub use normalize::normalize_text;
pub use parse::Document;
#[cfg(feature = "fetch")]
pub use source::MangaSource;

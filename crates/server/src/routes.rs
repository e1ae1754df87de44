//! `/v1` route handlers.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use mangarelay_core::{ImageAsset, SourcePrefix};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::response::{ApiError, Resource, Success};

const FALLBACK_FILENAME: &str = "unknown.jpg";

#[derive(Debug, Default, Deserialize)]
pub struct MangaQuery {
    pub page: Option<String>,
    pub q: Option<String>,
}

/// A missing or blank `page` means page 1.
fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(1),
        Some(value) => value.parse().map_err(|_| ApiError::bad_param("page", value)),
    }
}

/// `GET /v1/mangas`: search when `q` is non-empty, otherwise the update listing.
pub async fn list_mangas(State(state): State<AppState>, Query(query): Query<MangaQuery>) -> Result<Response, ApiError> {
    let page = parse_page(query.page.as_deref())?;
    let message = "Latest manga updates fetched successful.";

    match query.q.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => {
            info!(query = q, page, "searching mangas");
            let entries = state.source.search(q, page).await?;
            Ok(Success::new(message, entries).into_response())
        }
        None => {
            info!(page, "listing latest updates");
            let entries = state.source.updates(page).await?;
            Ok(Success::new(message, entries).into_response())
        }
    }
}

/// `GET /v1/mangas/{prefix}-{id}`.
pub async fn get_manga(State(state): State<AppState>, Path(manga): Path<String>) -> Result<Response, ApiError> {
    let (prefix, id) = SourcePrefix::split_id(&manga).ok_or(ApiError::NotFound(Resource::Manga))?;

    info!(%prefix, id, "fetching manga detail");
    let detail = state
        .source
        .detail(id, prefix)
        .await
        .map_err(|e| ApiError::for_resource(Resource::Manga, e))?;

    Ok(Success::new("Latest manga info fetched successful.", detail).into_response())
}

/// `GET /v1/chapters/{token}`.
pub async fn get_chapter(State(state): State<AppState>, Path(token): Path<String>) -> Result<Response, ApiError> {
    info!(%token, "fetching chapter images");
    let images = state
        .source
        .chapter_images(&token)
        .await
        .map_err(|e| ApiError::for_resource(Resource::Chapter, e))?;

    Ok(Success::new("Chapter images fetched successful.", images).into_response())
}

/// `GET /v1/images/{token}`: streams the origin image through.
pub async fn get_image(State(state): State<AppState>, Path(token): Path<String>) -> Result<Response, ApiError> {
    info!(%token, "proxying image");
    let asset = state
        .images
        .resolve(&token)
        .await
        .map_err(|e| ApiError::for_resource(Resource::Image, e))?;

    Ok(image_response(asset))
}

fn image_response(asset: ImageAsset) -> Response {
    let ImageAsset { filename, headers, chunks } = asset;

    let mut response = (StatusCode::OK, Body::from_stream(chunks)).into_response();
    let response_headers = response.headers_mut();

    for (name, value) in headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response_headers.insert(HeaderName::from_static(name), value);
        }
    }
    response_headers.insert(CONTENT_DISPOSITION, content_disposition(&filename));

    response
}

/// `inline; filename="..."`, falling back to a fixed name when the derived
/// one is empty or not representable in a header.
fn content_disposition(filename: &str) -> HeaderValue {
    let name = if filename.is_empty() { FALLBACK_FILENAME } else { filename };
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");

    HeaderValue::from_bytes(format!("inline; filename=\"{}\"", escaped).as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("inline; filename=\"unknown.jpg\""))
}

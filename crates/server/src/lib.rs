//! HTTP surface for the manga relay.
//!
//! Wraps [`mangarelay_core`] in a read-only axum API under `/v1`. Handlers
//! only translate between HTTP and the core: all scraping, token handling and
//! image streaming lives in the core crate.

pub mod config;
pub mod response;
pub mod routes;

use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use mangarelay_core::{FetchConfig, ImageProxy, LinkBase, MangaSource, OriginConfig, Result};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::response::Success;

pub use config::ServerConfig;

/// Route prefix every internal link is rewritten under.
pub const API_PREFIX: &str = "/v1";

/// Shared handler state. Cloned per request; clones share one HTTP client.
#[derive(Debug, Clone)]
pub struct AppState {
    pub source: MangaSource,
    pub images: ImageProxy,
}

impl AppState {
    /// Builds the scraper and image proxy with links under [`API_PREFIX`].
    pub fn new(fetch: FetchConfig, origin: OriginConfig) -> Result<Self> {
        let source = MangaSource::from_config(fetch, origin, LinkBase::with_prefix(API_PREFIX))?;
        let images = ImageProxy::new(source.fetcher().clone());
        Ok(Self { source, images })
    }

    /// Upper bound for producing response headers: one origin round trip
    /// plus some slack. Image bodies stream past it.
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.fetcher().config().timeout + 5)
    }
}

async fn health() -> Success<()> {
    Success::new("OK", ())
}

/// The full application router.
pub fn app(state: AppState) -> Router {
    let timeout = state.request_timeout();
    let cors = CorsLayer::new().allow_methods([Method::GET]).allow_origin(Any);

    let v1 = Router::new()
        .route("/mangas", get(routes::list_mangas))
        .route("/mangas/{manga}", get(routes::get_manga))
        .route("/chapters/{token}", get(routes::get_chapter))
        .route("/images/{token}", get(routes::get_image));

    Router::new()
        .nest(API_PREFIX, v1)
        .route("/health", get(health))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

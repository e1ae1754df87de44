//! Environment-driven server configuration.

use std::net::SocketAddr;

use mangarelay_core::{FetchConfig, OriginConfig, RelayError, Result};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub fetch: FetchConfig,
    pub origin: OriginConfig,
}

impl ServerConfig {
    /// Reads `MANGARELAY_*` variables, falling back to the manganato defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigError`] for an unparsable address or
    /// timeout, or an origin URL that is not absolute.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_raw = var("MANGARELAY_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|e| RelayError::ConfigError(format!("MANGARELAY_ADDR: {} ({})", e, addr_raw)))?;

        let mut fetch = FetchConfig::default();
        if let Some(timeout) = var("MANGARELAY_TIMEOUT") {
            fetch.timeout = timeout
                .parse()
                .map_err(|e| RelayError::ConfigError(format!("MANGARELAY_TIMEOUT: {} ({})", e, timeout)))?;
        }
        if let Some(user_agent) = var("MANGARELAY_USER_AGENT") {
            fetch.user_agent = user_agent;
        }

        let mut origin = OriginConfig::default();
        if let Some(updates_url) = var("MANGARELAY_UPDATES_URL") {
            origin.updates_url = updates_url;
        }
        if let Some(chapter_base) = var("MANGARELAY_CHAPTER_BASE") {
            origin
                .set_chapter_base(&chapter_base)
                .map_err(|e| RelayError::ConfigError(format!("MANGARELAY_CHAPTER_BASE: {}", e)))?;
        }
        if let Some(manga_base) = var("MANGARELAY_MANGA_BASE") {
            origin.manga_base = manga_base;
        }
        if let Some(referer) = var("MANGARELAY_REFERER") {
            origin.referer = referer;
        }
        origin.validate()?;

        Ok(Self { addr, fetch, origin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.fetch.timeout, 30);
        assert_eq!(config.origin.chapter_host, "chapmanganato.to");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MANGARELAY_ADDR", "127.0.0.1:9000"),
            ("MANGARELAY_TIMEOUT", "5"),
            ("MANGARELAY_CHAPTER_BASE", "http://localhost:8081"),
            ("MANGARELAY_UPDATES_URL", "http://localhost:8080/genre-all"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.fetch.timeout, 5);
        assert_eq!(config.origin.chapter_host, "localhost:8081");
        assert_eq!(config.origin.chapter_base, "http://localhost:8081");
        assert_eq!(config.origin.updates_url, "http://localhost:8080/genre-all");
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("MANGARELAY_TIMEOUT", "  ")])).unwrap();
        assert_eq!(config.fetch.timeout, 30);
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            [("MANGARELAY_ADDR", "not an addr")],
            [("MANGARELAY_TIMEOUT", "soon")],
            [("MANGARELAY_MANGA_BASE", "/relative")],
            [("MANGARELAY_CHAPTER_BASE", "nope")],
        ] {
            let result = ServerConfig::from_lookup(lookup(&vars));
            assert!(matches!(result, Err(RelayError::ConfigError(_))), "{:?}", vars);
        }
    }
}

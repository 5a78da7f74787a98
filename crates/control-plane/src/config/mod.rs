// Server configuration loaded from environment variables
// Decision: A missing DATABASE_URL selects in-memory dev mode instead of failing
// Decision: APP_ENV defaults to "development"; production must opt out explicitly

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::HeaderValue;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Prefix for all API routes (e.g. "/api"), empty for none
    pub api_prefix: String,
    /// Origins allowed for cross-origin requests; empty means same-origin only
    pub cors_allowed_origins: Vec<HeaderValue>,
    /// PostgreSQL URL; `None` runs on in-memory storage
    pub database_url: Option<String>,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            api_prefix: String::new(),
            cors_allowed_origins: Vec::new(),
            database_url: None,
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:9000")?;

        Ok(Self {
            bind_addr,
            api_prefix: normalize_prefix(&std::env::var("API_PREFIX").unwrap_or_default()),
            cors_allowed_origins: parse_origins(
                &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            environment: std::env::var("APP_ENV")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment.as_str(), "development" | "dev" | "local")
    }
}

/// "api/" and "/api/" both become "/api"; "" and "/" mean no prefix
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Comma-separated origin list; unparsable entries are skipped
fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.api_prefix.is_empty());
        assert!(config.database_url.is_none());
        assert!(config.is_development());
    }

    #[test]
    fn test_production_is_not_development() {
        let config = ServerConfig {
            environment: "production".to_string(),
            ..Default::default()
        };
        assert!(!config.is_development());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/"), "/api");
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("https://a.example.com, ,https://b.example.com");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://b.example.com");
        assert!(parse_origins("").is_empty());
    }
}

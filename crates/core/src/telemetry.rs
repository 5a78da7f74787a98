// Telemetry Module
//
// Structured logging through tracing-subscriber (fmt layer + EnvFilter).
// Binaries call `init_telemetry(TelemetryConfig::from_env())` once at startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_LOG_FILTER: &str = "sportsboard_control_plane=debug,tower_http=debug";

// ============================================================================
// Telemetry Configuration
// ============================================================================

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Environment (e.g., "development", "production")
    pub environment: Option<String>,
    /// Log filter (e.g., "info", "sportsboard_control_plane=debug")
    pub log_filter: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "sportsboard".to_string(),
            environment: None,
            log_filter: None,
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `SERVICE_NAME`: Service name (default: "sportsboard")
    /// - `APP_ENV`: Deployment environment
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    /// - `LOG_FORMAT`: "json" for JSON output
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "sportsboard".to_string()),
            environment: std::env::var("APP_ENV").ok(),
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Effective filter directive
    pub fn filter_directive(&self) -> &str {
        self.log_filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Install the global tracing subscriber.
///
/// An unparsable filter falls back to the default one. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_telemetry(config: TelemetryConfig) {
    let filter = EnvFilter::try_new(config.filter_directive())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(
            service = %config.service_name,
            environment = config.environment.as_deref().unwrap_or("development"),
            "telemetry initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let config = TelemetryConfig::default();
        assert_eq!(config.filter_directive(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_blank_filter_uses_default() {
        let config = TelemetryConfig {
            log_filter: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.filter_directive(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_custom_filter() {
        let config = TelemetryConfig {
            log_filter: Some("info".to_string()),
            ..Default::default()
        };
        assert_eq!(config.filter_directive(), "info");
    }
}

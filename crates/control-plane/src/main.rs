// Sportsboard API server
// Decision: PostgreSQL when DATABASE_URL is set, otherwise in-memory dev mode
// Decision: The auth service doubles as the identity provider of the event actions

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sportsboard_control_plane::{
    api,
    auth::{self, AuthConfig, AuthService, AuthState},
    config::ServerConfig,
    openapi::ApiDoc,
    storage::StorageBackend,
};
use sportsboard_core::telemetry::{init_telemetry, TelemetryConfig};
use sportsboard_core::EventActions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; the environment may already be populated
    let _ = dotenvy::dotenv();

    // Configure via environment variables:
    // - RUST_LOG / LOG_LEVEL: Log filter (default: "sportsboard_control_plane=debug,tower_http=debug")
    // - LOG_FORMAT=json: structured output
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "sportsboard" {
        telemetry_config.service_name = "sportsboard-control-plane".to_string();
    }
    init_telemetry(telemetry_config);

    tracing::info!("sportsboard-control-plane starting...");

    let server_config = ServerConfig::from_env()?;

    let storage = match server_config.database_url.as_deref() {
        Some(url) => {
            let backend = StorageBackend::postgres(url)
                .await
                .context("Failed to initialize PostgreSQL storage")?;
            tracing::info!("Connected to database");
            backend
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running in dev mode with in-memory storage");
            StorageBackend::in_memory()
        }
    };

    // Load authentication configuration
    let mut auth_config = AuthConfig::from_env();
    auth_config.api_prefix = server_config.api_prefix.clone();
    tracing::info!(
        oauth = auth_config.oauth_enabled(),
        signup = auth_config.signup_enabled(),
        email_confirmation = auth_config.require_email_confirmation,
        "Authentication configured"
    );

    let auth_service = Arc::new(AuthService::new(auth_config, storage.clone()));
    let auth_state = AuthState::new(auth_service.clone(), server_config.is_development());

    let actions = EventActions::new(Arc::new(storage.clone()), auth_service);
    let events_state = api::events::AppState::new(actions);

    let health_state = HealthState {
        storage: if storage.is_dev_mode() {
            "memory"
        } else {
            "postgres"
        },
    };

    if !server_config.api_prefix.is_empty() {
        tracing::info!(prefix = %server_config.api_prefix, "API prefix configured");
    }

    let api_routes = Router::new()
        .merge(api::events::routes(events_state))
        .merge(api::sport_types::routes())
        .merge(auth::routes::routes(auth_state));

    // Build main router with health (not prefixed) and prefixed API routes
    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, &server_config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let cors_origins = server_config.cors_allowed_origins.clone();
    let app = if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true),
        )
    };

    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

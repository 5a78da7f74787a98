// Sport type catalogue
//
// The event form and the dashboard category filter offer these values.
// Events store sport_type as free text, so this list is advisory.

use axum::{routing::get, Json, Router};
use sportsboard_core::SPORT_TYPES;

use super::common::ListResponse;

/// Create sport type routes
pub fn routes() -> Router {
    Router::new().route("/v1/sport-types", get(list_sport_types))
}

/// GET /v1/sport-types - List the offered sport types
#[utoipa::path(
    get,
    path = "/v1/sport-types",
    responses(
        (status = 200, description = "Sport types in display order", body = ListResponse<String>),
    ),
    tag = "events"
)]
pub async fn list_sport_types() -> Json<ListResponse<String>> {
    Json(ListResponse::new(
        SPORT_TYPES.iter().map(|s| s.to_string()).collect(),
    ))
}

// OpenAPI document generation
//
// This module defines the OpenAPI document for the Sportsboard API.
// It is used by both the API server (for Swagger UI) and the
// export-openapi binary (for static document generation).

use crate::api;
use crate::api::ListResponse;
use crate::auth::routes as auth_routes;
use sportsboard_core::{DeletedEvent, Event, EventFilterInput, EventInput};
use utoipa::OpenApi;

/// OpenAPI documentation for the Sportsboard API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::events::create_event,
        api::events::list_events,
        api::events::get_event,
        api::events::update_event,
        api::events::delete_event,
        api::sport_types::list_sport_types,
    ),
    components(
        schemas(
            Event, DeletedEvent, EventInput, EventFilterInput,
            api::common::EventEnvelope,
            api::common::OptionalEventEnvelope,
            api::common::EventListEnvelope,
            api::common::DeletedEventEnvelope,
            api::common::FailureEnvelope,
            ListResponse<String>,
            // Auth types
            auth_routes::SignInRequest, auth_routes::SignUpRequest, auth_routes::SignUpResponse,
            auth_routes::TokenResponse, auth_routes::RefreshTokenRequest,
            auth_routes::UserInfoResponse, auth_routes::AuthConfigResponse,
        )
    ),
    tags(
        (name = "events", description = "Sports event management endpoints"),
    ),
    info(
        title = "Sportsboard API",
        version = "0.1.0",
        description = "API for creating, filtering and managing personal sports events",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI document as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}

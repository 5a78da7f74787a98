// Event action HTTP routes
// Decision: Handlers only translate HTTP into action calls; the action layer
// validates, authenticates and authorizes
// Decision: Path ids, query strings and JSON bodies are taken raw so malformed
// input still answers with the envelope instead of an axum rejection

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use sportsboard_core::{
    parse_input, ActionError, DeletedEvent, Event, EventActions, EventFilterInput, EventIdInput,
    EventInput, UpdateEventInput,
};
use utoipa::IntoParams;

use super::common::ActionResponse;
use crate::auth::RequestSession;

/// Query parameters for listing events
#[derive(Debug, serde::Deserialize, IntoParams)]
pub struct ListEventsQuery {
    /// Case-insensitive substring of the event name
    pub search: Option<String>,
    /// Exact sport type; "all" or empty disables the filter
    pub sport_type: Option<String>,
}

impl ListEventsQuery {
    /// Build from raw query pairs. A repeated key resolves to its first value.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        Self {
            search: first("search"),
            sport_type: first("sport_type"),
        }
    }
}

// ============================================
// App State and Routes
// ============================================

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub actions: EventActions,
}

impl AppState {
    pub fn new(actions: EventActions) -> Self {
        Self { actions }
    }
}

/// Create event routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events", post(create_event).get(list_events))
        .route(
            "/v1/events/:event_id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(state)
}

/// Decode a JSON body into an action input. An empty body counts as `{}`.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ActionError> {
    let value = if body.is_empty() {
        serde_json::Value::Object(Default::default())
    } else {
        serde_json::from_slice(body)
            .map_err(|e| ActionError::Validation(format!("Invalid input: {e}")))?
    };
    Ok(parse_input(value)?)
}

// ============================================
// HTTP Handlers
// ============================================

/// POST /v1/events - Create an event owned by the caller
#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = EventInput,
    responses(
        (status = 201, description = "Event created", body = super::common::EventEnvelope),
        (status = 400, description = "Invalid input", body = super::common::FailureEnvelope),
        (status = 401, description = "Not signed in", body = super::common::FailureEnvelope),
        (status = 500, description = "Store failure", body = super::common::FailureEnvelope)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    RequestSession(session): RequestSession,
    body: Bytes,
) -> ActionResponse<Event> {
    let input: EventInput = match decode_body(&body) {
        Ok(input) => input,
        Err(e) => return ActionResponse::failure(e),
    };
    ActionResponse::created(state.actions.create_event(&session, input).await)
}

/// GET /v1/events - List the caller's events
#[utoipa::path(
    get,
    path = "/v1/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Events ordered by date and time", body = super::common::EventListEnvelope),
        (status = 401, description = "Not signed in", body = super::common::FailureEnvelope),
        (status = 500, description = "Store failure", body = super::common::FailureEnvelope)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    RequestSession(session): RequestSession,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ActionResponse<Vec<Event>> {
    let query = ListEventsQuery::from_pairs(&pairs);
    let input = EventFilterInput {
        search: query.search,
        sport_type: query.sport_type,
    };
    ActionResponse::ok(state.actions.list_events(&session, input).await)
}

/// GET /v1/events/{event_id} - Get one of the caller's events
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "The event, or null when missing", body = super::common::OptionalEventEnvelope),
        (status = 400, description = "Invalid event ID", body = super::common::FailureEnvelope),
        (status = 401, description = "Not signed in", body = super::common::FailureEnvelope)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    RequestSession(session): RequestSession,
    Path(event_id): Path<String>,
) -> ActionResponse<Option<Event>> {
    let input = EventIdInput::new(event_id);
    ActionResponse::ok(state.actions.get_event_by_id(&session, input).await)
}

/// PUT /v1/events/{event_id} - Replace an event's fields
#[utoipa::path(
    put,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = EventInput,
    responses(
        (status = 200, description = "Event updated", body = super::common::EventEnvelope),
        (status = 400, description = "Invalid input", body = super::common::FailureEnvelope),
        (status = 401, description = "Not signed in", body = super::common::FailureEnvelope),
        (status = 404, description = "Missing or not owned by the caller", body = super::common::FailureEnvelope)
    ),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<AppState>,
    RequestSession(session): RequestSession,
    Path(event_id): Path<String>,
    body: Bytes,
) -> ActionResponse<Event> {
    let mut input: UpdateEventInput = match decode_body(&body) {
        Ok(input) => input,
        Err(e) => return ActionResponse::failure(e),
    };
    // The path is authoritative for the target
    input.id = Some(event_id);
    ActionResponse::ok(state.actions.update_event(&session, input).await)
}

/// DELETE /v1/events/{event_id} - Delete one of the caller's events
#[utoipa::path(
    delete,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event deleted", body = super::common::DeletedEventEnvelope),
        (status = 400, description = "Invalid event ID", body = super::common::FailureEnvelope),
        (status = 401, description = "Not signed in", body = super::common::FailureEnvelope),
        (status = 404, description = "Missing or not owned by the caller", body = super::common::FailureEnvelope)
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    RequestSession(session): RequestSession,
    Path(event_id): Path<String>,
) -> ActionResponse<DeletedEvent> {
    let input = EventIdInput::new(event_id);
    ActionResponse::ok(state.actions.delete_event(&session, input).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use sportsboard_core::{
        InMemoryEventStore, StaticIdentityProvider, EDIT_NOT_FOUND, UNAUTHORIZED_MESSAGE,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        store: InMemoryEventStore,
        identity: StaticIdentityProvider,
    }

    impl TestApp {
        fn new() -> Self {
            let store = InMemoryEventStore::new();
            let identity = StaticIdentityProvider::new();
            let actions = EventActions::new(Arc::new(store.clone()), Arc::new(identity.clone()));
            Self {
                router: routes(AppState::new(actions)),
                store,
                identity,
            }
        }

        async fn token_for(&self, email: &str) -> String {
            let user = self.identity.register(email).await;
            self.identity.issue_token(user.user_id).await
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<&str>,
        ) -> (StatusCode, Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let body = match body {
                Some(body) => {
                    request = request.header(header::CONTENT_TYPE, "application/json");
                    Body::from(body.to_string())
                }
                None => Body::empty(),
            };
            let response: Response = self
                .router
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            (status, serde_json::from_slice(&bytes).unwrap())
        }
    }

    fn event_body(name: &str, sport_type: &str, date_time: &str) -> String {
        json!({
            "name": name,
            "sport_type": sport_type,
            "date_time": date_time,
            "description": "",
            "venues": ["Central Park"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_create_returns_created_envelope() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;

        let (status, body) = app
            .send(
                "POST",
                "/v1/events",
                Some(&token),
                Some(&event_body("Pickup Game", "Basketball", "2025-06-01T18:00")),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Pickup Game");
        assert!(body["data"]["description"].is_null());
        assert_eq!(app.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_anonymous_request_is_unauthorized() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                "POST",
                "/v1/events",
                None,
                Some(&event_body("Pickup Game", "Basketball", "2025-06-01T18:00")),
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": UNAUTHORIZED_MESSAGE}));
    }

    #[tokio::test]
    async fn test_validation_failures_are_bad_requests() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;

        let (status, body) = app
            .send(
                "POST",
                "/v1/events",
                Some(&token),
                Some(&event_body("", "Basketball", "2025-06-01T18:00")),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Event name is required");

        let (status, body) = app
            .send("POST", "/v1/events", Some(&token), Some("{not json"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));

        let (status, body) = app
            .send("GET", "/v1/events/not-a-uuid", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid event ID");
    }

    #[tokio::test]
    async fn test_missing_event_is_null() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;
        let (status, body) = app
            .send(
                "GET",
                "/v1/events/01890a5d-ac96-774b-bcce-b302099a8057",
                Some(&token),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": null}));
    }

    #[tokio::test]
    async fn test_foreign_event_cannot_be_edited_or_deleted() {
        let app = TestApp::new();
        let owner = app.token_for("owner@example.com").await;
        let intruder = app.token_for("intruder@example.com").await;

        let (_, created) = app
            .send(
                "POST",
                "/v1/events",
                Some(&owner),
                Some(&event_body("Derby", "Soccer", "2025-06-01T18:00")),
            )
            .await;
        let uri = format!("/v1/events/{}", created["data"]["id"].as_str().unwrap());

        let (status, body) = app
            .send(
                "PUT",
                &uri,
                Some(&intruder),
                Some(&event_body("Hijacked", "Soccer", "2025-06-01T18:00")),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], EDIT_NOT_FOUND);

        let (status, _) = app.send("DELETE", &uri, Some(&intruder), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app.send("GET", &uri, Some(&intruder), None).await;
        assert!(body["data"].is_null());

        let (status, body) = app.send("DELETE", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], created["data"]["id"]);
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_uses_path_id() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;
        let (_, created) = app
            .send(
                "POST",
                "/v1/events",
                Some(&token),
                Some(&event_body("Derby", "Soccer", "2025-06-01T18:00")),
            )
            .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let body = json!({
            "id": "ignored",
            "name": "Derby (rescheduled)",
            "sport_type": "Soccer",
            "date_time": "2025-06-08T18:00:00Z",
            "venues": ["North Field", "South Field"]
        })
        .to_string();
        let (status, body) = app
            .send("PUT", &format!("/v1/events/{id}"), Some(&token), Some(&body))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["name"], "Derby (rescheduled)");
        assert_eq!(body["data"]["venues"], json!(["North Field", "South Field"]));
    }

    #[tokio::test]
    async fn test_list_filters_from_query() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;
        for (name, sport, when) in [
            ("Night Derby", "Soccer", "2025-06-03T20:00"),
            ("Morning Derby", "Soccer", "2025-06-01T09:00"),
            ("Open Final", "Tennis", "2025-06-02T15:00"),
        ] {
            app.send(
                "POST",
                "/v1/events",
                Some(&token),
                Some(&event_body(name, sport, when)),
            )
            .await;
        }

        let (status, body) = app
            .send(
                "GET",
                "/v1/events?search=DERBY&sport_type=Soccer",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Morning Derby", "Night Derby"]);

        let (_, body) = app
            .send("GET", "/v1/events?sport_type=all&search=", Some(&token), None)
            .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_query_keys_use_first_value() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;
        app.send(
            "POST",
            "/v1/events",
            Some(&token),
            Some(&event_body("Alpine Cup", "Other", "2025-02-01T10:00")),
        )
        .await;

        let (status, body) = app
            .send(
                "GET",
                "/v1/events?search=alpine&search=zzz&sport_type=Other&sport_type=Golf",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0]["name"], "Alpine Cup");

        let (status, body) = app
            .send("GET", "/v1/events?search=a&search=b&%zz", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": []}));
    }

    #[test]
    fn test_list_query_from_pairs() {
        let pairs = vec![
            ("sport_type".to_string(), "Tennis".to_string()),
            ("search".to_string(), "open".to_string()),
            ("sport_type".to_string(), "Golf".to_string()),
        ];
        let query = ListEventsQuery::from_pairs(&pairs);
        assert_eq!(query.search.as_deref(), Some("open"));
        assert_eq!(query.sport_type.as_deref(), Some("Tennis"));
        assert!(ListEventsQuery::from_pairs(&[]).search.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let app = TestApp::new();
        let token = app.token_for("fan@example.com").await;
        app.store.fail_with(Some("connection reset")).await;

        let (status, body) = app.send("GET", "/v1/events", Some(&token), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "connection reset"}));
    }
}

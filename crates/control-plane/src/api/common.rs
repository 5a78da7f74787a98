// Common DTOs for public API
//
// Event endpoints answer with the action result envelope; the HTTP status
// reflects the error class so non-browser clients can branch on it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sportsboard_core::{ActionError, ActionResult, DeletedEvent, Event};
use utoipa::ToSchema;

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

// ============================================
// Action envelope
// ============================================

/// HTTP status for a failed action
pub fn status_for(error: &ActionError) -> StatusCode {
    match error {
        ActionError::Validation(_) => StatusCode::BAD_REQUEST,
        ActionError::Unauthorized => StatusCode::UNAUTHORIZED,
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
        ActionError::Store(_) | ActionError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// An action result rendered as the JSON envelope
pub struct ActionResponse<T> {
    result: ActionResult<T>,
    success_status: StatusCode,
}

impl<T> ActionResponse<T> {
    pub fn ok(result: ActionResult<T>) -> Self {
        Self {
            result,
            success_status: StatusCode::OK,
        }
    }

    pub fn created(result: ActionResult<T>) -> Self {
        Self {
            result,
            success_status: StatusCode::CREATED,
        }
    }

    pub fn failure(error: ActionError) -> Self {
        Self::ok(ActionResult::Failure(error))
    }
}

impl<T: Serialize> IntoResponse for ActionResponse<T> {
    fn into_response(self) -> Response {
        let status = match self.result.error() {
            Some(error) => status_for(error),
            None => self.success_status,
        };
        (status, Json(self.result)).into_response()
    }
}

// ============================================
// OpenAPI shapes of the envelope
// ============================================

/// Successful envelope carrying one event
#[derive(Debug, Serialize, ToSchema)]
pub struct EventEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub data: Event,
}

/// Successful envelope carrying an event or `null`
#[derive(Debug, Serialize, ToSchema)]
pub struct OptionalEventEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub data: Option<Event>,
}

/// Successful envelope carrying the caller's events
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub data: Vec<Event>,
}

/// Successful envelope for a deletion
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedEventEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub data: DeletedEvent,
}

/// Failed envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureEnvelope {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Unauthorized. Please sign in.")]
    pub error: String,
}

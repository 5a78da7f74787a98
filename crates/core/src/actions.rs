// Event actions
//
// Each action runs the same pipeline:
// 1. Validate the raw input against its schema
// 2. Resolve the caller from the session
// 3. Check ownership (update/delete) or scope the query by owner (list/get)
// 4. Persist or query, then wrap the outcome in an ActionResult
//
// A failure at any step short-circuits the rest. Panics inside an action are
// caught at this boundary, so callers only ever see the envelope.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{get_authenticated_user, SessionContext};
use crate::error::ActionError;
use crate::event::{is_known_sport_type, DeletedEvent, Event, EventFields, NewEvent};
use crate::result::ActionResult;
use crate::traits::{EventStore, IdentityProvider};
use crate::validation::{
    validate_input, EventFilterInput, EventIdInput, EventInput, UpdateEventInput,
};

pub const EDIT_NOT_FOUND: &str = "Event not found or you don't have permission to edit it";
pub const DELETE_NOT_FOUND: &str = "Event not found or you don't have permission to delete it";

/// Action layer over an event store and an identity provider
#[derive(Clone)]
pub struct EventActions {
    store: Arc<dyn EventStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl EventActions {
    pub fn new(store: Arc<dyn EventStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    async fn current_user(&self, session: &SessionContext) -> Result<Uuid, ActionError> {
        get_authenticated_user(self.identity.as_ref(), session).await
    }

    /// Create an event owned by the caller
    pub async fn create_event(
        &self,
        session: &SessionContext,
        input: EventInput,
    ) -> ActionResult<Event> {
        guarded("create_event", async {
            let fields = validate_input(input)?;
            note_custom_sport_type(&fields);
            let user_id = self.current_user(session).await?;

            let event = self.store.insert_event(NewEvent { user_id, fields }).await?;
            tracing::info!(event_id = %event.id, user_id = %user_id, "event created");
            Ok(event)
        })
        .await
    }

    /// Replace the editable fields of one of the caller's events
    pub async fn update_event(
        &self,
        session: &SessionContext,
        input: UpdateEventInput,
    ) -> ActionResult<Event> {
        guarded("update_event", async {
            let update = validate_input(input)?;
            note_custom_sport_type(&update.fields);
            let user_id = self.current_user(session).await?;

            let owner = self.store.get_event_owner(update.id).await?;
            if owner != Some(user_id) {
                return Err(ActionError::not_found(EDIT_NOT_FOUND));
            }

            // Conditional write: the row may have changed hands or vanished since the check
            let event = self
                .store
                .update_event(update.id, user_id, update.fields)
                .await?
                .ok_or_else(|| ActionError::not_found(EDIT_NOT_FOUND))?;
            tracing::info!(event_id = %event.id, user_id = %user_id, "event updated");
            Ok(event)
        })
        .await
    }

    /// Hard-delete one of the caller's events
    pub async fn delete_event(
        &self,
        session: &SessionContext,
        input: EventIdInput,
    ) -> ActionResult<DeletedEvent> {
        guarded("delete_event", async {
            let id = validate_input(input)?;
            let user_id = self.current_user(session).await?;

            let owner = self.store.get_event_owner(id).await?;
            if owner != Some(user_id) {
                return Err(ActionError::not_found(DELETE_NOT_FOUND));
            }

            if !self.store.delete_event(id, user_id).await? {
                return Err(ActionError::not_found(DELETE_NOT_FOUND));
            }
            tracing::info!(event_id = %id, user_id = %user_id, "event deleted");
            Ok(DeletedEvent { id })
        })
        .await
    }

    /// List the caller's events, optionally filtered, ordered by start time
    pub async fn list_events(
        &self,
        session: &SessionContext,
        input: EventFilterInput,
    ) -> ActionResult<Vec<Event>> {
        guarded("list_events", async {
            let query = validate_input(input)?;
            let user_id = self.current_user(session).await?;

            let events = self.store.list_events(user_id, &query).await?;
            tracing::debug!(
                user_id = %user_id,
                count = events.len(),
                search = ?query.search,
                sport_type = ?query.sport_type,
                "events listed"
            );
            Ok(events)
        })
        .await
    }

    /// Fetch one of the caller's events. Missing and foreign ids both yield `None`.
    pub async fn get_event_by_id(
        &self,
        session: &SessionContext,
        input: EventIdInput,
    ) -> ActionResult<Option<Event>> {
        guarded("get_event_by_id", async {
            let id = validate_input(input)?;
            let user_id = self.current_user(session).await?;

            self.store.get_event(id, user_id).await.map_err(Into::into)
        })
        .await
    }
}

/// Sport type is free text; values outside the catalogue are allowed but logged
fn note_custom_sport_type(fields: &EventFields) {
    if !is_known_sport_type(&fields.sport_type) {
        tracing::debug!(sport_type = %fields.sport_type, "sport type outside the catalogue");
    }
}

// ============================================================================
// Action boundary
// ============================================================================

/// Run an action body, log its outcome and convert it to the envelope.
/// A panic becomes an `Unexpected` failure instead of unwinding into the caller.
async fn guarded<T, F>(action: &'static str, body: F) -> ActionResult<T>
where
    F: Future<Output = Result<T, ActionError>>,
{
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(Ok(data)) => ActionResult::Success(data),
        Ok(Err(err)) => {
            match &err {
                ActionError::Store(_) | ActionError::Unexpected(_) => {
                    tracing::error!(action, error = %err, "action failed");
                }
                _ => tracing::warn!(action, error = %err, "action rejected"),
            }
            ActionResult::Failure(err)
        }
        Err(payload) => {
            let err = ActionError::unexpected(panic_message(payload.as_ref()));
            tracing::error!(action, error = %err, "action panicked");
            ActionResult::Failure(err)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::new()
    }
}

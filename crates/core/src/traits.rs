// Core traits for pluggable backends
//
// These traits keep the action layer independent of where data lives:
// - In-memory implementations for tests and local development
// - Database implementations for production (control plane)

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{Identity, SessionContext};
use crate::error::StoreError;
use crate::event::{Event, EventFields, EventQuery, NewEvent};

// ============================================================================
// EventStore - For persisting events
// ============================================================================

/// Trait for storing and retrieving events
///
/// Every read and write that targets an existing event is scoped to an owner.
/// Implementations must never return or modify a row whose `user_id` differs
/// from the owner passed in.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event and return the stored row
    async fn insert_event(&self, input: NewEvent) -> Result<Event, StoreError>;

    /// Look up the owner of an event
    async fn get_event_owner(&self, id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// Replace the editable fields of an event, only if `owner` owns it.
    /// Returns `None` when no row matched.
    async fn update_event(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: EventFields,
    ) -> Result<Option<Event>, StoreError>;

    /// Delete an event, only if `owner` owns it. Returns whether a row was removed.
    async fn delete_event(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;

    /// List the owner's events matching `query`, ordered by `date_time` ascending
    async fn list_events(&self, owner: Uuid, query: &EventQuery)
        -> Result<Vec<Event>, StoreError>;

    /// Get a single event owned by `owner`
    async fn get_event(&self, id: Uuid, owner: Uuid) -> Result<Option<Event>, StoreError>;
}

// ============================================================================
// IdentityProvider - For resolving the caller
// ============================================================================

/// Trait for resolving the identity behind a request's session
///
/// `Ok(None)` means "no valid session". `Err` is reserved for provider faults
/// (unreachable backend and similar).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user(&self, session: &SessionContext) -> anyhow::Result<Option<Identity>>;
}

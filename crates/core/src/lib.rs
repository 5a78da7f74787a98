// Sportsboard Core
//
// This crate provides a DB-agnostic implementation of the event action
// pipeline (validate → authenticate → authorize → persist → envelope).
//
// Key design decisions:
// - Uses traits (EventStore, IdentityProvider) for pluggable backends
// - Session state is an explicit SessionContext argument, never global
// - Every action resolves to the two-variant ActionResult envelope
// - Missing and foreign events are indistinguishable to the caller
// - The dashboard filter controller owns its debounce timer

// Domain entity types
pub mod event;

pub mod actions;
pub mod auth;
pub mod error;
pub mod filter;
pub mod result;
pub mod traits;
pub mod validation;

// Logging setup shared by binaries
pub mod telemetry;

// In-memory implementations for development and testing
pub mod memory;

// Re-exports for convenience
pub use actions::{EventActions, DELETE_NOT_FOUND, EDIT_NOT_FOUND};
pub use auth::{get_authenticated_user, Identity, SessionContext};
pub use error::{
    ActionError, StoreError, ValidationError, UNAUTHORIZED_MESSAGE, UNEXPECTED_ERROR_MESSAGE,
};
pub use event::{
    is_known_sport_type, DeletedEvent, Event, EventFields, EventQuery, NewEvent, ALL_SPORTS,
    SPORT_TYPES,
};
pub use filter::{build_query_string, NavigateOptions, Navigator, SearchFilter, DEBOUNCE_DELAY};
pub use memory::{InMemoryEventStore, StaticIdentityProvider};
pub use result::ActionResult;
pub use traits::{EventStore, IdentityProvider};
pub use validation::{
    decode_input, parse_input, validate_input, EventFilterInput, EventIdInput, EventInput,
    EventUpdate, Schema, UpdateEventInput,
};

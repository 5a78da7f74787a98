// In-memory implementations for development and testing
//
// These implementations keep all data in memory, making them useful for:
// - Unit and integration tests of the action layer
// - Running the control plane without a database

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{Identity, SessionContext};
use crate::error::StoreError;
use crate::event::{Event, EventFields, EventQuery, NewEvent};
use crate::traits::{EventStore, IdentityProvider};

// ============================================================================
// InMemoryEventStore - Stores events in memory
// ============================================================================

/// In-memory event store
///
/// Stores events in a HashMap keyed by event ID. A failure message can be
/// injected to exercise store-error paths.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryEventStore {
    /// Create a new in-memory event store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `message` (or succeed again with `None`)
    pub async fn fail_with(&self, message: Option<&str>) {
        *self.failure.write().await = message.map(str::to_string);
    }

    /// Number of stored events, across all owners
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Raw lookup that ignores ownership (useful for assertions)
    pub async fn peek(&self, id: Uuid) -> Option<Event> {
        self.events.read().await.get(&id).cloned()
    }

    async fn check(&self) -> Result<(), StoreError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(StoreError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert_event(&self, input: NewEvent) -> Result<Event, StoreError> {
        self.check().await?;
        let now = Utc::now();
        let event = Event {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            name: input.fields.name,
            sport_type: input.fields.sport_type,
            date_time: input.fields.date_time,
            description: input.fields.description,
            venues: input.fields.venues,
            created_at: now,
            updated_at: now,
        };
        self.events.write().await.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event_owner(&self, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        self.check().await?;
        Ok(self.events.read().await.get(&id).map(|e| e.user_id))
    }

    async fn update_event(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: EventFields,
    ) -> Result<Option<Event>, StoreError> {
        self.check().await?;
        let mut events = self.events.write().await;
        let Some(event) = events.get_mut(&id).filter(|e| e.user_id == owner) else {
            return Ok(None);
        };
        event.name = fields.name;
        event.sport_type = fields.sport_type;
        event.date_time = fields.date_time;
        event.description = fields.description;
        event.venues = fields.venues;
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        self.check().await?;
        let mut events = self.events.write().await;
        match events.get(&id) {
            Some(event) if event.user_id == owner => {
                events.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_events(
        &self,
        owner: Uuid,
        query: &EventQuery,
    ) -> Result<Vec<Event>, StoreError> {
        self.check().await?;
        let mut events: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.user_id == owner && query.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn get_event(&self, id: Uuid, owner: Uuid) -> Result<Option<Event>, StoreError> {
        self.check().await?;
        Ok(self
            .events
            .read()
            .await
            .get(&id)
            .filter(|e| e.user_id == owner)
            .cloned())
    }
}

// ============================================================================
// StaticIdentityProvider - Token table held in memory
// ============================================================================

/// In-memory identity provider
///
/// Maps opaque access tokens to registered identities.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    users: Arc<RwLock<HashMap<Uuid, Identity>>>,
    tokens: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and return its identity
    pub async fn register(&self, email: &str) -> Identity {
        let identity = Identity {
            user_id: Uuid::now_v7(),
            email: email.to_string(),
        };
        self.users
            .write()
            .await
            .insert(identity.user_id, identity.clone());
        identity
    }

    /// Issue a new access token for a registered user
    pub async fn issue_token(&self, user_id: Uuid) -> String {
        let token = format!("tok_{}", Uuid::now_v7().simple());
        self.tokens.write().await.insert(token.clone(), user_id);
        token
    }

    /// Invalidate a single token
    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_user(&self, session: &SessionContext) -> anyhow::Result<Option<Identity>> {
        let Some(token) = session.access_token.as_deref() else {
            return Ok(None);
        };
        let Some(user_id) = self.tokens.read().await.get(token).copied() else {
            return Ok(None);
        };
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.
// It also implements the core EventStore trait so the action layer can
// persist events without knowing which backend is active.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sportsboard_core::{Event, EventFields, EventQuery, EventStore, NewEvent, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using PostgreSQL backend
    /// Returns None for in-memory backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn get_user_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_oauth(provider, provider_id).await,
            Self::InMemory(db) => db.get_user_by_oauth(provider, provider_id).await,
        }
    }

    pub async fn mark_email_verified(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.mark_email_verified(id).await,
            Self::InMemory(db) => db.mark_email_verified(id).await,
        }
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(&self, input: CreateAuthSessionRow) -> Result<AuthSessionRow> {
        match self {
            Self::Postgres(db) => db.create_auth_session(input).await,
            Self::InMemory(db) => db.create_auth_session(input).await,
        }
    }

    pub async fn get_auth_session(&self, id: Uuid) -> Result<Option<AuthSessionRow>> {
        match self {
            Self::Postgres(db) => db.get_auth_session(id).await,
            Self::InMemory(db) => db.get_auth_session(id).await,
        }
    }

    pub async fn get_auth_session_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<AuthSessionRow>> {
        match self {
            Self::Postgres(db) => db.get_auth_session_by_hash(refresh_token_hash).await,
            Self::InMemory(db) => db.get_auth_session_by_hash(refresh_token_hash).await,
        }
    }

    pub async fn delete_auth_session(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_auth_session(id).await,
            Self::InMemory(db) => db.delete_auth_session(id).await,
        }
    }

    pub async fn delete_auth_sessions_for_user(&self, user_id: Uuid) -> Result<u64> {
        match self {
            Self::Postgres(db) => db.delete_auth_sessions_for_user(user_id).await,
            Self::InMemory(db) => db.delete_auth_sessions_for_user(user_id).await,
        }
    }
}

// ============================================
// Events (core EventStore)
// ============================================

#[async_trait]
impl EventStore for StorageBackend {
    async fn insert_event(&self, input: NewEvent) -> Result<Event, StoreError> {
        let row = match self {
            Self::Postgres(db) => db.insert_event(input).await?,
            Self::InMemory(db) => db.insert_event(input).await?,
        };
        Ok(row.into())
    }

    async fn get_event_owner(&self, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let owner = match self {
            Self::Postgres(db) => db.get_event_owner(id).await?,
            Self::InMemory(db) => db.get_event_owner(id).await?,
        };
        Ok(owner)
    }

    async fn update_event(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: EventFields,
    ) -> Result<Option<Event>, StoreError> {
        let row = match self {
            Self::Postgres(db) => db.update_event(id, owner, fields).await?,
            Self::InMemory(db) => db.update_event(id, owner, fields).await?,
        };
        Ok(row.map(Event::from))
    }

    async fn delete_event(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let deleted = match self {
            Self::Postgres(db) => db.delete_event(id, owner).await?,
            Self::InMemory(db) => db.delete_event(id, owner).await?,
        };
        Ok(deleted)
    }

    async fn list_events(
        &self,
        owner: Uuid,
        query: &EventQuery,
    ) -> Result<Vec<Event>, StoreError> {
        let rows = match self {
            Self::Postgres(db) => db.list_events(owner, query).await?,
            Self::InMemory(db) => db.list_events(owner, query).await?,
        };
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn get_event(&self, id: Uuid, owner: Uuid) -> Result<Option<Event>, StoreError> {
        let row = match self {
            Self::Postgres(db) => db.get_event(id, owner).await?,
            Self::InMemory(db) => db.get_event(id, owner).await?,
        };
        Ok(row.map(Event::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_event_store_scopes_by_owner() {
        let backend = StorageBackend::in_memory();
        assert!(backend.is_dev_mode());
        assert!(backend.pool().is_none());

        let owner = Uuid::now_v7();
        let intruder = Uuid::now_v7();
        let event = backend
            .insert_event(NewEvent {
                user_id: owner,
                fields: EventFields {
                    name: "City Marathon".to_string(),
                    sport_type: "Running".to_string(),
                    date_time: Utc.with_ymd_and_hms(2025, 4, 6, 8, 0, 0).unwrap(),
                    description: Some("42km".to_string()),
                    venues: vec!["Downtown".to_string()],
                },
            })
            .await
            .unwrap();

        assert_eq!(backend.get_event_owner(event.id).await.unwrap(), Some(owner));
        assert!(backend.get_event(event.id, intruder).await.unwrap().is_none());
        assert!(!backend.delete_event(event.id, intruder).await.unwrap());
        assert!(backend.delete_event(event.id, owner).await.unwrap());
        assert!(backend.get_event_owner(event.id).await.unwrap().is_none());
    }
}

// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// This implementation mirrors the PostgreSQL repository API backed by in-memory
// HashMaps, allowing the control-plane to run without a database for development.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sportsboard_core::{EventFields, EventQuery, NewEvent};
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    auth_sessions: RwLock<HashMap<Uuid, AuthSessionRow>>,
    events: RwLock<HashMap<Uuid, EventRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }

        let now = Self::now();
        let row = UserRow {
            id: Uuid::now_v7(),
            email: input.email,
            name: input.name,
            avatar_url: input.avatar_url,
            password_hash: input.password_hash,
            email_verified: input.email_verified,
            auth_provider: input.auth_provider,
            auth_provider_id: input.auth_provider_id,
            created_at: now,
            updated_at: now,
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub async fn get_user_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| {
                u.auth_provider == provider && u.auth_provider_id.as_deref() == Some(provider_id)
            })
            .cloned())
    }

    pub async fn mark_email_verified(&self, id: Uuid) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if let Some(user) = users.get_mut(&id) {
            user.email_verified = true;
            user.updated_at = Self::now();
            return Ok(Some(user.clone()));
        }
        Ok(None)
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(&self, input: CreateAuthSessionRow) -> Result<AuthSessionRow> {
        let row = AuthSessionRow {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash,
            expires_at: input.expires_at,
            created_at: Self::now(),
        };
        self.auth_sessions.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_auth_session(&self, id: Uuid) -> Result<Option<AuthSessionRow>> {
        Ok(self.auth_sessions.read().get(&id).cloned())
    }

    pub async fn get_auth_session_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<AuthSessionRow>> {
        Ok(self
            .auth_sessions
            .read()
            .values()
            .find(|s| s.refresh_token_hash == refresh_token_hash)
            .cloned())
    }

    pub async fn delete_auth_session(&self, id: Uuid) -> Result<bool> {
        Ok(self.auth_sessions.write().remove(&id).is_some())
    }

    pub async fn delete_auth_sessions_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut sessions = self.auth_sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn insert_event(&self, input: NewEvent) -> Result<EventRow> {
        let now = Self::now();
        let row = EventRow {
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
        self.events.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_event_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        Ok(self.events.read().get(&id).map(|e| e.user_id))
    }

    pub async fn update_event(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: EventFields,
    ) -> Result<Option<EventRow>> {
        let mut events = self.events.write();
        match events.get_mut(&id) {
            Some(event) if event.user_id == owner => {
                event.name = fields.name;
                event.sport_type = fields.sport_type;
                event.date_time = fields.date_time;
                event.description = fields.description;
                event.venues = fields.venues;
                event.updated_at = Self::now();
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    pub async fn delete_event(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut events = self.events.write();
        if events.get(&id).is_some_and(|e| e.user_id == owner) {
            events.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    pub async fn list_events(&self, owner: Uuid, query: &EventQuery) -> Result<Vec<EventRow>> {
        let search = query.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<EventRow> = self
            .events
            .read()
            .values()
            .filter(|e| e.user_id == owner)
            .filter(|e| {
                search
                    .as_deref()
                    .map_or(true, |s| e.name.to_lowercase().contains(s))
            })
            .filter(|e| {
                query
                    .sport_type
                    .as_deref()
                    .map_or(true, |t| e.sport_type == t)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    pub async fn get_event(&self, id: Uuid, owner: Uuid) -> Result<Option<EventRow>> {
        Ok(self
            .events
            .read()
            .get(&id)
            .filter(|e| e.user_id == owner)
            .cloned())
    }
}

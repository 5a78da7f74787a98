// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sportsboard_core::Event;
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Auth models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub auth_provider: String,
    pub auth_provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    /// "local" or an OAuth provider name
    pub auth_provider: String,
    pub auth_provider_id: Option<String>,
}

/// A signed-in session. Access tokens reference the row by id.
#[derive(Debug, Clone, FromRow)]
pub struct AuthSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthSessionRow {
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
}

// ============================================
// Event models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub sport_type: String,
    pub date_time: DateTime<Utc>,
    pub description: Option<String>,
    pub venues: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            sport_type: row.sport_type,
            date_time: row.date_time,
            description: row.description,
            venues: row.venues,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

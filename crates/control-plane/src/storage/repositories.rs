// Repository layer for database operations
// Decision: Runtime-checked queries (query_as) so builds never need a live database
// Decision: Owner-scoped event writes filter on user_id in the same statement

use anyhow::{Context, Result};
use sportsboard_core::{EventFields, EventQuery, NewEvent};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;

const EVENT_COLUMNS: &str =
    "id, user_id, name, sport_type, date_time, description, venues, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, name, avatar_url, password_hash, email_verified, \
     auth_provider, auth_provider_id, created_at, updated_at";

/// Escape LIKE wildcards so user search text matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL and apply pending migrations
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, name, avatar_url, password_hash, email_verified, auth_provider, auth_provider_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.avatar_url)
        .bind(&input.password_hash)
        .bind(input.email_verified)
        .bind(&input.auth_provider)
        .bind(&input.auth_provider_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth_provider = $1 AND auth_provider_id = $2"
        ))
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn mark_email_verified(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET email_verified = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(&self, input: CreateAuthSessionRow) -> Result<AuthSessionRow> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            INSERT INTO auth_sessions (user_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, refresh_token_hash, expires_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.refresh_token_hash)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_auth_session(&self, id: Uuid) -> Result<Option<AuthSessionRow>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT id, user_id, refresh_token_hash, expires_at, created_at
            FROM auth_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_auth_session_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<AuthSessionRow>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT id, user_id, refresh_token_hash, expires_at, created_at
            FROM auth_sessions
            WHERE refresh_token_hash = $1
            "#,
        )
        .bind(refresh_token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_auth_session(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_auth_sessions_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn insert_event(&self, input: NewEvent) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (user_id, name, sport_type, date_time, description, venues)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(&input.fields.name)
        .bind(&input.fields.sport_type)
        .bind(input.fields.date_time)
        .bind(&input.fields.description)
        .bind(&input.fields.venues)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    pub async fn update_event(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: EventFields,
    ) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                name = $3,
                sport_type = $4,
                date_time = $5,
                description = $6,
                venues = $7,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(&fields.name)
        .bind(&fields.sport_type)
        .bind(fields.date_time)
        .bind(&fields.description)
        .bind(&fields.venues)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_event(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_events(&self, owner: Uuid, query: &EventQuery) -> Result<Vec<EventRow>> {
        // NULL parameters disable their filter
        let pattern = query
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE user_id = $1
              AND ($2::text IS NULL OR name ILIKE $2)
              AND ($3::text IS NULL OR sport_type = $3)
            ORDER BY date_time ASC, id ASC
            "#
        ))
        .bind(owner)
        .bind(pattern)
        .bind(&query.sport_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_event(&self, id: Uuid, owner: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

// Authentication extractors
// Decision: Support both cookie-based (UI) and header-based (API) auth
// Decision: Event routes take the raw SessionContext; the action layer decides
// whether it resolves to a user

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use sportsboard_core::SessionContext;
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;

use super::service::{AuthService, AuthServiceError};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::FORBIDDEN,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn internal() -> Self {
        Self {
            error: "Authentication service error".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<AuthServiceError> for AuthError {
    fn from(err: AuthServiceError) -> Self {
        let message = err.to_string();
        match err {
            AuthServiceError::Validation(_)
            | AuthServiceError::UnknownProvider
            | AuthServiceError::ProviderNotConfigured => Self::bad_request(&message),
            AuthServiceError::InvalidCredentials
            | AuthServiceError::InvalidToken(_)
            | AuthServiceError::OAuthFailed => Self::unauthorized(&message),
            AuthServiceError::EmailNotConfirmed
            | AuthServiceError::SignupDisabled
            | AuthServiceError::AccountExists => Self::forbidden(&message),
            AuthServiceError::EmailTaken => Self {
                error: message,
                status: StatusCode::CONFLICT,
            },
            AuthServiceError::Internal(e) => {
                tracing::error!(error = ?e, "auth service failure");
                Self::internal()
            }
        }
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
    /// Development mode: OAuth redirects go back to the request origin
    pub dev_mode: bool,
}

impl AuthState {
    pub fn new(service: Arc<AuthService>, dev_mode: bool) -> Self {
        Self { service, dev_mode }
    }
}

/// Read the access token from `Authorization: Bearer` or the session cookie
pub fn session_from_headers(headers: &HeaderMap) -> SessionContext {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return SessionContext::with_token(token);
    }

    let jar = CookieJar::from_headers(headers);
    match jar.get(ACCESS_TOKEN_COOKIE) {
        Some(cookie) => SessionContext::with_token(cookie.value()),
        None => SessionContext::anonymous(),
    }
}

/// The request's session material, possibly anonymous. Never rejects.
#[derive(Debug, Clone)]
pub struct RequestSession(pub SessionContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestSession(session_from_headers(&parts.headers)))
    }
}

/// Authenticated user context extracted from request
/// This is required - returns 401 if not authenticated
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub email_verified: bool,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let session = session_from_headers(&parts.headers);

        let user = auth_state
            .service
            .current_user(&session)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "failed to resolve session");
                AuthError::internal()
            })?
            .ok_or_else(|| AuthError::unauthorized("Authentication required"))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            email_verified: user.email_verified,
        })
    }
}

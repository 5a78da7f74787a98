// Authentication HTTP routes
// Decision: All auth endpoints live under /auth/* (mounted below the API prefix)
// Decision: Support both JSON and cookie-based sessions
// Decision: Browser-facing flows (OAuth callback, email confirm) always answer with a redirect

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::ToSchema;

use super::{
    jwt::TokenPair,
    middleware::{
        AuthError, AuthState, AuthUser, RequestSession, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
    },
    service::{AuthServiceError, SignUp, SignUpOutcome, SignedInSession},
};

const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_NEXT_COOKIE: &str = "oauth_next";
const OAUTH_COOKIE_MAX_AGE_SECS: i64 = 10 * 60;

pub const DEFAULT_NEXT: &str = "/dashboard";
pub const CALLBACK_FALLBACK_ERROR: &str = "Could not authenticate user";

/// Generate a random state string for OAuth (32 hex characters)
fn generate_oauth_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

/// Sign-in request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Optional confirmation; must equal `password` when present
    pub confirm_password: Option<String>,
    pub name: Option<String>,
    /// Local path the confirmation link should land on
    pub next: Option<String>,
}

/// Token response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Sign-up response: either a live session or a pending confirmation
#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpResponse {
    /// "signed_in" or "pending_confirmation"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<TokenResponse>,
}

/// User info response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfoResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub email_verified: bool,
}

/// Refresh token request (the refresh cookie is used when the body is absent)
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Auth configuration response
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthConfigResponse {
    pub password_auth_enabled: bool,
    pub oauth_providers: Vec<String>,
    pub signup_enabled: bool,
    pub email_confirmation_required: bool,
}

#[derive(Debug, Deserialize)]
pub struct OAuthStartQuery {
    pub next: Option<String>,
}

/// OAuth callback query parameters
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub next: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub token: Option<String>,
    pub next: Option<String>,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/auth/config", get(get_auth_config))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/refresh", post(refresh))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(get_current_user))
        .route("/auth/oauth/:provider", get(oauth_redirect))
        .route("/auth/callback", get(oauth_callback))
        .route("/auth/confirm", get(confirm_email))
        .with_state(state)
}

// ============================================
// Redirect helpers
// ============================================

/// Only same-site paths are accepted as post-login destinations
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => DEFAULT_NEXT.to_string(),
    }
}

/// Origin of the incoming request as seen by the client
pub fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}

/// Origin browser redirects should land on.
///
/// Development uses the request origin; otherwise the configured site URL,
/// then the forwarded host behind a proxy, then the request origin.
pub fn resolve_redirect_base(dev_mode: bool, site_url: Option<&str>, headers: &HeaderMap) -> String {
    if dev_mode {
        return request_origin(headers);
    }
    if let Some(site) = site_url {
        return site.trim_end_matches('/').to_string();
    }
    if let Some(host) = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
    {
        return format!("https://{host}");
    }
    request_origin(headers)
}

fn login_error_url(base: &str, message: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    format!("{base}/login?{query}")
}

fn redirect_base(state: &AuthState, headers: &HeaderMap) -> String {
    resolve_redirect_base(
        state.dev_mode,
        state.service.config().site_url.as_deref(),
        headers,
    )
}

// ============================================
// Cookie helpers
// ============================================

fn with_session_cookies(state: &AuthState, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
    let secure = state.service.config().secure_cookies;

    let access_cookie = Cookie::build((ACCESS_TOKEN_COOKIE, tokens.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(tokens.expires_in))
        .build();

    let refresh_cookie = Cookie::build((REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(
            state.service.refresh_token_lifetime_secs(),
        ))
        .build();

    jar.add(access_cookie).add(refresh_cookie)
}

fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}

fn short_lived_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(OAUTH_COOKIE_MAX_AGE_SECS))
        .build()
}

fn session_response(
    state: &AuthState,
    jar: CookieJar,
    session: SignedInSession,
) -> (CookieJar, Json<TokenResponse>) {
    let jar = with_session_cookies(state, jar, &session.tokens);
    (jar, Json(session.tokens.into()))
}

// ============================================
// Handlers
// ============================================

/// GET /auth/config - Get authentication configuration
pub async fn get_auth_config(State(state): State<AuthState>) -> Json<AuthConfigResponse> {
    let config = state.service.config();
    let mut oauth_providers = Vec::new();
    if config.google.is_some() {
        oauth_providers.push("google".to_string());
    }

    Json(AuthConfigResponse {
        password_auth_enabled: true,
        oauth_providers,
        signup_enabled: config.signup_enabled(),
        email_confirmation_required: config.require_email_confirmation,
    })
}

/// POST /auth/sign-in - Sign in with email and password
pub async fn sign_in(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    let session = state
        .service
        .sign_in_with_password(&req.email, &req.password)
        .await?;
    Ok(session_response(&state, jar, session))
}

/// POST /auth/sign-up - Register a new user
pub async fn sign_up(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> Result<Response, AuthError> {
    let outcome = state
        .service
        .sign_up(SignUp {
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
            name: req.name,
            next: req.next.map(|n| safe_next(Some(&n))),
        })
        .await?;

    let response = match outcome {
        SignUpOutcome::SignedIn(session) => {
            let jar = with_session_cookies(&state, jar, &session.tokens);
            let body = SignUpResponse {
                status: "signed_in".to_string(),
                message: None,
                session: Some(session.tokens.into()),
            };
            (StatusCode::CREATED, jar, Json(body)).into_response()
        }
        SignUpOutcome::PendingConfirmation { message } => {
            let body = SignUpResponse {
                status: "pending_confirmation".to_string(),
                message: Some(message.to_string()),
                session: None,
            };
            (StatusCode::ACCEPTED, Json(body)).into_response()
        }
    };
    Ok(response)
}

/// POST /auth/refresh - Rotate the refresh token and issue a new access token
pub async fn refresh(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    let token = body
        .map(|Json(req)| req.refresh_token)
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AuthError::unauthorized("Refresh token required"))?;

    let session = state.service.refresh(&token).await?;
    Ok(session_response(&state, jar, session))
}

/// POST /auth/sign-out - Revoke all sessions of the caller and clear cookies
pub async fn sign_out(
    State(state): State<AuthState>,
    RequestSession(session): RequestSession,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AuthError> {
    state.service.sign_out(&session).await?;
    Ok((without_session_cookies(jar), StatusCode::NO_CONTENT))
}

/// GET /auth/me - Get current user info
pub async fn get_current_user(user: AuthUser) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        id: user.id.to_string(),
        email: user.email,
        name: user.name,
        avatar_url: user.avatar_url,
        email_verified: user.email_verified,
    })
}

/// GET /auth/oauth/:provider - Redirect to OAuth provider
pub async fn oauth_redirect(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthStartQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    let oauth_state = generate_oauth_state();
    let url = state.service.sign_in_with_oauth(&provider, &oauth_state)?;

    let secure = state.service.config().secure_cookies;
    let next = safe_next(query.next.as_deref());
    let jar = jar
        .add(short_lived_cookie(OAUTH_STATE_COOKIE, oauth_state, secure))
        .add(short_lived_cookie(OAUTH_NEXT_COOKIE, next, secure));

    Ok((jar, Redirect::to(&url)))
}

/// GET /auth/callback - OAuth callback
///
/// Exchanges `code` for a session and redirects to `next` on the resolved
/// site origin. Every failure lands on `/login?error=...`.
pub async fn oauth_callback(
    State(state): State<AuthState>,
    Query(query): Query<OAuthCallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let base = redirect_base(&state, &headers);
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let cookie_next = jar.get(OAUTH_NEXT_COOKIE).map(|c| c.value().to_string());
    let jar = jar
        .remove(Cookie::build(OAUTH_STATE_COOKIE).path("/"))
        .remove(Cookie::build(OAUTH_NEXT_COOKIE).path("/"));

    if let Some(error) = query.error.as_deref() {
        let message = query.error_description.as_deref().unwrap_or(error);
        tracing::warn!(error, "OAuth provider returned an error");
        return (jar, Redirect::to(&login_error_url(&base, message)));
    }

    let Some(code) = query.code.as_deref() else {
        return (
            jar,
            Redirect::to(&login_error_url(&base, CALLBACK_FALLBACK_ERROR)),
        );
    };

    if expected_state.is_none() || query.state != expected_state {
        tracing::warn!("OAuth state mismatch");
        return (
            jar,
            Redirect::to(&login_error_url(&base, "Invalid OAuth state")),
        );
    }

    let next = safe_next(query.next.as_deref().or(cookie_next.as_deref()));

    match state.service.exchange_code_for_session("google", code).await {
        Ok(session) => {
            let jar = with_session_cookies(&state, jar, &session.tokens);
            (jar, Redirect::to(&format!("{base}{next}")))
        }
        Err(e) => {
            let message = callback_error_message(&e);
            (jar, Redirect::to(&login_error_url(&base, &message)))
        }
    }
}

/// GET /auth/confirm - Consume an email confirmation link
pub async fn confirm_email(
    State(state): State<AuthState>,
    Query(query): Query<ConfirmQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let base = redirect_base(&state, &headers);
    let Some(token) = query.token.as_deref() else {
        return (
            jar,
            Redirect::to(&login_error_url(&base, CALLBACK_FALLBACK_ERROR)),
        );
    };

    match state.service.confirm_email(token).await {
        Ok(session) => {
            let next = safe_next(query.next.as_deref());
            let jar = with_session_cookies(&state, jar, &session.tokens);
            (jar, Redirect::to(&format!("{base}{next}")))
        }
        Err(e) => {
            let message = callback_error_message(&e);
            (jar, Redirect::to(&login_error_url(&base, &message)))
        }
    }
}

fn callback_error_message(err: &AuthServiceError) -> String {
    match err {
        AuthServiceError::Internal(e) => {
            tracing::error!(error = ?e, "auth callback failed");
            CALLBACK_FALLBACK_ERROR.to_string()
        }
        other => other.to_string(),
    }
}

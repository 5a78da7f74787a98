// Identity provider for the control-plane
// Decision: One service owns password, OAuth and session logic; routes stay thin
// Decision: Access tokens are honoured only while their auth_sessions row exists
// Decision: Sign-out is global (every session of the user is revoked)
// Decision: OAuth never auto-links to an existing account with the same email

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sportsboard_core::{Identity, IdentityProvider, SessionContext};
use thiserror::Error;
use url::form_urlencoded;
use uuid::Uuid;

use super::config::AuthConfig;
use super::jwt::{hash_token, JwtService, TokenPair};
use super::oauth::{GoogleOAuthService, OAuthProvider};
use crate::storage::password::{check_password_policy, hash_password, verify_password};
use crate::storage::{CreateAuthSessionRow, CreateUserRow, StorageBackend, UserRow};

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const CONFIRMATION_SENT: &str = "Check your email for a confirmation link.";

const LOCAL_PROVIDER: &str = "local";

/// Errors surfaced by the identity provider
#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email not confirmed")]
    EmailNotConfirmed,

    #[error("Signups are disabled")]
    SignupDisabled,

    #[error("User already registered")]
    EmailTaken,

    #[error("An account with this email already exists. Please sign in with your password.")]
    AccountExists,

    #[error("Unknown OAuth provider")]
    UnknownProvider,

    #[error("OAuth provider is not configured")]
    ProviderNotConfigured,

    #[error("OAuth authentication failed")]
    OAuthFailed,

    #[error("{0}")]
    InvalidToken(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthServiceError>;

/// A freshly issued session
#[derive(Debug)]
pub struct SignedInSession {
    pub user: UserRow,
    pub session_id: Uuid,
    pub tokens: TokenPair,
}

/// Result of a sign-up attempt
#[derive(Debug)]
pub enum SignUpOutcome {
    SignedIn(SignedInSession),
    /// Account created; the user must follow the emailed link first
    PendingConfirmation { message: &'static str },
}

/// Sign-up form
#[derive(Debug, Clone, Default)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub name: Option<String>,
    /// Where the confirmation link should land after verifying
    pub next: Option<String>,
}

/// Minimal structural email check: one `@`, non-empty local part,
/// dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

pub struct AuthService {
    config: AuthConfig,
    jwt: JwtService,
    google: Option<GoogleOAuthService>,
    db: StorageBackend,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: StorageBackend) -> Self {
        let jwt = JwtService::new(config.jwt.clone());
        let google = config.google.as_ref().map(GoogleOAuthService::new);
        Self {
            config,
            jwt,
            google,
            db,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.jwt.refresh_token_lifetime_secs()
    }

    // ============================================
    // Password
    // ============================================

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<SignedInSession> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthServiceError::Validation(INVALID_EMAIL));
        }
        check_password_policy(password, None).map_err(AuthServiceError::Validation)?;

        let user = self
            .db
            .get_user_by_email(email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthServiceError::InvalidCredentials);
        };
        if !verify_password(password, hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }
        if self.config.require_email_confirmation && !user.email_verified {
            return Err(AuthServiceError::EmailNotConfirmed);
        }

        tracing::info!(user_id = %user.id, "password sign-in");
        self.create_session(user).await
    }

    pub async fn sign_up(&self, form: SignUp) -> AuthResult<SignUpOutcome> {
        if !self.config.signup_enabled() {
            return Err(AuthServiceError::SignupDisabled);
        }

        let email = form.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(AuthServiceError::Validation(INVALID_EMAIL));
        }
        check_password_policy(&form.password, form.confirm_password.as_deref())
            .map_err(AuthServiceError::Validation)?;

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let name = form
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let needs_confirmation = self.config.require_email_confirmation;
        let user = self
            .db
            .create_user(CreateUserRow {
                email,
                name,
                avatar_url: None,
                password_hash: Some(hash_password(&form.password)?),
                email_verified: !needs_confirmation,
                auth_provider: LOCAL_PROVIDER.to_string(),
                auth_provider_id: None,
            })
            .await?;

        tracing::info!(user_id = %user.id, needs_confirmation, "user signed up");

        if needs_confirmation {
            let link = self.confirmation_link(&user, form.next.as_deref())?;
            // No mail transport; the link is surfaced in the logs
            tracing::info!(email = %user.email, %link, "confirmation link issued");
            return Ok(SignUpOutcome::PendingConfirmation {
                message: CONFIRMATION_SENT,
            });
        }

        Ok(SignUpOutcome::SignedIn(self.create_session(user).await?))
    }

    fn confirmation_link(&self, user: &UserRow, next: Option<&str>) -> anyhow::Result<String> {
        let token = self.jwt.generate_confirmation_token(user.id, &user.email)?;
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("token", &token);
        if let Some(next) = next {
            query.append_pair("next", next);
        }
        Ok(format!(
            "{}?{}",
            self.config.auth_url("/auth/confirm"),
            query.finish()
        ))
    }

    /// Consume an email confirmation token and sign the user in
    pub async fn confirm_email(&self, token: &str) -> AuthResult<SignedInSession> {
        let invalid = AuthServiceError::InvalidToken("Invalid or expired confirmation link");
        let claims = match self.jwt.validate_confirmation_token(token) {
            Ok(claims) => claims,
            Err(_) => return Err(invalid),
        };
        let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
            return Err(invalid);
        };

        let user = self
            .db
            .mark_email_verified(user_id)
            .await?
            .ok_or(invalid)?;

        tracing::info!(user_id = %user.id, "email confirmed");
        self.create_session(user).await
    }

    // ============================================
    // OAuth
    // ============================================

    fn oauth_service(&self, provider: &str) -> AuthResult<&GoogleOAuthService> {
        match OAuthProvider::parse(provider) {
            Some(OAuthProvider::Google) => self
                .google
                .as_ref()
                .ok_or(AuthServiceError::ProviderNotConfigured),
            None => Err(AuthServiceError::UnknownProvider),
        }
    }

    /// Start an OAuth flow: returns the provider URL to redirect the browser to
    pub fn sign_in_with_oauth(&self, provider: &str, state: &str) -> AuthResult<String> {
        Ok(self.oauth_service(provider)?.authorization_url(state))
    }

    /// Finish an OAuth flow: exchange the code and open a session
    pub async fn exchange_code_for_session(
        &self,
        provider: &str,
        code: &str,
    ) -> AuthResult<SignedInSession> {
        let service = self.oauth_service(provider)?;
        let provider_name = OAuthProvider::Google.as_str();

        let info = service.exchange_code(code).await.map_err(|e| {
            tracing::error!(error = %e, "OAuth code exchange failed");
            AuthServiceError::OAuthFailed
        })?;

        let user = match self
            .db
            .get_user_by_oauth(provider_name, &info.provider_id)
            .await?
        {
            Some(user) => user,
            None => {
                if self.db.get_user_by_email(&info.email).await?.is_some() {
                    return Err(AuthServiceError::AccountExists);
                }
                if !self.config.signup_enabled() {
                    return Err(AuthServiceError::SignupDisabled);
                }
                self.db
                    .create_user(CreateUserRow {
                        email: info.email,
                        name: info.name,
                        avatar_url: info.avatar_url,
                        password_hash: None,
                        email_verified: info.email_verified,
                        auth_provider: provider_name.to_string(),
                        auth_provider_id: Some(info.provider_id),
                    })
                    .await?
            }
        };

        tracing::info!(user_id = %user.id, provider = provider_name, "OAuth sign-in");
        self.create_session(user).await
    }

    // ============================================
    // Sessions
    // ============================================

    /// Resolve an access token to its user, if the token and its session are live
    pub async fn current_user(&self, session: &SessionContext) -> anyhow::Result<Option<UserRow>> {
        let Some(token) = session.access_token.as_deref() else {
            return Ok(None);
        };
        let claims = match self.jwt.validate_access_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "access token rejected");
                return Ok(None);
            }
        };
        let (Ok(user_id), Ok(session_id)) = (claims.user_id(), claims.session_id()) else {
            return Ok(None);
        };

        let live = self
            .db
            .get_auth_session(session_id)
            .await?
            .is_some_and(|s| s.user_id == user_id && s.expires_at > Utc::now());
        if !live {
            return Ok(None);
        }

        self.db.get_user(user_id).await
    }

    /// Rotate a refresh token: the old session is removed and a new one issued
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<SignedInSession> {
        let invalid = AuthServiceError::InvalidToken("Invalid refresh token");
        if self.jwt.validate_refresh_token(refresh_token).is_err() {
            return Err(invalid);
        }

        let session = self
            .db
            .get_auth_session_by_hash(&hash_token(refresh_token))
            .await?
            .ok_or(invalid)?;

        self.db.delete_auth_session(session.id).await?;
        if session.expires_at <= Utc::now() {
            return Err(AuthServiceError::InvalidToken("Refresh token expired"));
        }

        let user = self
            .db
            .get_user(session.user_id)
            .await?
            .ok_or(AuthServiceError::InvalidToken("User not found"))?;

        self.create_session(user).await
    }

    /// Revoke every session belonging to the caller. Returns how many were removed.
    pub async fn sign_out(&self, session: &SessionContext) -> AuthResult<u64> {
        let Some(user) = self.current_user(session).await? else {
            return Ok(0);
        };
        let removed = self.db.delete_auth_sessions_for_user(user.id).await?;
        tracing::info!(user_id = %user.id, removed, "signed out");
        Ok(removed)
    }

    async fn create_session(&self, user: UserRow) -> AuthResult<SignedInSession> {
        let refresh_token = self.jwt.generate_refresh_token(user.id)?;
        let expires_at = Utc::now()
            + Duration::from_std(self.config.jwt.refresh_token_lifetime)
                .context("Refresh token lifetime out of range")?;

        let row = self
            .db
            .create_auth_session(CreateAuthSessionRow {
                user_id: user.id,
                refresh_token_hash: hash_token(&refresh_token),
                expires_at,
            })
            .await?;

        let tokens = self
            .jwt
            .generate_token_pair(user.id, &user.email, row.id, refresh_token)?;

        Ok(SignedInSession {
            user,
            session_id: row.id,
            tokens,
        })
    }
}

#[async_trait]
impl IdentityProvider for AuthService {
    async fn get_user(&self, session: &SessionContext) -> anyhow::Result<Option<Identity>> {
        Ok(self.current_user(session).await?.map(|user| Identity {
            user_id: user.id,
            email: user.email,
        }))
    }
}

// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Password sign-in is always available; Google OAuth only when configured
// Decision: Email confirmation is opt-in so local development signs users in directly

use std::time::Duration;

/// OAuth provider configuration
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Google OAuth configuration
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub base: OAuthProviderConfig,
    /// Optional: restrict to specific domains
    pub allowed_domains: Option<Vec<String>>,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
    /// Email confirmation link lifetime
    pub confirmation_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: Duration::from_secs(60 * 60), // 1 hour
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
            confirmation_token_lifetime: Duration::from_secs(24 * 60 * 60), // 1 day
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Public URL of this API, used for OAuth callbacks and confirmation links
    pub base_url: String,
    /// Public URL of the web app, used as the redirect origin after OAuth
    pub site_url: Option<String>,
    /// Path prefix the API is mounted under (e.g. "/api"), empty for root
    pub api_prefix: String,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Google OAuth configuration
    pub google: Option<GoogleOAuthConfig>,
    /// Whether to disable signup (registration)
    pub disable_signup: bool,
    /// Whether new password accounts must confirm their email before signing in
    pub require_email_confirmation: bool,
    /// Whether session cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            site_url: None,
            api_prefix: String::new(),
            jwt: JwtConfig::default(),
            google: None,
            disable_signup: false,
            require_email_confirmation: false,
            secure_cookies: false,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();

        let base_url = std::env::var("AUTH_BASE_URL")
            .or_else(|_| std::env::var("BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:9000".to_string());

        let site_url = std::env::var("SITE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        // API prefix for constructing OAuth callback URLs
        let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();

        let jwt_secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                // Sessions will not survive a restart with a random secret
                tracing::warn!("AUTH_JWT_SECRET not set, generating an ephemeral secret");
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            });

        let jwt = JwtConfig {
            secret: jwt_secret,
            access_token_lifetime: env_secs("AUTH_JWT_ACCESS_TOKEN_LIFETIME")
                .unwrap_or(defaults.access_token_lifetime),
            refresh_token_lifetime: env_secs("AUTH_JWT_REFRESH_TOKEN_LIFETIME")
                .unwrap_or(defaults.refresh_token_lifetime),
            confirmation_token_lifetime: env_secs("AUTH_CONFIRMATION_TOKEN_LIFETIME")
                .unwrap_or(defaults.confirmation_token_lifetime),
        };

        // Google OAuth configuration
        let google = match (
            std::env::var("AUTH_GOOGLE_CLIENT_ID"),
            std::env::var("AUTH_GOOGLE_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                let redirect_uri = std::env::var("AUTH_GOOGLE_REDIRECT_URI")
                    .unwrap_or_else(|_| format!("{}{}/auth/callback", base_url, api_prefix));
                let allowed_domains = std::env::var("AUTH_GOOGLE_ALLOWED_DOMAINS")
                    .ok()
                    .map(|s| s.split(',').map(|s| s.trim().to_string()).collect());
                Some(GoogleOAuthConfig {
                    base: OAuthProviderConfig {
                        client_id,
                        client_secret,
                        redirect_uri,
                    },
                    allowed_domains,
                })
            }
            _ => None,
        };

        let secure_cookies =
            env_flag("AUTH_SECURE_COOKIES").unwrap_or_else(|| base_url.starts_with("https://"));

        Self {
            base_url,
            site_url,
            api_prefix,
            jwt,
            google,
            disable_signup: env_flag("AUTH_DISABLE_SIGNUP").unwrap_or(false),
            require_email_confirmation: env_flag("AUTH_REQUIRE_EMAIL_CONFIRMATION")
                .unwrap_or(false),
            secure_cookies,
        }
    }

    /// Check if OAuth is available
    pub fn oauth_enabled(&self) -> bool {
        self.google.is_some()
    }

    /// Absolute URL of an auth route, e.g. `auth_url("/auth/confirm")`
    pub fn auth_url(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix,
            path
        )
    }

    /// Check if new accounts may register
    pub fn signup_enabled(&self) -> bool {
        !self.disable_signup
    }
}

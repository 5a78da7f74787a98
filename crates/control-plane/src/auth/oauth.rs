// OAuth service for Google authentication
// Decision: Manual OAuth2 implementation over reqwest (no dedicated OAuth client crate)
// Decision: Always prompt for account selection so shared browsers can switch accounts

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::config::GoogleOAuthConfig;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// OAuth provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" => Some(OAuthProvider::Google),
            _ => None,
        }
    }
}

/// User info from OAuth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    /// Provider user ID
    pub provider_id: String,
    /// User email
    pub email: String,
    /// User name
    pub name: String,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Email verified status
    pub email_verified: bool,
}

/// Google OAuth service
pub struct GoogleOAuthService {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    allowed_domains: Option<Vec<String>>,
    http: reqwest::Client,
}

impl GoogleOAuthService {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            client_id: config.base.client_id.clone(),
            client_secret: config.base.client_secret.clone(),
            redirect_uri: config.base.redirect_uri.clone(),
            allowed_domains: config.allowed_domains.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Generate authorization URL for OAuth flow
    pub fn authorization_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "select_account")
            .finish();

        format!("{}?{}", GOOGLE_AUTHORIZE_URL, query)
    }

    /// Exchange authorization code for user info
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthUserInfo> {
        let token_response: GoogleTokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("Failed to exchange code")?
            .error_for_status()
            .context("Google rejected the authorization code")?
            .json()
            .await
            .context("Failed to parse token response")?;

        let user_info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token_response.access_token)
            .send()
            .await
            .context("Failed to fetch user info")?
            .error_for_status()
            .context("Google rejected the access token")?
            .json()
            .await
            .context("Failed to parse user info")?;

        if !self.domain_allowed(&user_info.email) {
            anyhow::bail!("Email domain is not allowed");
        }

        Ok(OAuthUserInfo {
            provider_id: user_info.sub,
            email: user_info.email,
            name: user_info.name.unwrap_or_default(),
            avatar_url: user_info.picture,
            email_verified: user_info.email_verified.unwrap_or(false),
        })
    }

    fn domain_allowed(&self, email: &str) -> bool {
        let Some(allowed) = &self.allowed_domains else {
            return true;
        };
        let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
        allowed.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
    email_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::OAuthProviderConfig;

    fn service(allowed_domains: Option<Vec<String>>) -> GoogleOAuthService {
        GoogleOAuthService::new(&GoogleOAuthConfig {
            base: OAuthProviderConfig {
                client_id: "client-123".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "http://localhost:9000/auth/callback".to_string(),
            },
            allowed_domains,
        })
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(OAuthProvider::parse("google"), Some(OAuthProvider::Google));
        assert_eq!(OAuthProvider::parse("Google"), Some(OAuthProvider::Google));
        assert_eq!(OAuthProvider::parse("github"), None);
        assert_eq!(OAuthProvider::Google.as_str(), "google");
    }

    #[test]
    fn test_authorization_url() {
        let url = service(None).authorization_url("state-abc");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A9000%2Fauth%2Fcallback"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("state=state-abc"));
        assert!(url.contains("prompt=select_account"));
    }

    #[test]
    fn test_domain_restriction() {
        let open = service(None);
        assert!(open.domain_allowed("anyone@example.com"));

        let restricted = service(Some(vec!["club.org".to_string()]));
        assert!(restricted.domain_allowed("coach@CLUB.org"));
        assert!(!restricted.domain_allowed("fan@example.com"));
        assert!(!restricted.domain_allowed("no-at-sign"));
    }
}

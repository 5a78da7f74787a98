// JWT token service for authentication
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Access tokens carry the id of the session row that issued them (`sid`)
// Decision: Refresh tokens are stored hashed in the auth_sessions table

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::JwtConfig;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";
const CONFIRM: &str = "confirm";

/// Generate a random identifier string (32 hex characters)
fn generate_random_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Session that issued this token
    pub sid: String,
    /// Token type
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl AccessTokenClaims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).context("Invalid subject in access token")
    }

    pub fn session_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sid).context("Invalid session id in access token")
    }
}

/// JWT claims for refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Token type
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token ID
    pub jti: String,
}

/// JWT claims for email confirmation links
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfirmationClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned after successful authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate access token for a user session
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        session_id: Uuid,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.access_token_lifetime)?;

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            sid: session_id.to_string(),
            token_type: ACCESS.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode access token")
    }

    /// Generate refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.refresh_token_lifetime)?;

        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            token_type: REFRESH.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: generate_random_id(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode refresh token")
    }

    /// Generate both access and refresh tokens for a session
    pub fn generate_token_pair(
        &self,
        user_id: Uuid,
        email: &str,
        session_id: Uuid,
        refresh_token: String,
    ) -> Result<TokenPair> {
        let access_token = self.generate_access_token(user_id, email, session_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_lifetime_secs(),
        })
    }

    /// Generate an email confirmation token
    pub fn generate_confirmation_token(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.confirmation_token_lifetime)?;

        let claims = ConfirmationClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: CONFIRM.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode confirmation token")
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let claims: AccessTokenClaims = self.decode_claims(token, "Invalid access token")?;
        if claims.token_type != ACCESS {
            anyhow::bail!("Invalid token type");
        }
        Ok(claims)
    }

    /// Validate and decode a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims> {
        let claims: RefreshTokenClaims = self.decode_claims(token, "Invalid refresh token")?;
        if claims.token_type != REFRESH {
            anyhow::bail!("Invalid token type");
        }
        Ok(claims)
    }

    /// Validate and decode an email confirmation token
    pub fn validate_confirmation_token(&self, token: &str) -> Result<ConfirmationClaims> {
        let claims: ConfirmationClaims =
            self.decode_claims(token, "Invalid confirmation token")?;
        if claims.token_type != CONFIRM {
            anyhow::bail!("Invalid token type");
        }
        Ok(claims)
    }

    fn decode_claims<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        context: &'static str,
    ) -> Result<T> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<T>(token, &self.decoding_key, &validation).context(context)?;
        Ok(token_data.claims)
    }

    /// Get access token lifetime in seconds
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.config.access_token_lifetime.as_secs() as i64
    }

    /// Get refresh token lifetime in seconds
    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.config.refresh_token_lifetime.as_secs() as i64
    }
}

/// Hash a token for database storage (using SHA-256)
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(token.as_bytes());
    hex::encode(hash)
}

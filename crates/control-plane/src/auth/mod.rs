// Authentication: identity provider, JWT sessions, Google OAuth and HTTP routes

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod routes;
pub mod service;

pub use config::AuthConfig;
pub use middleware::{AuthError, AuthState, AuthUser, RequestSession};
pub use service::{AuthService, AuthServiceError};

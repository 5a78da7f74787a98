// Error types for the action layer

use thiserror::Error;

/// Message returned when no authenticated identity could be resolved
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please sign in.";

/// Fallback message for faults that carry no message of their own
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors an action can resolve to
///
/// The `Display` output is exactly the message placed in the failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Input violated the operation's schema (first violation only)
    #[error("{0}")]
    Validation(String),

    /// No active session identifies a user
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    /// Target record is missing or owned by someone else.
    /// Both cases share one message so existence never leaks.
    #[error("{0}")]
    NotFound(String),

    /// Store failure, message propagated verbatim
    #[error("{0}")]
    Store(String),

    /// Fault caught at the action boundary
    #[error("{0}")]
    Unexpected(String),
}

impl ActionError {
    /// Create a not-found/forbidden error
    pub fn not_found(msg: impl Into<String>) -> Self {
        ActionError::NotFound(msg.into())
    }

    /// Create an unexpected error, falling back to a generic message when empty
    pub fn unexpected(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.trim().is_empty() {
            ActionError::Unexpected(UNEXPECTED_ERROR_MESSAGE.to_string())
        } else {
            ActionError::Unexpected(msg)
        }
    }
}

/// Error raised by an `EventStore` implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::new(err.to_string())
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        ActionError::Store(err.message)
    }
}

/// Schema violation with a single human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        ValidationError(msg.into())
    }
}

impl From<ValidationError> for ActionError {
    fn from(err: ValidationError) -> Self {
        ActionError::Validation(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message() {
        assert_eq!(
            ActionError::Unauthorized.to_string(),
            "Unauthorized. Please sign in."
        );
    }

    #[test]
    fn test_store_error_is_verbatim() {
        let err: ActionError = StoreError::new("duplicate key value").into();
        assert_eq!(err, ActionError::Store("duplicate key value".to_string()));
        assert_eq!(err.to_string(), "duplicate key value");
    }

    #[test]
    fn test_unexpected_fallback() {
        assert_eq!(
            ActionError::unexpected("").to_string(),
            UNEXPECTED_ERROR_MESSAGE
        );
        assert_eq!(ActionError::unexpected("boom").to_string(), "boom");
    }
}

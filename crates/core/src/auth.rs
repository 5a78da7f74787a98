// Auth resolution for the action layer

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ActionError;
use crate::traits::IdentityProvider;

/// Request-scoped session material handed to the identity provider
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Bearer or cookie access token, if the request carried one
    pub access_token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }
}

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolve the current user's id or fail with `Unauthorized`.
///
/// Provider faults are logged and reported as `Unauthorized` as well; the
/// caller never learns why the session could not be resolved.
pub async fn get_authenticated_user(
    provider: &dyn IdentityProvider,
    session: &SessionContext,
) -> Result<Uuid, ActionError> {
    match provider.get_user(session).await {
        Ok(Some(identity)) => Ok(identity.user_id),
        Ok(None) => Err(ActionError::Unauthorized),
        Err(e) => {
            tracing::error!(error = %e, "identity provider failed to resolve session");
            Err(ActionError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FailingProvider;

    #[async_trait]
    impl IdentityProvider for FailingProvider {
        async fn get_user(&self, _session: &SessionContext) -> anyhow::Result<Option<Identity>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_provider_fault_is_unauthorized() {
        let result =
            get_authenticated_user(&FailingProvider, &SessionContext::with_token("t")).await;
        assert_eq!(result, Err(ActionError::Unauthorized));
    }

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_provider_fault_is_logged_as_error() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            futures::executor::block_on(get_authenticated_user(
                &FailingProvider,
                &SessionContext::with_token("t"),
            ))
        });
        assert_eq!(result, Err(ActionError::Unauthorized));

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("connection refused"), "{output}");
    }

    #[tokio::test]
    async fn test_resolves_user_id() {
        let provider = crate::memory::StaticIdentityProvider::new();
        let user = provider.register("fan@example.com").await;
        let token = provider.issue_token(user.user_id).await;

        let id = get_authenticated_user(&provider, &SessionContext::with_token(token))
            .await
            .unwrap();
        assert_eq!(id, user.user_id);

        let missing = get_authenticated_user(&provider, &SessionContext::anonymous()).await;
        assert_eq!(missing, Err(ActionError::Unauthorized));
    }
}

//! The session holder: the single mutable point holding the current
//! configuration.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{Configuration, Environment, Result};

/// Shared holder of the current [`Configuration`].
///
/// Readers get a snapshot `Arc<Configuration>` and never see a partially
/// updated value. Every replacement goes through the write lock and is
/// derived from the latest published configuration, so concurrent updates
/// of different fields are never lost.
///
/// # Thread Safety
///
/// `Session` is cheap to clone and designed to be shared across tasks. The
/// lock is only held while a snapshot is copied out or a new value is
/// published, never during network I/O.
///
/// # Example
///
/// ```
/// use checkout_api::{Configuration, Environment, Session};
///
/// # async fn example() -> checkout_api::Result<()> {
/// let session = Session::from_parts("acme", Some("sk_test_1"), None, Environment::Sandbox)?;
///
/// session.replace_token(Some("sk_test_2".to_string())).await;
/// session.replace_merchant_id(Some("merchant-42".to_string())).await;
///
/// let current = session.current().await;
/// assert_eq!(current.merchant_id(), Some("merchant-42"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<Arc<Configuration>>>,
}

impl Session {
    /// Create a session holding `config`.
    pub fn new(config: Configuration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Build the configuration and the session in one step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier)
    /// if `account_id` is invalid.
    pub fn from_parts(
        account_id: impl Into<String>,
        token: Option<&str>,
        merchant_id: Option<&str>,
        environment: Environment,
    ) -> Result<Self> {
        let mut builder = Configuration::builder(account_id).environment(environment);
        if let Some(token) = token {
            builder = builder.token(token);
        }
        if let Some(merchant_id) = merchant_id {
            builder = builder.merchant_id(merchant_id);
        }
        Ok(Self::new(builder.build()?))
    }

    /// Snapshot of the current configuration.
    pub async fn current(&self) -> Arc<Configuration> {
        self.inner.read().await.clone()
    }

    /// Apply `f` to the latest configuration and publish the result.
    ///
    /// All replacements are serialized through this method. Returns the
    /// newly published configuration.
    pub async fn update<F>(&self, f: F) -> Arc<Configuration>
    where
        F: FnOnce(&Configuration) -> Configuration,
    {
        let mut guard = self.inner.write().await;
        let next = Arc::new(f(&guard));
        *guard = next.clone();
        next
    }

    /// Replace the bearer token.
    pub async fn replace_token(&self, token: Option<String>) -> Arc<Configuration> {
        tracing::debug!(has_token = token.is_some(), "replacing session token");
        self.update(|config| config.with_token(token)).await
    }

    /// Replace the merchant id.
    pub async fn replace_merchant_id(&self, merchant_id: Option<String>) -> Arc<Configuration> {
        tracing::debug!(?merchant_id, "replacing session merchant id");
        self.update(|config| config.with_merchant_id(merchant_id)).await
    }

    /// Switch to another environment.
    pub async fn replace_environment(&self, environment: Environment) -> Arc<Configuration> {
        tracing::debug!(%environment, "replacing session environment");
        self.update(|config| config.with_environment(environment)).await
    }

    /// Replace the whole configuration, e.g. on credential rotation.
    pub async fn replace_configuration(&self, config: Configuration) -> Arc<Configuration> {
        self.update(|_| config).await
    }

    /// Get the environment of the current configuration.
    pub async fn environment(&self) -> Environment {
        self.inner.read().await.environment()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Session");
        match self.inner.try_read() {
            Ok(config) => debug.field("config", &**config),
            Err(_) => debug.field("config", &"<locked>"),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::config::expose_token;
    use crate::Error;

    fn session() -> Session {
        Session::from_parts("acme", Some("token-0"), None, Environment::Sandbox).unwrap()
    }

    #[test]
    fn test_invalid_identifier_fails_fast() {
        let err = Session::from_parts("", None, None, Environment::Sandbox).unwrap_err();
        assert_eq!(err, Error::InvalidIdentifier);
    }

    #[tokio::test]
    async fn test_replacements_publish_new_values() {
        let session = session();
        let before = session.current().await;

        let after = session.replace_token(Some("token-1".into())).await;
        assert_eq!(expose_token(&before), Some("token-0"));
        assert_eq!(expose_token(&after), Some("token-1"));
        assert!(!Arc::ptr_eq(&before, &after));

        session.replace_merchant_id(Some("m-1".into())).await;
        let current = session.current().await;
        assert_eq!(expose_token(&current), Some("token-1"));
        assert_eq!(current.merchant_id(), Some("m-1"));
        assert_eq!(current.account_id(), "acme");
    }

    #[tokio::test]
    async fn test_replace_environment_and_configuration() {
        let session = session();
        session.replace_environment(Environment::Production).await;
        assert_eq!(session.environment().await, Environment::Production);
        assert_eq!(session.current().await.instance(), "acme");

        let rotated = Configuration::builder("globex").build().unwrap();
        session.replace_configuration(rotated).await;
        assert_eq!(session.current().await.account_id(), "globex");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = session();
        let clone = session.clone();
        clone.replace_merchant_id(Some("shared".into())).await;
        assert_eq!(session.current().await.merchant_id(), Some("shared"));
    }

    fn counter(value: Option<&str>, prefix: &str) -> u32 {
        value
            .and_then(|v| v.strip_prefix(prefix))
            .map_or(0, |n| n.parse().unwrap())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_replacements_are_not_lost() {
        const TASKS: u32 = 32;
        let session = session();
        let mut handles = Vec::new();

        // Every task bumps both counters from the latest published value,
        // through separate replacements that interleave with other tasks.
        for _ in 0..TASKS {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                let after_token = session
                    .update(|config| {
                        let next = counter(expose_token(config), "token-") + 1;
                        config.with_token(Some(format!("token-{}", next)))
                    })
                    .await;
                tokio::task::yield_now().await;
                let after_merchant = session
                    .update(|config| {
                        let next = counter(config.merchant_id(), "m-") + 1;
                        config.with_merchant_id(Some(format!("m-{}", next)))
                    })
                    .await;

                (
                    counter(expose_token(&after_token), "token-"),
                    counter(after_merchant.merchant_id(), "m-"),
                )
            }));
        }

        let mut token_writes = Vec::new();
        let mut merchant_writes = Vec::new();
        for handle in handles {
            let (token, merchant) = handle.await.unwrap();
            token_writes.push(token);
            merchant_writes.push(merchant);
        }

        // Each publication saw its predecessor: the counters are 1..=TASKS
        // with no value written twice.
        token_writes.sort_unstable();
        merchant_writes.sort_unstable();
        let expected: Vec<u32> = (1..=TASKS).collect();
        assert_eq!(token_writes, expected);
        assert_eq!(merchant_writes, expected);

        let current = session.current().await;
        assert_eq!(expose_token(&current), Some(format!("token-{}", TASKS).as_str()));
        assert_eq!(current.merchant_id(), Some(format!("m-{}", TASKS).as_str()));
        assert_eq!(current.account_id(), "acme");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_field_replacements_keep_each_other() {
        let session = session();
        let tokens = {
            let session = session.clone();
            tokio::spawn(async move {
                for i in 1..=50 {
                    session.replace_token(Some(format!("token-{}", i))).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        let merchants = {
            let session = session.clone();
            tokio::spawn(async move {
                for i in 1..=50 {
                    session.replace_merchant_id(Some(format!("m-{}", i))).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        tokens.await.unwrap();
        merchants.await.unwrap();

        // The last write to each field survives the other field's writes.
        let current = session.current().await;
        assert_eq!(expose_token(&current), Some("token-50"));
        assert_eq!(current.merchant_id(), Some("m-50"));
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::from_parts(
            "acme",
            Some("super-secret-token"),
            None,
            Environment::Sandbox,
        )
        .unwrap();
        let debug_str = format!("{:?}", session);

        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("REDACTED"));
    }
}

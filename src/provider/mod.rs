//! Session-scoped data-client provider.
//!
//! Re-expression of the original UI-side context: holds the active
//! [`DataClient`] for a session, starting anonymous and swapping in a
//! user-scoped client whenever the authenticated identity changes. Logged
//! out, or any failure to obtain or verify a token, falls back to the
//! anonymous client rather than erroring.
//!
//! Known gap, carried over deliberately: overlapping `identity_changed`
//! calls are not sequenced. A stale in-flight refresh can resolve after a
//! newer one and win the write.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::auth::verify_token;
use crate::database::client::DataClient;

#[derive(Debug, Error, PartialEq)]
pub enum ProviderError {
    /// The handle outlived its provider. The original surfaced this as a
    /// thrown "used outside provider" error; here it is an explicit result.
    #[error("Data client requested outside an active provider scope")]
    OutsideScope,
}

/// Source of the current identity's bearer token. `Ok(None)` means logged
/// out; errors mean the token could not be retrieved right now.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>, anyhow::Error>;
}

struct ProviderInner {
    pool: PgPool,
    active: RwLock<DataClient>,
}

/// Owns the per-session client state. Create one per session scope and hand
/// out [`ClientHandle`]s to consumers.
pub struct ClientProvider {
    inner: Arc<ProviderInner>,
}

impl ClientProvider {
    pub fn new(pool: PgPool) -> Self {
        let anon = DataClient::anonymous(pool.clone());
        Self {
            inner: Arc::new(ProviderInner {
                pool,
                active: RwLock::new(anon),
            }),
        }
    }

    /// React to an identity change: re-derive a fresh token and swap the
    /// active client. No sequencing between overlapping calls.
    pub async fn identity_changed(&self, source: &dyn TokenSource) {
        let next = match source.access_token().await {
            Ok(Some(token)) => match verify_token(&token) {
                Ok(claims) => DataClient::user_scoped(self.inner.pool.clone(), claims),
                Err(e) => {
                    tracing::warn!("Session token rejected, falling back to anonymous: {}", e);
                    DataClient::anonymous(self.inner.pool.clone())
                }
            },
            Ok(None) => DataClient::anonymous(self.inner.pool.clone()),
            Err(e) => {
                tracing::warn!("Token retrieval failed, falling back to anonymous: {}", e);
                DataClient::anonymous(self.inner.pool.clone())
            }
        };

        let mut active = self.inner.active.write().await;
        *active = next;
    }

    /// Snapshot of the currently active client.
    pub async fn current(&self) -> DataClient {
        self.inner.active.read().await.clone()
    }

    /// A consumer-facing handle tied to this provider's lifetime.
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Weak handle given to consumers. Resolving a client after the provider is
/// gone yields [`ProviderError::OutsideScope`].
#[derive(Clone)]
pub struct ClientHandle {
    inner: std::sync::Weak<ProviderInner>,
}

impl ClientHandle {
    pub async fn client(&self) -> Result<DataClient, ProviderError> {
        let inner = self.inner.upgrade().ok_or(ProviderError::OutsideScope)?;
        let client = inner.active.read().await.clone();
        Ok(client)
    }
}

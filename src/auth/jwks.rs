use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::OnceCell;

use super::AuthError;

/// KeySource
///
/// Supplies the set of public keys trusted to sign access tokens. Swappable so the
/// verifier can run against the real identity provider in production and a fixed key set
/// in tests, mirroring how the repository is abstracted.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn key_set(&self) -> Result<&JwkSet, AuthError>;
}

pub type KeySourceState = Arc<dyn KeySource>;

/// RemoteJwks
///
/// Fetches the JWKS document from the identity provider on first use and keeps it for the
/// lifetime of the process. The cache is never invalidated, so key rotation requires a
/// restart. A failed fetch leaves the cell empty and the next request tries again.
pub struct RemoteJwks {
    url: String,
    client: reqwest::Client,
    cache: OnceCell<JwkSet>,
}

impl RemoteJwks {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            cache: OnceCell::new(),
        }
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        tracing::info!(url = %self.url, "fetching signing keys");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                tracing::error!("jwks fetch error: {:?}", e);
                AuthError::KeySetUnavailable(e.to_string())
            })?;

        let jwks = response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!("jwks decode error: {:?}", e);
            AuthError::KeySetUnavailable(e.to_string())
        })?;

        tracing::info!(keys = jwks.keys.len(), "signing keys cached");
        Ok(jwks)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn key_set(&self) -> Result<&JwkSet, AuthError> {
        self.cache.get_or_try_init(|| self.fetch()).await
    }
}

/// StaticJwks
///
/// A key set known up front. Used by the test suites and handy for offline development.
pub struct StaticJwks {
    keys: JwkSet,
}

impl StaticJwks {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticJwks {
    async fn key_set(&self) -> Result<&JwkSet, AuthError> {
        Ok(&self.keys)
    }
}

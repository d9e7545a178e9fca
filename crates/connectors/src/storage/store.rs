use crate::storage::{error::StageError, url_parser::BackendConfig};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::{
    ObjectStore, PutPayload, RetryConfig,
    azure::{AzureConfigKey, MicrosoftAzureBuilder},
    local::LocalFileSystem,
    memory::InMemory,
    path::Path,
};
use std::{fmt, sync::Arc};
use tracing::debug;

/// Secrets for the Azure backend. Unset fields fall back to the `AZURE_*`
/// environment variables read by the object store builder.
#[derive(Clone, Default)]
pub struct StageCredentials {
    pub sas_token: Option<String>,
    pub access_key: Option<String>,
}

impl fmt::Debug for StageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageCredentials")
            .field("sas_token", &self.sas_token.as_ref().map(|_| "<redacted>"))
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Object storage holding the staged files. Names are relative to the
/// store's prefix.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes (overwriting) an object and returns its full location.
    async fn put(&self, name: &str, data: Bytes) -> Result<String, StageError>;

    /// Names of all objects directly or indirectly under the prefix.
    async fn list(&self) -> Result<Vec<String>, StageError>;

    async fn delete(&self, name: &str) -> Result<(), StageError>;

    async fn get(&self, name: &str) -> Result<Bytes, StageError>;
}

/// `BlobStore` over any `object_store` backend.
#[derive(Clone)]
pub struct StageStore {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    canonical_url: String,
}

impl fmt::Debug for StageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageStore<{}/{}>", self.canonical_url, self.prefix)
    }
}

impl StageStore {
    pub fn from_url(
        url: &str,
        prefix: &str,
        credentials: &StageCredentials,
    ) -> Result<Self, StageError> {
        let config = BackendConfig::parse_url(url)?;

        let (store, canonical_url): (Arc<dyn ObjectStore>, String) = match config {
            BackendConfig::Azure { account, container } => {
                let mut builder = MicrosoftAzureBuilder::from_env()
                    .with_account(&account)
                    .with_container_name(&container)
                    .with_retry(RetryConfig::default());
                if let Some(sas) = &credentials.sas_token {
                    builder = builder.with_config(AzureConfigKey::SasKey, sas.trim_start_matches('?'));
                }
                if let Some(key) = &credentials.access_key {
                    builder = builder.with_access_key(key);
                }
                let canonical = format!("https://{account}.blob.core.windows.net/{container}");
                (Arc::new(builder.build()?), canonical)
            }
            BackendConfig::Local { root } => {
                std::fs::create_dir_all(&root)?;
                let canonical = format!("file://{}", root.display());
                (Arc::new(LocalFileSystem::new_with_prefix(&root)?), canonical)
            }
            BackendConfig::Memory => (Arc::new(InMemory::new()), "memory://".to_string()),
        };

        Ok(Self::with_store(store, prefix).with_canonical_url(canonical_url))
    }

    /// Wraps an existing store, e.g. an `InMemory` shared with a test.
    pub fn with_store(store: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        StageStore {
            store,
            prefix: prefix.trim_matches('/').to_string(),
            canonical_url: "custom://".to_string(),
        }
    }

    fn with_canonical_url(mut self, url: String) -> Self {
        self.canonical_url = url;
        self
    }

    fn location(&self, name: &str) -> Path {
        if self.prefix.is_empty() {
            Path::from(name)
        } else {
            Path::from(format!("{}/{}", self.prefix, name))
        }
    }

    fn relative_name(&self, location: &Path) -> Option<String> {
        let full = location.as_ref();
        if self.prefix.is_empty() {
            return Some(full.to_string());
        }
        full.strip_prefix(&self.prefix)?
            .strip_prefix('/')
            .map(str::to_string)
    }
}

#[async_trait]
impl BlobStore for StageStore {
    async fn put(&self, name: &str, data: Bytes) -> Result<String, StageError> {
        let location = self.location(name);
        let size = data.len();
        self.store.put(&location, PutPayload::from(data)).await?;
        debug!(location = %location, bytes = size, "Uploaded stage object");
        Ok(format!("{}/{}", self.canonical_url, location))
    }

    async fn list(&self) -> Result<Vec<String>, StageError> {
        let prefix = (!self.prefix.is_empty()).then(|| Path::from(self.prefix.as_str()));
        let metas: Vec<_> = self.store.list(prefix.as_ref()).try_collect().await?;
        let mut names: Vec<String> = metas
            .iter()
            .filter_map(|meta| self.relative_name(&meta.location))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<(), StageError> {
        let location = self.location(name);
        self.store.delete(&location).await?;
        debug!(location = %location, "Deleted stage object");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StageError> {
        let location = self.location(name);
        let bytes = self.store.get(&location).await?.bytes().await?;
        Ok(bytes)
    }
}

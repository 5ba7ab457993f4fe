//! Object storage for raw email objects and extracted attachments
//! Uses Apache Arrow object_store crate

pub mod sign;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::{ObjectStore, path::Path as StoragePath};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No store configured for bucket: {0}")]
    UnknownBucket(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage client wrapping object_store, bound to one bucket
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { store, bucket }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory(bucket: &str) -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            bucket: bucket.to_string(),
        }
    }

    /// Fetch full object content
    pub async fn fetch(&self, key: &str) -> Result<Bytes> {
        let path = StoragePath::from(key);

        let result = self.store.get(&path).await?;
        let bytes = result.bytes().await?;

        tracing::debug!(bucket = %self.bucket, key, size = bytes.len(), "Fetched object");

        Ok(bytes)
    }

    /// Write object content, overwriting any existing object at the key
    ///
    /// Last write wins; key collisions across records are accepted behavior.
    pub async fn store(&self, key: &str, data: Bytes) -> Result<()> {
        let path = StoragePath::from(key);
        let size = data.len();

        self.store.put(&path, data.into()).await?;

        tracing::info!(bucket = %self.bucket, key, size, "Stored object");

        Ok(())
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = StoragePath::from(key);

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Build an S3 store for one bucket from storage configuration
///
/// Credentials fall back to the ambient AWS chain (env, profile, instance
/// role) when not set explicitly.
pub fn build_s3(config: &StorageConfig, bucket: &str) -> Result<AmazonS3> {
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

    if let Some(region) = &config.region {
        builder = builder.with_region(region.clone());
    }
    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint.clone())
            .with_allow_http(true);
    }
    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key.clone());
    }
    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key.clone());
    }

    Ok(builder.build()?)
}

/// Read access to source buckets, keyed by bucket name
///
/// Source buckets are not known at startup; each event record names its own.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes>;
}

/// S3-backed source buckets, opened on first use and cached per bucket
pub struct S3Sources {
    config: StorageConfig,
    clients: Mutex<HashMap<String, StorageClient>>,
}

impl S3Sources {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SourceFetcher for S3Sources {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let client = {
            let mut clients = self.clients.lock().await;
            match clients.get(bucket) {
                Some(client) => client.clone(),
                None => {
                    let store = build_s3(&self.config, bucket)?;
                    let client = StorageClient::new(Arc::new(store), bucket.to_string());
                    clients.insert(bucket.to_string(), client.clone());
                    client
                }
            }
        };

        client.fetch(key).await
    }
}

/// In-memory source buckets for the local provider and tests
#[derive(Default)]
pub struct MemorySources {
    stores: HashMap<String, StorageClient>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-memory bucket, returning a client for seeding objects
    pub fn add_bucket(&mut self, bucket: &str) -> StorageClient {
        let client = StorageClient::in_memory(bucket);
        self.stores.insert(bucket.to_string(), client.clone());
        client
    }
}

#[async_trait]
impl SourceFetcher for MemorySources {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let client = self
            .stores
            .get(bucket)
            .ok_or_else(|| StorageError::UnknownBucket(bucket.to_string()))?;
        client.fetch(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_then_fetch() {
        let client = StorageClient::in_memory("test-bucket");

        client
            .store("attachments/invoice.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();

        let bytes = client.fetch("attachments/invoice.pdf").await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let client = StorageClient::in_memory("test-bucket");

        client
            .store("attachments/invoice.pdf", Bytes::from_static(b"first"))
            .await
            .unwrap();
        client
            .store("attachments/invoice.pdf", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let bytes = client.fetch("attachments/invoice.pdf").await.unwrap();
        assert_eq!(&bytes[..], b"second");
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let client = StorageClient::in_memory("test-bucket");
        let result = client.fetch("inbox/missing.eml").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_exists() {
        let client = StorageClient::in_memory("test-bucket");
        assert!(!client.exists("a/b").await.unwrap());

        client.store("a/b", Bytes::from_static(b"x")).await.unwrap();
        assert!(client.exists("a/b").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_sources_unknown_bucket() {
        let sources = MemorySources::new();
        let result = sources.fetch("nope", "inbox/msg.eml").await;
        assert!(matches!(result, Err(StorageError::UnknownBucket(_))));
    }

    #[tokio::test]
    async fn test_memory_sources_fetch() {
        let mut sources = MemorySources::new();
        let seed = sources.add_bucket("incoming-mail");
        seed.store("inbox/msg.eml", Bytes::from_static(b"raw mail"))
            .await
            .unwrap();

        let bytes = sources.fetch("incoming-mail", "inbox/msg.eml").await.unwrap();
        assert_eq!(&bytes[..], b"raw mail");
    }
}

//! Time-limited signed retrieval links for stored attachments.
//!
//! Links are generated fresh per attachment and never cached. Signing does
//! not verify that the object exists; callers only sign keys they have just
//! written.

use async_trait::async_trait;
use http::Method;
use object_store::aws::AmazonS3;
use object_store::path::Path as StoragePath;
use object_store::signer::Signer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("Signing failed: {0}")]
    SigningFailed(#[from] object_store::Error),
}

pub type Result<T> = std::result::Result<T, SignError>;

/// Issues a presigned GET URL for one destination object
#[async_trait]
pub trait LinkSigner: Send + Sync {
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String>;
}

/// Presigned S3 GET links
pub struct S3LinkSigner {
    store: Arc<AmazonS3>,
}

impl S3LinkSigner {
    pub fn new(store: Arc<AmazonS3>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LinkSigner for S3LinkSigner {
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String> {
        let path = StoragePath::from(key);
        let url = self.store.signed_url(Method::GET, &path, ttl).await?;

        tracing::debug!(key, ttl_secs = ttl.as_secs(), "Signed retrieval link");

        Ok(url.to_string())
    }
}

/// Fabricated links for the local provider and tests
///
/// A monotonic nonce keeps repeated signings of the same key distinct,
/// matching the fresh-per-attachment behavior of real presigned URLs.
pub struct LocalLinkSigner {
    base_url: String,
    nonce: AtomicU64,
}

impl LocalLinkSigner {
    pub fn new(bucket: &str) -> Self {
        Self {
            base_url: format!("https://local.attachbox.invalid/{bucket}"),
            nonce: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LinkSigner for LocalLinkSigner {
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String> {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        Ok(format!(
            "{}/{}?expires={}&sig={}",
            self.base_url,
            key,
            ttl.as_secs(),
            nonce
        ))
    }
}

//! Webhook notification dispatch.
//!
//! One form-encoded POST per extracted attachment, carrying the signed
//! retrieval link (`Body`) and the directory marker (`rm_dir`). Delivery is
//! best-effort: failures are logged and reported, never retried, and the
//! stored object is never rolled back.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::WebhookConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Transport(String),

    #[error("Webhook request timed out")]
    Timeout,

    #[error("Webhook returned HTTP {0}")]
    Status(u16),

    #[error("Webhook client construction failed: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;

/// Notification seam; the pipeline only sees this trait
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, link: &str, rm_dir: &str) -> Result<()>;
}

/// Production notifier posting to the configured endpoint
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNotifier {
    /// Build a notifier with explicit connect and request timeouts.
    ///
    /// A timeout at notify time is equivalent to any other delivery failure.
    pub fn new(endpoint: &str, api_key: Option<String>, config: &WebhookConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &WebhookConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| NotifyError::Client("webhook endpoint not configured".to_string()))?;
        Self::new(endpoint, config.api_key.clone(), config)
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, link: &str, rm_dir: &str) -> Result<()> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .form(&[("Body", link), ("rm_dir", rm_dir)]);

        // Unauthenticated mode is valid; the header is only attached when a
        // key is configured
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NotifyError::Timeout
            } else {
                NotifyError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        debug!(endpoint = %self.endpoint, rm_dir, "Webhook notified");

        Ok(())
    }
}

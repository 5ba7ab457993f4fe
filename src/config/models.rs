use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

/// Storage provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    S3,
    #[default]
    Local,
}

/// Storage configuration
///
/// `bucket` is the destination bucket for extracted attachments. It has no
/// default and startup fails without it. Source buckets arrive per event
/// record and are opened on demand.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    /// S3 access key (loaded from environment, not from config file)
    #[serde(skip)]
    pub access_key: Option<String>,
    /// S3 secret key (loaded from environment, not from config file)
    #[serde(skip)]
    pub secret_key: Option<String>,
}

/// Webhook notification configuration
///
/// `endpoint` is required; startup fails without it. The bearer key is a
/// secret and is only picked up from the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    pub endpoint: Option<String>,
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Signed link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Validity window of signed retrieval links, in seconds
    #[serde(default = "default_link_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_link_ttl_secs(),
        }
    }
}

fn default_link_ttl_secs() -> u64 {
    15 * 60
}

/// Attachment filter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Extension allow-list, matched case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "epub".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert!(config.storage.bucket.is_none());
        assert!(config.webhook.endpoint.is_none());
        assert_eq!(config.links.ttl_secs, 900);
        assert_eq!(config.filter.extensions, vec!["pdf", "epub"]);
        assert_eq!(config.webhook.connect_timeout_secs, 10);
        assert_eq!(config.webhook.request_timeout_secs, 30);
    }
}

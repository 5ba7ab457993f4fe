use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("storage.bucket is required (destination bucket for extracted attachments)")]
    MissingDestinationBucket,

    #[error("webhook.endpoint is required")]
    MissingWebhookEndpoint,

    #[error("webhook.endpoint is not a valid URL: {url}")]
    InvalidWebhookEndpoint { url: String },

    #[error("links.ttl_secs must be positive")]
    ZeroLinkTtl,

    #[error("filter.extensions must not be empty")]
    NoFilterExtensions,

    #[error("filter.extensions entries must be non-empty")]
    BlankFilterExtension,
}

/// Validate the entire configuration
///
/// Missing required settings are fatal at startup; the process must never
/// accept a batch with a partial configuration.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_storage(config)?;
    validate_webhook(config)?;
    validate_links(config)?;
    validate_filter(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    match &config.storage.bucket {
        Some(bucket) if !bucket.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingDestinationBucket),
    }
}

fn validate_webhook(config: &Config) -> Result<(), ValidationError> {
    let endpoint = match &config.webhook.endpoint {
        Some(endpoint) if !endpoint.is_empty() => endpoint,
        _ => return Err(ValidationError::MissingWebhookEndpoint),
    };

    if reqwest::Url::parse(endpoint).is_err() {
        return Err(ValidationError::InvalidWebhookEndpoint {
            url: endpoint.clone(),
        });
    }

    Ok(())
}

fn validate_links(config: &Config) -> Result<(), ValidationError> {
    if config.links.ttl_secs == 0 {
        return Err(ValidationError::ZeroLinkTtl);
    }
    Ok(())
}

fn validate_filter(config: &Config) -> Result<(), ValidationError> {
    if config.filter.extensions.is_empty() {
        return Err(ValidationError::NoFilterExtensions);
    }

    if config
        .filter
        .extensions
        .iter()
        .any(|ext| ext.trim_start_matches('.').is_empty())
    {
        return Err(ValidationError::BlankFilterExtension);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.storage.bucket = Some("mail-attachments".to_string());
        config.webhook.endpoint = Some("https://hooks.example.com/incoming".to_string());
        config
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_bucket() {
        let mut config = create_test_config();
        config.storage.bucket = None;

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::MissingDestinationBucket)
        ));
    }

    #[test]
    fn test_empty_bucket() {
        let mut config = create_test_config();
        config.storage.bucket = Some(String::new());

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::MissingDestinationBucket)
        ));
    }

    #[test]
    fn test_missing_webhook_endpoint() {
        let mut config = create_test_config();
        config.webhook.endpoint = None;

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::MissingWebhookEndpoint)
        ));
    }

    #[test]
    fn test_invalid_webhook_endpoint() {
        let mut config = create_test_config();
        config.webhook.endpoint = Some("not a url".to_string());

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidWebhookEndpoint { .. })
        ));
    }

    #[test]
    fn test_zero_link_ttl() {
        let mut config = create_test_config();
        config.links.ttl_secs = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroLinkTtl)));
    }

    #[test]
    fn test_empty_filter() {
        let mut config = create_test_config();
        config.filter.extensions.clear();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::NoFilterExtensions)));
    }

    #[test]
    fn test_blank_filter_extension() {
        let mut config = create_test_config();
        config.filter.extensions.push(".".to_string());

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::BlankFilterExtension)));
    }
}

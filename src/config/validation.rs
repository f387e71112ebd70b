use crate::config::types::{ApiConfig, Config, MapDefaults, ScrapeDefaults};
use crate::ConfigError;
use url::Url;

/// Longest accepted delay between two polls of a job
const MAX_POLL_INTERVAL_SECONDS: f64 = 3600.0;

/// Longest accepted timeout for a single HTTP request
const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_scrape_defaults(&config.scrape)?;
    validate_map_defaults(&config.map)?;
    Ok(())
}

/// Validates the connection and polling settings
///
/// Called by the coordinator and pipelines at construction, so a missing key
/// is reported before any network call.
pub fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.api_key.trim().is_empty() {
        return Err(ConfigError::MissingApiKey);
    }

    validate_base_url(&config.base_url)?;

    if !config.poll_interval_seconds.is_finite()
        || config.poll_interval_seconds <= 0.0
        || config.poll_interval_seconds > MAX_POLL_INTERVAL_SECONDS
    {
        return Err(ConfigError::Validation(format!(
            "poll_interval_seconds must be in (0, {}], got {}",
            MAX_POLL_INTERVAL_SECONDS, config.poll_interval_seconds
        )));
    }

    if (config.max_wait_seconds as f64) < config.poll_interval_seconds {
        return Err(ConfigError::Validation(format!(
            "max_wait_seconds ({}) must be >= poll_interval_seconds ({})",
            config.max_wait_seconds, config.poll_interval_seconds
        )));
    }

    if config.request_timeout_seconds == 0
        || config.request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS
    {
        return Err(ConfigError::Validation(format!(
            "request_timeout_seconds must be in 1..={}, got {}",
            MAX_REQUEST_TIMEOUT_SECONDS, config.request_timeout_seconds
        )));
    }

    Ok(())
}

/// Validates the API root URL
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    Ok(())
}

/// Validates scrape defaults
fn validate_scrape_defaults(config: &ScrapeDefaults) -> Result<(), ConfigError> {
    if config.formats.is_empty() {
        return Err(ConfigError::Validation(
            "scrape formats cannot be empty".to_string(),
        ));
    }

    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "scrape timeout must be > 0ms".to_string(),
        ));
    }

    Ok(())
}

/// Validates map defaults
fn validate_map_defaults(config: &MapDefaults) -> Result<(), ConfigError> {
    if config.ignore_sitemap && config.sitemap_only {
        return Err(ConfigError::Validation(
            "map ignore_sitemap and sitemap_only cannot both be set".to_string(),
        ));
    }

    Ok(())
}

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the Firecrawl API key
pub const ENV_API_KEY: &str = "FIRECRAWL_API_KEY";
/// Environment variable overriding the API root
pub const ENV_BASE_URL: &str = "FIRECRAWL_API_BASE_URL";
/// Environment variable overriding the poll interval (seconds, fractional allowed)
pub const ENV_POLL_INTERVAL: &str = "FIRECRAWL_POLL_INTERVAL_SECONDS";
/// Environment variable overriding the maximum wait (seconds)
pub const ENV_MAX_WAIT: &str = "FIRECRAWL_MAX_WAIT_SECONDS";

/// Loads and parses a configuration file from the given path
///
/// Environment variables are applied on top of the file before validation,
/// so the API key can stay out of the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use firecrawl_pipes::config::load_config;
///
/// let config = load_config(Path::new("firecrawl.toml")).unwrap();
/// println!("Max depth: {}", config.crawl.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Builds a configuration from defaults and `FIRECRAWL_*` environment variables
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides to a configuration
///
/// `lookup` resolves a variable name to its value; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(api_key) = lookup(ENV_API_KEY) {
        config.api.api_key = api_key.trim().to_string();
    }

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.api.base_url = base_url.trim().to_string();
    }

    if let Some(interval) = lookup(ENV_POLL_INTERVAL) {
        config.api.poll_interval_seconds = interval.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "{} must be a number of seconds, got '{}'",
                ENV_POLL_INTERVAL, interval
            ))
        })?;
    }

    if let Some(max_wait) = lookup(ENV_MAX_WAIT) {
        config.api.max_wait_seconds = max_wait.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "{} must be a whole number of seconds, got '{}'",
                ENV_MAX_WAIT, max_wait
            ))
        })?;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a pipeline run can be tied to the exact settings it
/// used without printing the API key.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Masks an API key for logging, keeping only the first and last 4 characters
///
/// Keys of 8 characters or fewer are hidden completely.
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

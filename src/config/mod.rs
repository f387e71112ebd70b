//! Configuration module for Firecrawl Pipes
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering `FIRECRAWL_*` environment variables on top.
//!
//! # Example
//!
//! ```no_run
//! use firecrawl_pipes::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("firecrawl.toml")).unwrap();
//! println!("Polling every {}s", config.api.poll_interval_seconds);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, CrawlDefaults, ExtractDefaults, MapDefaults, ScrapeDefaults,
    DEFAULT_API_BASE_URL,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_from_env,
    load_config_with_hash, mask_api_key,
};
pub use validation::{validate, validate_api_config};

//! Firecrawl Pipes: chat-ready adapters for the Firecrawl web-scraping API
//!
//! This crate submits crawl, scrape, map and extract jobs to Firecrawl, waits
//! for asynchronous jobs to finish, and turns the results into a single text
//! blob a chat host (or a terminal) can show to a user.

pub mod api;
pub mod config;
pub mod crawler;
pub mod message;
pub mod output;
pub mod pipelines;
pub mod state;

use thiserror::Error;

/// Main error type for Firecrawl pipeline operations
#[derive(Debug, Error)]
pub enum PipeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job submission failed: {0}")]
    Submission(String),

    #[error("Status request for job {job_id} failed: {message}")]
    Poll { job_id: String, message: String },

    #[error("Invalid response from Firecrawl: {0}")]
    InvalidResponse(String),

    #[error("Crawl failed: {0}")]
    CrawlFailed(String),

    #[error("Extraction failed: {0}")]
    ExtractFailed(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Job {job_id} did not finish within {waited_secs} seconds")]
    Timeout { job_id: String, waited_secs: u64 },

    #[error("Request to /{endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("FIRECRAWL_API_KEY is not set")]
    MissingApiKey,
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{CrawlRequest, Document, FirecrawlClient, OutputFormat, ScrapeOptions};
pub use config::{ApiConfig, Config};
pub use crawler::{run_crawl, Coordinator};
pub use pipelines::Pipelines;
pub use state::JobStatus;
pub use tokio_util::sync::CancellationToken;

use crate::api::OutputFormat;
use serde::Deserialize;
use std::time::Duration;

/// Default Firecrawl API root, including the version segment
pub const DEFAULT_API_BASE_URL: &str = "https://api.firecrawl.dev/v1";

/// Main configuration structure for Firecrawl Pipes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub crawl: CrawlDefaults,
    #[serde(default)]
    pub scrape: ScrapeDefaults,
    #[serde(default)]
    pub map: MapDefaults,
    #[serde(default)]
    pub extract: ExtractDefaults,
}

/// Connection and polling settings handed to the coordinator at construction
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bearer token sent with every request
    #[serde(rename = "api-key", default)]
    pub api_key: String,

    /// API root, e.g. `https://api.firecrawl.dev/v1`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Delay between two status polls of the same job
    #[serde(rename = "poll-interval-seconds", default = "default_poll_interval")]
    pub poll_interval_seconds: f64,

    /// Upper bound on how long a job is polled before giving up
    #[serde(rename = "max-wait-seconds", default = "default_max_wait")]
    pub max_wait_seconds: u64,

    /// Timeout applied to each individual HTTP request
    #[serde(rename = "request-timeout-seconds", default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    /// Creates an API configuration with the given key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Overrides the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the poll interval
    pub fn with_poll_interval(mut self, seconds: f64) -> Self {
        self.poll_interval_seconds = seconds;
        self
    }

    /// Overrides the maximum wait
    pub fn with_max_wait(mut self, seconds: u64) -> Self {
        self.max_wait_seconds = seconds;
        self
    }

    /// Poll interval as a duration; values too large to represent saturate
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.poll_interval_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            poll_interval_seconds: default_poll_interval(),
            max_wait_seconds: default_max_wait(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Defaults applied to crawl requests built from a bare URL
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlDefaults {
    /// Maximum link depth from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages to crawl
    #[serde(default = "default_url_limit")]
    pub limit: u32,

    /// Path patterns a page must match to be crawled
    #[serde(rename = "include-paths", default)]
    pub include_paths: Vec<String>,

    /// Path patterns that exclude a page from the crawl
    #[serde(rename = "exclude-paths", default)]
    pub exclude_paths: Vec<String>,

    #[serde(rename = "ignore-sitemap", default)]
    pub ignore_sitemap: bool,

    #[serde(rename = "ignore-query-parameters", default)]
    pub ignore_query_parameters: bool,

    #[serde(rename = "allow-backward-links", default)]
    pub allow_backward_links: bool,

    #[serde(rename = "allow-external-links", default)]
    pub allow_external_links: bool,
}

impl Default for CrawlDefaults {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            limit: default_url_limit(),
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            ignore_sitemap: false,
            ignore_query_parameters: false,
            allow_backward_links: false,
            allow_external_links: false,
        }
    }
}

/// Defaults for the per-page scrape options used by crawl, scrape and extract
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeDefaults {
    /// Output formats requested from Firecrawl; the first one is displayed
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,

    #[serde(rename = "only-main-content", default = "default_true")]
    pub only_main_content: bool,

    /// Time to wait for the page to render (milliseconds)
    #[serde(rename = "wait-for", default = "default_wait_for")]
    pub wait_for: u64,

    #[serde(default)]
    pub mobile: bool,

    /// Per-page scrape timeout on the Firecrawl side (milliseconds)
    #[serde(default = "default_scrape_timeout")]
    pub timeout: u64,

    #[serde(rename = "remove-base64-images", default = "default_true")]
    pub remove_base64_images: bool,

    #[serde(rename = "block-ads", default = "default_true")]
    pub block_ads: bool,

    #[serde(rename = "include-tags", default)]
    pub include_tags: Vec<String>,

    #[serde(rename = "exclude-tags", default)]
    pub exclude_tags: Vec<String>,

    #[serde(rename = "location-country", default = "default_country")]
    pub location_country: String,

    #[serde(rename = "location-languages", default = "default_languages")]
    pub location_languages: Vec<String>,
}

impl ScrapeDefaults {
    /// The format whose content is shown to the user
    pub fn primary_format(&self) -> OutputFormat {
        self.formats.first().copied().unwrap_or_default()
    }
}

impl Default for ScrapeDefaults {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            only_main_content: true,
            wait_for: default_wait_for(),
            mobile: false,
            timeout: default_scrape_timeout(),
            remove_base64_images: true,
            block_ads: true,
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            location_country: default_country(),
            location_languages: default_languages(),
        }
    }
}

/// Defaults for URL mapping
#[derive(Debug, Clone, Deserialize)]
pub struct MapDefaults {
    /// Maximum number of links returned
    #[serde(default = "default_url_limit")]
    pub limit: u32,

    #[serde(rename = "ignore-sitemap", default)]
    pub ignore_sitemap: bool,

    #[serde(rename = "sitemap-only", default)]
    pub sitemap_only: bool,

    #[serde(rename = "include-subdomains", default)]
    pub include_subdomains: bool,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            limit: default_url_limit(),
            ignore_sitemap: false,
            sitemap_only: false,
            include_subdomains: false,
        }
    }
}

/// Defaults for structured extraction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractDefaults {
    #[serde(rename = "enable-web-search", default)]
    pub enable_web_search: bool,

    #[serde(rename = "ignore-sitemap", default)]
    pub ignore_sitemap: bool,

    #[serde(rename = "include-subdomains", default)]
    pub include_subdomains: bool,

    #[serde(rename = "show-sources", default)]
    pub show_sources: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_poll_interval() -> f64 {
    2.0
}

fn default_max_wait() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_depth() -> u32 {
    3
}

fn default_url_limit() -> u32 {
    100
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Markdown]
}

fn default_true() -> bool {
    true
}

fn default_wait_for() -> u64 {
    5000
}

fn default_scrape_timeout() -> u64 {
    30000
}

fn default_country() -> String {
    "US".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["en-US".to_string()]
}

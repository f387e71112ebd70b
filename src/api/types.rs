//! Request and response types for the Firecrawl v1 API
//!
//! Requests serialize to the camelCase JSON the API expects. Responses are
//! deserialized leniently: optional or `null` fields never fail a parse, but
//! a missing `status` on a job payload does.

use crate::config::{CrawlDefaults, ScrapeDefaults};
use crate::state::JobStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Content formats Firecrawl can return for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    RawHtml,
    Links,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::RawHtml => "rawHtml",
            Self::Links => "links",
        }
    }

    /// Parses a format name, accepting `raw_html`/`rawhtml` spellings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "rawhtml" | "raw_html" | "raw-html" => Some(Self::RawHtml),
            "links" => Some(Self::Links),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Geographic hints for the remote browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

/// Per-page scrape options shared by crawl, scrape and extract requests
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    pub formats: Vec<OutputFormat>,
    pub only_main_content: bool,
    /// Milliseconds to wait for the page before scraping
    pub wait_for: u64,
    pub mobile: bool,
    /// Milliseconds before the remote scrape gives up
    pub timeout: u64,
    pub remove_base64_images: bool,
    pub block_ads: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_tags: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ScrapeOptions {
    /// The format whose content is shown to the user
    pub fn primary_format(&self) -> OutputFormat {
        self.formats.first().copied().unwrap_or_default()
    }
}

impl From<&ScrapeDefaults> for ScrapeOptions {
    fn from(defaults: &ScrapeDefaults) -> Self {
        let country = Some(defaults.location_country.trim().to_string()).filter(|c| !c.is_empty());
        let languages: Vec<String> = defaults
            .location_languages
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        let location = if country.is_none() && languages.is_empty() {
            None
        } else {
            Some(Location { country, languages })
        };

        Self {
            formats: defaults.formats.clone(),
            only_main_content: defaults.only_main_content,
            wait_for: defaults.wait_for,
            mobile: defaults.mobile,
            timeout: defaults.timeout,
            remove_base64_images: defaults.remove_base64_images,
            block_ads: defaults.block_ads,
            include_tags: defaults.include_tags.clone(),
            exclude_tags: defaults.exclude_tags.clone(),
            headers: BTreeMap::new(),
            location,
        }
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self::from(&ScrapeDefaults::default())
    }
}

/// A crawl job submission
///
/// Built once per invocation and handed to the coordinator by reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_paths: Vec<String>,
    pub max_depth: u32,
    pub limit: u32,
    pub ignore_sitemap: bool,
    pub ignore_query_parameters: bool,
    pub allow_backward_links: bool,
    pub allow_external_links: bool,
    pub scrape_options: ScrapeOptions,
}

impl CrawlRequest {
    /// Creates a crawl request for `url` using the built-in defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_defaults(url, &CrawlDefaults::default(), &ScrapeDefaults::default())
    }

    /// Creates a crawl request for `url` from configured defaults
    pub fn from_defaults(
        url: impl Into<String>,
        crawl: &CrawlDefaults,
        scrape: &ScrapeDefaults,
    ) -> Self {
        Self {
            url: url.into(),
            include_paths: crawl.include_paths.clone(),
            exclude_paths: crawl.exclude_paths.clone(),
            max_depth: crawl.max_depth,
            limit: crawl.limit,
            ignore_sitemap: crawl.ignore_sitemap,
            ignore_query_parameters: crawl.ignore_query_parameters,
            allow_backward_links: crawl.allow_backward_links,
            allow_external_links: crawl.allow_external_links,
            scrape_options: ScrapeOptions::from(scrape),
        }
    }

    /// The format whose content ends up in the formatted output
    pub fn display_format(&self) -> OutputFormat {
        self.scrape_options.primary_format()
    }
}

/// A single-page scrape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(flatten)]
    pub options: ScrapeOptions,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, options: ScrapeOptions) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }
}

/// A site map (URL discovery) request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    pub ignore_sitemap: bool,
    pub sitemap_only: bool,
    pub include_subdomains: bool,
    pub limit: u32,
}

/// A structured extraction request over one or more URLs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub urls: Vec<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
    pub enable_web_search: bool,
    pub ignore_sitemap: bool,
    pub include_subdomains: bool,
    pub show_sources: bool,
    pub scrape_options: ScrapeOptions,
}

/// Response to `POST /crawl` and `POST /extract`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JobSubmission {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Page metadata reported by Firecrawl
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

/// One scraped page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub url: Option<String>,
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub raw_html: Option<String>,
    pub links: Option<Vec<String>>,
    pub metadata: Option<DocumentMetadata>,
    pub warning: Option<String>,
}

impl Document {
    /// The page URL: `metadata.sourceURL`, then `url`, then `metadata.url`
    pub fn source_url(&self) -> Option<&str> {
        let metadata = self.metadata.as_ref();
        metadata
            .and_then(|m| non_empty(&m.source_url))
            .or_else(|| non_empty(&self.url))
            .or_else(|| metadata.and_then(|m| non_empty(&m.url)))
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| non_empty(&m.title))
    }

    /// Page content in `format`, falling back to markdown, html, raw html
    pub fn content(&self, format: OutputFormat) -> Option<&str> {
        let requested = match format {
            OutputFormat::Markdown => non_empty(&self.markdown),
            OutputFormat::Html => non_empty(&self.html),
            OutputFormat::RawHtml => non_empty(&self.raw_html),
            OutputFormat::Links => None,
        };

        requested
            .or_else(|| non_empty(&self.markdown))
            .or_else(|| non_empty(&self.html))
            .or_else(|| non_empty(&self.raw_html))
    }

    pub fn links(&self) -> &[String] {
        self.links.as_deref().unwrap_or(&[])
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Status of a remote crawl job, as of one status fetch
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlJob {
    pub id: String,
    pub status: JobStatus,
    pub completed: u64,
    pub total: u64,
    pub credits_used: u64,
    pub expires_at: Option<DateTime<Utc>>,
    /// Continuation token for the next result page
    pub next: Option<String>,
    pub error: Option<String>,
}

/// Documents returned by one status or continuation fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlResultPage {
    pub documents: Vec<Document>,
}

/// One status fetch: the job state plus the page of documents it carried
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSnapshot {
    pub job: CrawlJob,
    pub page: CrawlResultPage,
}

/// Wire shape of `GET /crawl/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CrawlStatusPayload {
    pub status: JobStatus,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub credits_used: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Document>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CrawlStatusPayload {
    pub fn into_snapshot(self, id: &str) -> CrawlSnapshot {
        CrawlSnapshot {
            job: CrawlJob {
                id: id.to_string(),
                status: self.status,
                completed: self.completed.unwrap_or(0),
                total: self.total.unwrap_or(0),
                credits_used: self.credits_used.unwrap_or(0),
                expires_at: parse_timestamp(self.expires_at.as_deref()),
                next: self.next.filter(|n| !n.trim().is_empty()),
                error: self.error,
            },
            page: CrawlResultPage {
                documents: self.data.unwrap_or_default(),
            },
        }
    }
}

/// Response to `POST /scrape`
#[derive(Debug, Deserialize)]
pub(crate) struct ScrapeResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Document>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response to `POST /map`
#[derive(Debug, Deserialize)]
pub(crate) struct MapResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Status and result of a remote extract job
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractJob {
    pub id: String,
    pub status: JobStatus,
    pub data: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub warning: Option<String>,
}

/// Wire shape of `GET /extract/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtractStatusPayload {
    pub status: JobStatus,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

impl ExtractStatusPayload {
    pub fn into_job(self, id: &str) -> ExtractJob {
        ExtractJob {
            id: id.to_string(),
            status: self.status,
            data: self.data.unwrap_or(serde_json::Value::Null),
            expires_at: parse_timestamp(self.expires_at.as_deref()),
            error: self.error,
            warning: self.warning,
        }
    }
}

/// Parses an RFC 3339 timestamp; anything else is dropped
fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

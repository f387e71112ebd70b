//! Firecrawl HTTP client
//!
//! This module handles all HTTP requests to the Firecrawl API, including:
//! - Building HTTP clients with bearer auth and integration headers
//! - Job submission for crawl and extract
//! - Status and continuation fetches for running jobs
//! - Single-call scrape and map requests
//! - Error classification into `PipeError` variants

use crate::api::types::{
    CrawlRequest, CrawlSnapshot, CrawlStatusPayload, Document, ExtractJob, ExtractRequest,
    ExtractStatusPayload, JobSubmission, MapRequest, MapResponse, ScrapeRequest, ScrapeResponse,
};
use crate::config::{validate_api_config, ApiConfig};
use crate::{ConfigError, PipeError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("firecrawl-pipes/", env!("CARGO_PKG_VERSION"));

/// Longest slice of a response body quoted in an error message
const MAX_ERROR_BODY: usize = 500;

/// Builds an HTTP client with Firecrawl authentication headers
///
/// # Arguments
///
/// * `config` - The API configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(PipeError)` - The API key is not a valid header value, or the
///   client could not be built
///
/// # Example
///
/// ```no_run
/// use firecrawl_pipes::config::ApiConfig;
/// use firecrawl_pipes::api::build_http_client;
///
/// let client = build_http_client(&ApiConfig::new("fc-your-key")).unwrap();
/// ```
pub fn build_http_client(config: &ApiConfig) -> Result<Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.trim()))
        .map_err(|_| {
            ConfigError::Validation("api_key contains characters not allowed in a header".into())
        })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("x-origin", HeaderValue::from_static("firecrawl-pipes"));
    headers.insert("x-origin-type", HeaderValue::from_static("integration"));

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Typed client for the Firecrawl v1 endpoints used by the pipelines
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    http: Client,
    base_url: String,
}

impl FirecrawlClient {
    /// Creates a client after validating the API configuration
    ///
    /// A missing API key fails here, before any request is made.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        validate_api_config(config)?;
        let http = build_http_client(config)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/{resource}/{job_id}` with the id as one encoded path segment
    ///
    /// Ids are restricted to ASCII letters, digits, `-` and `_`, so a
    /// caller-supplied id cannot point the request at another endpoint.
    fn job_url(&self, resource: &str, job_id: &str) -> Result<Url> {
        if !is_valid_job_id(job_id) {
            return Err(ConfigError::Validation(format!("invalid job id '{}'", job_id)).into());
        }

        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(resource)
            .push(job_id);
        Ok(url)
    }

    fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.base_url, e)).into())
    }

    /// Submits a crawl job and returns its id
    ///
    /// # Errors
    ///
    /// * `PipeError::Submission` - transport failure, non-2xx status,
    ///   unparseable body, or `success: false`
    /// * `PipeError::InvalidResponse` - accepted but no job id returned
    pub async fn submit_crawl(&self, request: &CrawlRequest) -> Result<String> {
        tracing::debug!(
            "Submitting crawl for {} (limit {}, max depth {})",
            request.url,
            request.limit,
            request.max_depth
        );
        self.submit_job("crawl", request).await
    }

    /// Fetches the current status (and first result page) of a crawl job
    pub async fn crawl_status(&self, job_id: &str) -> Result<CrawlSnapshot> {
        let url = self.job_url("crawl", job_id)?;
        let payload: CrawlStatusPayload = self.fetch_status(url.as_str(), job_id).await?;
        Ok(payload.into_snapshot(job_id))
    }

    /// Fetches a continuation page of a completed crawl job
    pub async fn crawl_page(&self, job_id: &str, next: &str) -> Result<CrawlSnapshot> {
        let url = self.continuation_url(job_id, next)?;
        let payload: CrawlStatusPayload = self.fetch_status(&url, job_id).await?;
        Ok(payload.into_snapshot(job_id))
    }

    /// Resolves a page-continuation token to a request URL
    ///
    /// Firecrawl returns absolute URLs, which are used as-is when they share
    /// the API's scheme, host and port; the client sends the API key with
    /// every request, so any other origin is rejected. Any other token is
    /// passed as the `next` query parameter of the status endpoint.
    pub fn continuation_url(&self, job_id: &str, next: &str) -> Result<String> {
        let next = next.trim();
        if next.starts_with("http://") || next.starts_with("https://") {
            let url = Url::parse(next).map_err(|e| {
                PipeError::InvalidResponse(format!("bad continuation URL: {}", e))
            })?;
            let base = self.base()?;
            if url.origin() != base.origin() {
                tracing::warn!(
                    "Crawl job {} returned a continuation URL on {}, refusing to follow",
                    job_id,
                    url.origin().ascii_serialization()
                );
                return Err(PipeError::InvalidResponse(format!(
                    "continuation URL points to {} instead of {}",
                    url.origin().ascii_serialization(),
                    base.origin().ascii_serialization()
                )));
            }
            return Ok(url.to_string());
        }

        let mut url = self.job_url("crawl", job_id)?;
        url.query_pairs_mut().append_pair("next", next);
        Ok(url.to_string())
    }

    /// Scrapes a single page; `Ok(None)` when the service returned no data
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<Option<Document>> {
        let response: ScrapeResponse = self.post_json("scrape", request).await?;
        if response.success == Some(false) {
            return Err(request_error(
                "scrape",
                response.error.unwrap_or_else(|| "service reported failure".to_string()),
            ));
        }
        Ok(response.data)
    }

    /// Maps a site and returns the discovered links
    pub async fn map(&self, request: &MapRequest) -> Result<Vec<String>> {
        let response: MapResponse = self.post_json("map", request).await?;
        if response.success == Some(false) {
            return Err(request_error(
                "map",
                response.error.unwrap_or_else(|| "service reported failure".to_string()),
            ));
        }
        Ok(response.links.unwrap_or_default())
    }

    /// Submits an extract job and returns its id
    pub async fn submit_extract(&self, request: &ExtractRequest) -> Result<String> {
        tracing::debug!("Submitting extract for {} URL(s)", request.urls.len());
        self.submit_job("extract", request).await
    }

    /// Fetches the status and data of an extract job
    pub async fn extract_status(&self, job_id: &str) -> Result<ExtractJob> {
        let url = self.job_url("extract", job_id)?;
        let payload: ExtractStatusPayload = self.fetch_status(url.as_str(), job_id).await?;
        Ok(payload.into_job(job_id))
    }

    /// POSTs a job and extracts its id
    async fn submit_job<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| PipeError::Submission(format!("request to /{} failed: {}", endpoint, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PipeError::Submission(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!("/{} returned {}", endpoint, status);
            return Err(PipeError::Submission(describe_api_error(status, &text)));
        }

        let submission: JobSubmission = serde_json::from_str(&text).map_err(|e| {
            PipeError::Submission(format!(
                "unparseable response ({}): {}",
                e,
                truncate(&text)
            ))
        })?;

        if submission.success == Some(false) {
            return Err(PipeError::Submission(
                submission
                    .error
                    .unwrap_or_else(|| "service reported failure".to_string()),
            ));
        }

        match submission.id.filter(|id| !id.trim().is_empty()) {
            Some(id) if is_valid_job_id(&id) => {
                tracing::info!("Submitted /{} job {}", endpoint, id);
                Ok(id)
            }
            Some(id) => Err(PipeError::InvalidResponse(format!(
                "/{} returned a malformed job id '{}'",
                endpoint, id
            ))),
            None => Err(PipeError::InvalidResponse(format!(
                "/{} accepted the request but returned no job id",
                endpoint
            ))),
        }
    }

    /// GETs a job status URL; every failure is a poll error
    async fn fetch_status<T: DeserializeOwned>(&self, url: &str, job_id: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let poll_error = |message: String| PipeError::Poll {
            job_id: job_id.to_string(),
            message,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| poll_error(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| poll_error(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(poll_error(describe_api_error(status, &text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| poll_error(format!("unparseable status response ({})", e)))
    }

    /// POSTs a single-call request; every failure is a request error
    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST /{}", endpoint);

        let response = self
            .http
            .post(self.endpoint(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| request_error(endpoint, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| request_error(endpoint, format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(request_error(endpoint, describe_api_error(status, &text)));
        }

        serde_json::from_str(&text).map_err(|e| {
            request_error(
                endpoint,
                format!("unparseable response ({}): {}", e, truncate(&text)),
            )
        })
    }
}

fn is_valid_job_id(job_id: &str) -> bool {
    !job_id.is_empty()
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn request_error(endpoint: &str, message: String) -> PipeError {
    PipeError::Request {
        endpoint: endpoint.to_string(),
        message,
    }
}

/// Builds a human-readable message from a non-2xx response
///
/// Firecrawl error bodies look like `{"success": false, "error": "..."}`;
/// the status line is always included.
pub fn describe_api_error(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.as_str())
                .map(|e| e.to_string())
        })
        .unwrap_or_else(|| truncate(body.trim()));

    if detail.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, detail)
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", head)
    }
}

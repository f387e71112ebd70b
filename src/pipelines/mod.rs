//! Pipeline entry points
//!
//! [`Pipelines`] bundles a validated configuration with one Firecrawl client
//! and exposes every operation a chat host or CLI can trigger:
//! - Crawl and crawl status
//! - Single-page scrape
//! - Site map
//! - Structured extraction and extract status
//! - Free-text message routing to any of the above

mod extract;
mod map;
mod scrape;

use crate::api::{CrawlRequest, FirecrawlClient};
use crate::config::{validate, Config};
use crate::crawler::{Coordinator, Poller};
use crate::message::{route_message, Intent, NO_URL_MESSAGE, WELCOME_MESSAGE};
use crate::Result;
use tokio_util::sync::CancellationToken;

/// All Firecrawl pipelines over one configuration
#[derive(Debug, Clone)]
pub struct Pipelines {
    config: Config,
    coordinator: Coordinator,
}

impl Pipelines {
    /// Validates `config` and builds the shared client
    ///
    /// # Returns
    ///
    /// * `Ok(Pipelines)` - Ready to serve requests
    /// * `Err(PipeError::Config)` - Missing API key or invalid settings
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;
        let client = FirecrawlClient::new(&config.api)?;
        let coordinator = Coordinator::with_client(client, Poller::from_config(&config.api));
        Ok(Self {
            config,
            coordinator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn client(&self) -> &FirecrawlClient {
        self.coordinator.client()
    }

    fn poller(&self) -> Poller {
        Poller::from_config(&self.config.api)
    }

    /// Crawl request for `url` built from the configured defaults
    pub fn crawl_request(&self, url: impl Into<String>) -> CrawlRequest {
        CrawlRequest::from_defaults(url, &self.config.crawl, &self.config.scrape)
    }

    /// Crawls `url` with the configured defaults and returns formatted pages
    pub async fn crawl(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        self.crawl_with(&self.crawl_request(url), cancel).await
    }

    /// Crawls with an explicit request
    pub async fn crawl_with(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.coordinator.run_crawl(request, cancel).await
    }

    /// Checks the status of an existing crawl job once
    pub async fn crawl_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<String> {
        self.coordinator.check_status(job_id, cancel).await
    }

    /// Answers a free-text chat message
    ///
    /// Greetings get the welcome text and "check status of <id>" checks a
    /// crawl or extract job. A URL is scraped, mapped or extracted from when
    /// the message says so, and crawled otherwise.
    pub async fn respond(&self, message: &str, cancel: &CancellationToken) -> Result<String> {
        match route_message(message) {
            Intent::Greeting => Ok(WELCOME_MESSAGE.to_string()),
            Intent::CrawlStatus { job_id } => {
                tracing::info!("Checking crawl status for job {}", job_id);
                self.crawl_status(&job_id, cancel).await
            }
            Intent::ExtractStatus { job_id } => {
                tracing::info!("Checking extract status for job {}", job_id);
                self.extract_status(&job_id, cancel).await
            }
            Intent::Crawl { url } => {
                tracing::info!("Starting crawl for URL: {}", url);
                self.crawl(&url, cancel).await
            }
            Intent::Scrape { url } => {
                tracing::info!("Scraping URL: {}", url);
                self.scrape(&self.scrape_request(url), cancel).await
            }
            Intent::Map { url, search } => {
                tracing::info!("Mapping URL: {}", url);
                self.map(&self.map_request(url, search), cancel).await
            }
            Intent::Extract {
                urls,
                prompt,
                schema,
            } => {
                tracing::info!("Extracting from {} URL(s)", urls.len());
                self.extract(&self.extract_request(urls, &prompt, schema), cancel)
                    .await
            }
            Intent::Unrecognized => Ok(NO_URL_MESSAGE.to_string()),
        }
    }
}

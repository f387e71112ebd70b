//! Crawl coordinator - submit, poll, paginate, format
//!
//! This module drives one crawl job from submission to formatted output:
//! - Submitting the crawl request
//! - Waiting for a terminal status with the bounded poller
//! - Following page-continuation tokens of a completed job
//! - Formatting the aggregated documents for the caller

use crate::api::{CrawlJob, CrawlRequest, Document, FirecrawlClient};
use crate::config::ApiConfig;
use crate::crawler::poller::{guard, Poller};
use crate::output::{format_crawl_result, format_crawl_status};
use crate::state::JobStatus;
use crate::{ConfigError, PipeError, Result};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Everything a completed crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Job counters as reported by the terminal status fetch
    pub job: CrawlJob,
    /// Documents of every result page, in fetch order
    pub documents: Vec<Document>,
    /// Number of result pages fetched, including the terminal status payload
    pub pages_fetched: usize,
}

/// Crawl orchestration over a Firecrawl client
#[derive(Debug, Clone)]
pub struct Coordinator {
    client: FirecrawlClient,
    poller: Poller,
}

impl Coordinator {
    /// Creates a coordinator from an explicit API configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration is valid and the client was built
    /// * `Err(PipeError::Config)` - Missing API key or invalid settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = FirecrawlClient::new(config)?;
        tracing::debug!(
            "Coordinator ready for {} (poll every {:?}, give up after {:?})",
            client.base_url(),
            config.poll_interval(),
            config.max_wait()
        );
        Ok(Self::with_client(client, Poller::from_config(config)))
    }

    /// Creates a coordinator around an existing client and poller
    pub fn with_client(client: FirecrawlClient, poller: Poller) -> Self {
        Self { client, poller }
    }

    pub fn client(&self) -> &FirecrawlClient {
        &self.client
    }

    /// Runs a crawl and returns the formatted text of every crawled page
    ///
    /// Either the full aggregated text is returned or an error; there are no
    /// partial results.
    pub async fn run_crawl(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let outcome = self.collect_crawl(request, cancel).await?;
        Ok(format_crawl_result(
            &outcome.job,
            &outcome.documents,
            request.display_format(),
        ))
    }

    /// Runs a crawl and returns the aggregated documents unformatted
    ///
    /// # Errors
    ///
    /// * `PipeError::Config` - the request URL is empty
    /// * `PipeError::Submission` / `PipeError::InvalidResponse` - submission failed
    /// * `PipeError::Poll` - a status or continuation fetch failed
    /// * `PipeError::CrawlFailed` - the service reported the job as failed
    /// * `PipeError::Cancelled` / `PipeError::Timeout` - the wait was cut short
    pub async fn collect_crawl(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome> {
        if request.url.trim().is_empty() {
            return Err(ConfigError::InvalidUrl("crawl URL cannot be empty".to_string()).into());
        }

        let job_id = guard(cancel, self.client.submit_crawl(request)).await?;
        tracing::info!("Crawl job {} started for {}", job_id, request.url);

        let terminal = self
            .poller
            .wait(&job_id, cancel, || self.client.crawl_status(&job_id))
            .await?;

        let mut job = terminal.job;
        match job.status {
            JobStatus::Failed => {
                let message = job
                    .error
                    .take()
                    .unwrap_or_else(|| format!("crawl job {} failed", job_id));
                tracing::error!("Crawl job {} failed: {}", job_id, message);
                return Err(PipeError::CrawlFailed(message));
            }
            JobStatus::Cancelled => {
                return Err(PipeError::CrawlFailed(format!(
                    "crawl job {} was cancelled",
                    job_id
                )));
            }
            _ => {}
        }

        let mut documents = terminal.page.documents;
        let mut pages_fetched = 1;
        let mut seen_tokens = HashSet::new();

        while let Some(next) = job.next.take() {
            if !seen_tokens.insert(next.clone()) {
                return Err(PipeError::InvalidResponse(format!(
                    "crawl job {} repeated continuation token {}",
                    job_id, next
                )));
            }

            let snapshot = guard(cancel, self.client.crawl_page(&job_id, &next)).await?;
            pages_fetched += 1;
            tracing::debug!(
                "Crawl job {} page {}: {} document(s)",
                job_id,
                pages_fetched,
                snapshot.page.documents.len()
            );
            documents.extend(snapshot.page.documents);
            job.next = snapshot.job.next;
        }

        tracing::info!(
            "Crawl job {} completed: {} document(s) across {} page(s), {} credit(s) used",
            job_id,
            documents.len(),
            pages_fetched,
            job.credits_used
        );

        Ok(CrawlOutcome {
            job,
            documents,
            pages_fetched,
        })
    }

    /// Fetches a crawl job's status once and formats it
    ///
    /// Does not wait for completion and does not follow continuation tokens.
    pub async fn check_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<String> {
        let job_id = job_id.trim();
        if job_id.is_empty() {
            return Err(ConfigError::Validation("crawl job id cannot be empty".to_string()).into());
        }

        let snapshot = guard(cancel, self.client.crawl_status(job_id)).await?;
        Ok(format_crawl_status(&snapshot.job, &snapshot.page.documents))
    }
}

/// Runs a crawl with a one-off coordinator
///
/// # Example
///
/// ```no_run
/// use firecrawl_pipes::{run_crawl, ApiConfig, CancellationToken, CrawlRequest};
///
/// # async fn example() -> firecrawl_pipes::Result<()> {
/// let config = ApiConfig::new("fc-your-key");
/// let request = CrawlRequest { limit: 5, ..CrawlRequest::new("https://example.com") };
/// let text = run_crawl(&request, &config, &CancellationToken::new()).await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    request: &CrawlRequest,
    config: &ApiConfig,
    cancel: &CancellationToken,
) -> Result<String> {
    Coordinator::new(config)?.run_crawl(request, cancel).await
}

use crate::api::{ScrapeOptions, ScrapeRequest};
use crate::crawler::guard;
use crate::output::format_scrape_result;
use crate::pipelines::Pipelines;
use crate::{ConfigError, Result};
use tokio_util::sync::CancellationToken;

impl Pipelines {
    /// Scrape request for `url` built from the configured defaults
    pub fn scrape_request(&self, url: impl Into<String>) -> ScrapeRequest {
        ScrapeRequest::new(url, ScrapeOptions::from(&self.config.scrape))
    }

    /// Scrapes one page and returns its content in the primary format
    pub async fn scrape(&self, request: &ScrapeRequest, cancel: &CancellationToken) -> Result<String> {
        if request.url.trim().is_empty() {
            return Err(ConfigError::InvalidUrl("scrape URL cannot be empty".to_string()).into());
        }

        tracing::info!("Scraping {}", request.url);
        let document = guard(cancel, self.client().scrape(request)).await?;
        if document.is_none() {
            tracing::warn!("Scrape of {} returned no data", request.url);
        }

        Ok(format_scrape_result(
            document.as_ref(),
            request.options.primary_format(),
        ))
    }
}

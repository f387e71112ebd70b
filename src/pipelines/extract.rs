use crate::api::{ExtractRequest, ScrapeOptions};
use crate::crawler::guard;
use crate::message::DEFAULT_EXTRACT_PROMPT;
use crate::output::{format_extract_failure, format_extract_result};
use crate::pipelines::Pipelines;
use crate::state::JobStatus;
use crate::{ConfigError, PipeError, Result};
use tokio_util::sync::CancellationToken;

impl Pipelines {
    /// Extract request built from the configured defaults
    ///
    /// A blank prompt falls back to [`DEFAULT_EXTRACT_PROMPT`].
    pub fn extract_request(
        &self,
        urls: Vec<String>,
        prompt: &str,
        schema: Option<serde_json::Value>,
    ) -> ExtractRequest {
        let defaults = &self.config.extract;
        let prompt = match prompt.trim() {
            "" => DEFAULT_EXTRACT_PROMPT.to_string(),
            p => p.to_string(),
        };

        ExtractRequest {
            urls,
            prompt,
            schema,
            enable_web_search: defaults.enable_web_search,
            ignore_sitemap: defaults.ignore_sitemap,
            include_subdomains: defaults.include_subdomains,
            show_sources: defaults.show_sources,
            scrape_options: ScrapeOptions::from(&self.config.scrape),
        }
    }

    /// Submits an extract job, waits for it and formats the extracted data
    ///
    /// # Errors
    ///
    /// * `PipeError::Config` - no URLs were given
    /// * `PipeError::ExtractFailed` - the service reported the job as failed
    /// * `PipeError::Cancelled` / `PipeError::Timeout` - the wait was cut short
    pub async fn extract(&self, request: &ExtractRequest, cancel: &CancellationToken) -> Result<String> {
        if request.urls.iter().all(|url| url.trim().is_empty()) {
            return Err(
                ConfigError::InvalidUrl("extract needs at least one URL".to_string()).into(),
            );
        }

        let job_id = guard(cancel, self.client().submit_extract(request)).await?;
        tracing::info!(
            "Extract job {} started for {} URL(s)",
            job_id,
            request.urls.len()
        );

        let mut job = self
            .poller()
            .wait(&job_id, cancel, || self.client().extract_status(&job_id))
            .await?;

        match job.status {
            JobStatus::Failed => {
                let message = job
                    .error
                    .take()
                    .unwrap_or_else(|| format!("extract job {} failed", job_id));
                tracing::error!("Extract job {} failed: {}", job_id, message);
                Err(PipeError::ExtractFailed(message))
            }
            JobStatus::Cancelled => Err(PipeError::ExtractFailed(format!(
                "extract job {} was cancelled",
                job_id
            ))),
            _ => {
                tracing::info!("Extract job {} completed", job_id);
                Ok(format_extract_result(&job))
            }
        }
    }

    /// Fetches an extract job once and formats whatever it has so far
    pub async fn extract_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<String> {
        let job_id = job_id.trim();
        if job_id.is_empty() {
            return Err(ConfigError::Validation("extract job id cannot be empty".to_string()).into());
        }

        let job = guard(cancel, self.client().extract_status(job_id)).await?;
        Ok(match job.status {
            JobStatus::Failed | JobStatus::Cancelled => format_extract_failure(&job),
            _ => format_extract_result(&job),
        })
    }
}

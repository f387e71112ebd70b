//! Bounded, cancellable poll loop for remote jobs
//!
//! Polls a job immediately, then once per interval, until it reports a
//! terminal status. The wait is bounded by a maximum duration and observes
//! cancellation before every request, during every request, and during every
//! sleep.

use crate::api::{CrawlSnapshot, ExtractJob};
use crate::config::ApiConfig;
use crate::state::JobStatus;
use crate::{PipeError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Anything a poll can return that carries a job status
pub trait PollStatus {
    fn job_status(&self) -> JobStatus;
}

impl PollStatus for CrawlSnapshot {
    fn job_status(&self) -> JobStatus {
        self.job.status
    }
}

impl PollStatus for ExtractJob {
    fn job_status(&self) -> JobStatus {
        self.status
    }
}

/// Runs `fut` unless `cancel` fires first
///
/// An already-cancelled token returns `PipeError::Cancelled` without polling
/// `fut`, so no request is sent.
pub async fn guard<T, Fut>(cancel: &CancellationToken, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipeError::Cancelled),
        result = fut => result,
    }
}

/// Fixed-interval poll loop with an upper bound on total wait
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    max_wait: Duration,
}

impl Poller {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.poll_interval(), config.max_wait())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Polls until `poll` returns a terminal status
    ///
    /// # Errors
    ///
    /// * Any error returned by `poll` aborts the loop unchanged
    /// * `PipeError::Cancelled` - `cancel` fired
    /// * `PipeError::Timeout` - `max_wait` elapsed without a terminal status
    pub async fn wait<T, F, Fut>(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
        mut poll: F,
    ) -> Result<T>
    where
        T: PollStatus,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // None when max_wait is too large to represent: wait without bound
        let deadline = Instant::now().checked_add(self.max_wait);
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::info!("Job {} cancelled before poll #{}", job_id, attempt + 1);
                return Err(PipeError::Cancelled);
            }

            attempt += 1;
            let snapshot = guard(cancel, poll()).await?;
            let status = snapshot.job_status();
            tracing::debug!("Job {} poll #{}: {}", job_id, attempt, status);

            if status.is_terminal() {
                return Ok(snapshot);
            }

            if status == JobStatus::Unknown {
                tracing::warn!("Job {} reported an unrecognized status, still waiting", job_id);
            }

            let wake = match (Instant::now().checked_add(self.interval), deadline) {
                (Some(next), Some(deadline)) => Some(next.min(deadline)),
                (next, deadline) => next.or(deadline),
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Job {} cancelled after {} poll(s)", job_id, attempt);
                    return Err(PipeError::Cancelled);
                }
                _ = sleep_until_or_forever(wake) => {}
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::warn!("Job {} still running after {:?}", job_id, self.max_wait);
                return Err(PipeError::Timeout {
                    job_id: job_id.to_string(),
                    waited_secs: self.max_wait.as_secs(),
                });
            }
        }
    }
}

async fn sleep_until_or_forever(wake: Option<Instant>) {
    match wake {
        Some(wake) => sleep_until(wake).await,
        None => std::future::pending().await,
    }
}

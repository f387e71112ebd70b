/// Status values reported by Firecrawl for asynchronous jobs
///
/// Crawl jobs report `scraping` while running; extract jobs report
/// `processing`. Both finish in `completed`, `failed` or `cancelled`.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current status of a remote crawl or extract job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    // ===== Active States =====
    /// Crawl job is discovering and scraping pages
    Scraping,

    /// Extract job is still running
    Processing,

    // ===== Terminal States =====
    /// Job finished and its results are available
    Completed,

    /// Job failed on the remote side
    Failed,

    /// Job was cancelled on the remote side
    Cancelled,

    /// Any status value this crate does not recognize
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Returns true if no further status transition will occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns true if the job is still running
    ///
    /// Unknown statuses are treated as active so the poll loop keeps waiting
    /// rather than inferring completion.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scraping => "scraping",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

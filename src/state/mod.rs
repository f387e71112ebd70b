//! Job state tracking
//!
//! Firecrawl runs crawl and extract requests as remote jobs. This module
//! models the status values those jobs report.

mod job_status;

pub use job_status::JobStatus;

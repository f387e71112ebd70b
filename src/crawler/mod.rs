//! Crawl orchestration
//!
//! This module contains the crawl pipeline, including:
//! - Job submission and status polling
//! - Bounded, cancellable waiting shared with extract jobs
//! - Following result pagination of completed jobs
//! - One-shot status checks of existing jobs

mod coordinator;
mod poller;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use poller::{guard, PollStatus, Poller};

//! Firecrawl API access
//!
//! This module contains the wire model for the Firecrawl v1 REST API and the
//! HTTP client that talks to it:
//! - Typed requests for crawl, scrape, map and extract
//! - Lenient response parsing for job status payloads and documents
//! - Error classification for submissions, polls and single calls

mod client;
mod types;

pub use client::{build_http_client, describe_api_error, FirecrawlClient, USER_AGENT};
pub use types::{
    CrawlJob, CrawlRequest, CrawlResultPage, CrawlSnapshot, Document, DocumentMetadata,
    ExtractJob, ExtractRequest, Location, MapRequest, OutputFormat, ScrapeOptions, ScrapeRequest,
};

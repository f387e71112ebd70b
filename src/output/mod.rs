//! Output formatting
//!
//! Turns pipeline results into the text handed back to the caller. Crawl
//! results keep pages in fetch order with a fixed separator between them so
//! a reader (or a downstream model) can tell page boundaries apart.

mod markdown;

pub use markdown::{
    format_crawl_result, format_crawl_status, format_extract_failure, format_extract_result,
    format_map_result, format_scrape_result, DOCUMENT_SEPARATOR,
};

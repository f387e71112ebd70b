//! Chat message routing

use crate::message::parse::{
    extract_job_id, extract_prompt, extract_schema, extract_search_term, extract_url,
    extract_urls, is_greeting, strip_urls,
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Reply to greetings and empty messages
pub const WELCOME_MESSAGE: &str = "Welcome to the Firecrawl Website Crawler! \
Send a URL to crawl, scrape, map or extract from, or ask for the status of a job by its id.\n\n\
Examples:\n\
- Crawl https://example.com\n\
- Scrape https://example.com/pricing\n\
- Map https://example.com search for \"blog\"\n\
- Extract the team members from https://example.com/about\n\
- Check status of <crawl-id>\n\
- Check extract status of <extract-id>";

/// Reply when a message has neither a URL nor a job reference
pub const NO_URL_MESSAGE: &str = "No URL found in your message. \
Please provide a valid URL to crawl or a crawl ID to check status.";

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(scrape|scraping|map|mapping|extract|extraction|crawl|crawling)\b").unwrap()
});

/// Command words followed by their whitespace, so `status of extract X` keeps `X` as the id
static COMMAND_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:scrape|scraping|map|mapping|extract|extraction|crawl|crawling)\b\s*")
        .unwrap()
});

/// What a chat message asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Greeting,
    CrawlStatus {
        job_id: String,
    },
    ExtractStatus {
        job_id: String,
    },
    Crawl {
        url: String,
    },
    Scrape {
        url: String,
    },
    Map {
        url: String,
        search: String,
    },
    Extract {
        urls: Vec<String>,
        prompt: String,
        schema: Option<Value>,
    },
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Crawl,
    Scrape,
    Map,
    Extract,
}

/// First command word outside any URL; a bare URL means crawl
fn command_of(message: &str) -> Command {
    let text = strip_urls(message).to_lowercase();
    match COMMAND_RE.captures(&text).map(|caps| caps[1].to_string()) {
        Some(word) if word.starts_with("scrap") => Command::Scrape,
        Some(word) if word.starts_with("map") => Command::Map,
        Some(word) if word.starts_with("extract") => Command::Extract,
        _ => Command::Crawl,
    }
}

/// Classifies a chat message
///
/// Greetings win. A message with no URL that says "status" or "check" and
/// names a job id is a status check, for an extract job when it mentions
/// extraction. Otherwise the first command word picks scrape, map or extract
/// for the URLs in the message, and a URL with no command starts a crawl.
pub fn route_message(message: &str) -> Intent {
    if is_greeting(message) {
        return Intent::Greeting;
    }

    let command = command_of(message);
    let url = extract_url(message);
    let lower = message.to_lowercase();
    let asks_status = lower.contains("status") || lower.contains("check");

    if url.is_none() && asks_status {
        let without_command = COMMAND_WORD_RE.replace_all(message, "");
        if let Some(job_id) = extract_job_id(&without_command) {
            return match command {
                Command::Extract => Intent::ExtractStatus { job_id },
                _ => Intent::CrawlStatus { job_id },
            };
        }
    }

    match (command, url) {
        (Command::Extract, _) => {
            let urls = extract_urls(message);
            if urls.is_empty() {
                return Intent::Unrecognized;
            }
            Intent::Extract {
                urls,
                prompt: extract_prompt(message),
                schema: extract_schema(message),
            }
        }
        (Command::Scrape, Some(url)) => Intent::Scrape { url },
        (Command::Map, Some(url)) => Intent::Map {
            url,
            search: extract_search_term(message),
        },
        (Command::Crawl, Some(url)) => Intent::Crawl { url },
        (_, None) => Intent::Unrecognized,
    }
}

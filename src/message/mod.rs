//! Chat message handling
//!
//! Parses free-text user messages into pipeline inputs and decides which
//! pipeline a message is meant for.

mod parse;
mod router;

pub use parse::{
    extract_job_id, extract_prompt, extract_schema, extract_search_term, extract_url,
    extract_urls, is_greeting, normalize_url, parse_path_list, DEFAULT_EXTRACT_PROMPT,
};
pub use router::{route_message, Intent, NO_URL_MESSAGE, WELCOME_MESSAGE};

//! Free-text parsing helpers
//!
//! Chat hosts hand pipelines a raw user message. These helpers pull URLs,
//! job ids, search terms, prompts and JSON schemas out of it.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Prompt used for extraction when the message does not contain one
pub const DEFAULT_EXTRACT_PROMPT: &str =
    "Extract the main content and key information from this webpage.";

static HTTP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>\[\]"'`]+"#).unwrap());

static LOOSE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s]+|www\.[^\s]+|(?:[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})[^\s]*").unwrap()
});

static NORMALIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:((?i:https?))://)?(?i:www\.)?([a-zA-Z0-9.-]+)(\.[a-zA-Z]{2,})(/.*)?$").unwrap()
});

static JOB_ID_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)status of ([\w-]+)",
        r"(?i)check ([\w-]+)",
        r"(?i)crawl ([\w-]+)",
        r"(?i)extract ([\w-]+)",
        r"(?i)id ([\w-]+)",
        r"(?i)job ([\w-]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static SEARCH_TERM_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)search for "(.*?)""#,
        r#"(?i)search "(.*?)""#,
        r#"(?i)find "(.*?)""#,
        r#"(?i)containing "(.*?)""#,
        r#"(?i)with "(.*?)""#,
        r#"(?i)include "(.*?)""#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static PROMPT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)prompt[:\s]+"(.*?)""#,
        r#"(?i)extract[:\s]+"(.*?)""#,
        r#"(?i)with prompt[:\s]+"(.*?)""#,
        r#"(?i)using prompt[:\s]+"(.*?)""#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:python|json)?\s*\n?(.*?)\n?```").unwrap());

static GREETING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:hi|hello|hey|start|begin|help)(?:$|\s)").unwrap());

const EXTRACT_VERBS: [&str; 6] = ["extract", "find", "get", "retrieve", "pull", "scrape"];

const PROMPT_PREFIXES: [&str; 10] = [
    "please",
    "can you",
    "could you",
    "i want to",
    "i need to",
    "extract",
    "find",
    "get",
    "retrieve",
    "from the website",
];

/// Trims punctuation that commonly trails a URL in prose
fn trim_url(candidate: &str) -> &str {
    candidate.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '}'])
}

/// Returns the first `http(s)://` URL in a message
pub fn extract_url(message: &str) -> Option<String> {
    HTTP_URL_RE
        .find_iter(message)
        .map(|m| trim_url(m.as_str()))
        .find(|url| url.len() > "https://".len())
        .map(str::to_string)
}

/// The message with every URL-like token removed
pub(crate) fn strip_urls(message: &str) -> String {
    LOOSE_URL_RE.replace_all(message, "").trim().to_string()
}

/// Returns every URL-like token in a message, normalized
///
/// Accepts `www.` prefixes and bare domains as well as full URLs.
pub fn extract_urls(message: &str) -> Vec<String> {
    LOOSE_URL_RE
        .find_iter(message)
        .map(|m| trim_url(m.as_str()))
        .filter(|url| !url.is_empty())
        .map(normalize_url)
        .collect()
}

/// Lowercases scheme and host, defaults the scheme to `http`, drops `www.`
///
/// The path is left untouched. Inputs that don't look like a URL are
/// returned unchanged.
pub fn normalize_url(url: &str) -> String {
    let Some(caps) = NORMALIZE_RE.captures(url) else {
        return url.to_string();
    };

    let scheme = caps
        .get(1)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| "http".to_string());
    let domain = caps[2].to_ascii_lowercase();
    let extension = caps[3].to_ascii_lowercase();
    let path = caps.get(4).map(|m| m.as_str()).unwrap_or("");

    format!("{}://{}{}{}", scheme, domain, extension, path)
}

/// Returns a job id referenced in a message (`status of X`, `job X`, ...)
pub fn extract_job_id(message: &str) -> Option<String> {
    JOB_ID_RES
        .iter()
        .find_map(|re| re.captures(message))
        .map(|caps| caps[1].to_string())
}

/// Returns the quoted search term of a map request, or an empty string
pub fn extract_search_term(message: &str) -> String {
    SEARCH_TERM_RES
        .iter()
        .find_map(|re| re.captures(message))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Derives an extraction prompt from a message
///
/// A quoted prompt wins. Otherwise, if the message asks to extract
/// something, the message itself (minus URLs and a leading command phrase)
/// becomes the prompt. Falls back to [`DEFAULT_EXTRACT_PROMPT`].
pub fn extract_prompt(message: &str) -> String {
    if let Some(prompt) = PROMPT_RES
        .iter()
        .find_map(|re| re.captures(message))
        .map(|caps| caps[1].to_string())
    {
        return prompt;
    }

    let lower = message.to_lowercase();
    if EXTRACT_VERBS.iter().any(|verb| lower.contains(verb)) {
        let mut clean = strip_urls(message);

        for prefix in PROMPT_PREFIXES {
            let matches = clean
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if matches {
                clean = clean[prefix.len()..].trim().to_string();
            }
        }

        if !clean.is_empty() {
            return clean;
        }
    }

    DEFAULT_EXTRACT_PROMPT.to_string()
}

/// Returns the first JSON object in a message, from a fenced block or inline
pub fn extract_schema(message: &str) -> Option<Value> {
    for caps in CODE_BLOCK_RE.captures_iter(message) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(caps[1].trim()) {
            return Some(value);
        }
    }

    message.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&message[start..])
            .into_iter::<Value>()
            .next()
            .and_then(|result| result.ok())
            .filter(Value::is_object)
    })
}

/// Splits a comma-separated list, dropping blank entries
pub fn parse_path_list(paths: &str) -> Vec<String> {
    paths
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true for an empty message or a bare greeting
pub fn is_greeting(message: &str) -> bool {
    let lower = message.trim().to_lowercase();
    lower.is_empty() || GREETING_RE.is_match(&lower)
}

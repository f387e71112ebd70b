//! Markdown rendering of pipeline results
//!
//! Every function here is pure: the same input always renders to the same
//! bytes. Timestamps come from the service payloads, never from the clock.

use crate::api::{CrawlJob, Document, ExtractJob, OutputFormat};
use crate::state::JobStatus;
use chrono::SecondsFormat;
use serde_json::Value;

/// Separator placed between per-page sections of a crawl result
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Formats an aggregated crawl result
///
/// # Arguments
///
/// * `job` - The terminal job status (for the summary line)
/// * `documents` - Documents of every result page, in fetch order
/// * `format` - The content format to show for each page
///
/// # Returns
///
/// A summary line followed by one section per document: a heading, the
/// source URL, and the page content
pub fn format_crawl_result(job: &CrawlJob, documents: &[Document], format: OutputFormat) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "Crawled {} page{} (job {}, {}/{} completed, {} credits used)\n\n",
        documents.len(),
        if documents.len() == 1 { "" } else { "s" },
        job.id,
        job.completed,
        job.total,
        job.credits_used
    ));

    if documents.is_empty() {
        md.push_str("No pages were returned by the crawl.\n");
        return md;
    }

    let sections: Vec<String> = documents
        .iter()
        .enumerate()
        .map(|(index, doc)| format_document(index + 1, doc, format))
        .collect();

    md.push_str(&sections.join(DOCUMENT_SEPARATOR));
    md.push('\n');
    md
}

/// Formats one crawled page as a markdown section
fn format_document(position: usize, doc: &Document, format: OutputFormat) -> String {
    let url = doc.source_url().unwrap_or("Unknown URL");
    let heading = doc.title().unwrap_or(url);

    let body = if format == OutputFormat::Links {
        format_link_list(doc.links())
    } else {
        doc.content(format)
            .map(|content| content.trim().to_string())
            .unwrap_or_else(|| "_No content extracted._".to_string())
    };

    format!("## {}. {}\n\nSource: {}\n\n{}", position, heading, url, body)
}

fn format_link_list(links: &[String]) -> String {
    if links.is_empty() {
        return "_No links found._".to_string();
    }

    links
        .iter()
        .map(|link| format!("- {}", link))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a one-off crawl status check
pub fn format_crawl_status(job: &CrawlJob, documents: &[Document]) -> String {
    let mut md = String::new();

    md.push_str(&format!("Crawl job status: {}\n\n", job.status));
    md.push_str(&format!("Total URLs: {}\n", job.total));
    md.push_str(&format!("Completed: {}\n", job.completed));
    md.push_str(&format!("Credits used: {}\n", job.credits_used));

    if let Some(expires_at) = &job.expires_at {
        md.push_str(&format!(
            "Expires at: {}\n",
            expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }

    if let Some(error) = &job.error {
        md.push_str(&format!("Error: {}\n", error));
    }

    if !documents.is_empty() {
        md.push_str("\nList of all crawled pages:\n");
        for (i, doc) in documents.iter().enumerate() {
            md.push_str(&format!(
                "{}. {} - {}\n",
                i + 1,
                doc.title().unwrap_or("No title"),
                doc.source_url().unwrap_or("Unknown URL")
            ));
        }
    }

    if job.next.is_some() {
        md.push_str("\nMore pages are available once the crawl is fetched in full.\n");
    }

    md
}

/// Formats a single-page scrape result
pub fn format_scrape_result(document: Option<&Document>, format: OutputFormat) -> String {
    let Some(doc) = document else {
        return "No content was extracted from the URL.".to_string();
    };

    let content = if format == OutputFormat::Links {
        (!doc.links().is_empty()).then(|| format_link_list(doc.links()))
    } else {
        doc.content(format).map(|c| c.trim().to_string())
    };

    let Some(content) = content else {
        return "No content was extracted in the requested format.".to_string();
    };

    let mut md = format!("### Extracted Content\n\n{}\n\n", content);

    if let Some(metadata) = &doc.metadata {
        let mut lines = Vec::new();
        if let Some(title) = metadata.title.as_deref().filter(|t| !t.is_empty()) {
            lines.push(format!("**Title:** {}", title));
        }
        if let Some(description) = metadata.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("**Description:** {}", description));
        }
        if let Some(language) = metadata.language.as_deref().filter(|l| !l.is_empty()) {
            lines.push(format!("**Language:** {}", language));
        }
        if !lines.is_empty() {
            md.push_str("### Metadata\n\n");
            for line in lines {
                md.push_str(&line);
                md.push_str("\n\n");
            }
        }
    }

    if format != OutputFormat::Links && !doc.links().is_empty() {
        md.push_str("### Links Found\n\n");
        for (i, link) in doc.links().iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, link));
        }
    }

    if let Some(warning) = &doc.warning {
        md.push_str(&format!("\n**Warning:** {}\n", warning));
    }

    md
}

/// Formats the links discovered by a map request
pub fn format_map_result(url: &str, search: &str, links: &[String]) -> String {
    let mut md = if search.is_empty() {
        format!("Found {} URLs on {}.", links.len(), url)
    } else {
        format!(
            "Found {} URLs on {} containing '{}'.",
            links.len(),
            url,
            search
        )
    };

    md.push_str("\n\nList of mapped URLs:");
    if links.is_empty() {
        md.push_str("\nNothing was found []");
    } else {
        for link in links {
            md.push_str(&format!("\n- {}", link));
        }
    }

    md
}

/// Formats the data of an extract job
pub fn format_extract_result(job: &ExtractJob) -> String {
    if is_empty_value(&job.data) {
        return if job.status.is_active() {
            "The extraction is still processing. Please try checking the status again in a few moments."
                .to_string()
        } else {
            "No data was extracted.".to_string()
        };
    }

    let mut md = String::from("### Extracted Data\n\n");

    match &job.data {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(_) | Value::Array(_) => {
                        md.push_str(&format!("**{}**:\n{}\n\n", key, json_block(value)));
                    }
                    other => {
                        md.push_str(&format!("**{}**: {}\n\n", key, scalar_text(other)));
                    }
                }
            }
        }
        Value::Array(_) => {
            md.push_str(&json_block(&job.data));
            md.push_str("\n\n");
        }
        other => {
            md.push_str(&scalar_text(other));
            md.push_str("\n\n");
        }
    }

    md.push_str(&format!("**Status**: {}\n\n", job.status));

    if let Some(expires_at) = &job.expires_at {
        md.push_str(&format!(
            "**Expires at**: {}\n\n",
            expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }

    if let Some(warning) = &job.warning {
        md.push_str(&format!("\n**Warning**: {}\n", warning));
    }

    md
}

/// One-line report for an extract job that ended without data
pub fn format_extract_failure(job: &ExtractJob) -> String {
    let reason = job.error.as_deref().unwrap_or("no details reported");
    match job.status {
        JobStatus::Cancelled => format!("Extraction job {} was cancelled: {}", job.id, reason),
        _ => format!("Extraction job {} failed: {}", job.id, reason),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn json_block(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("```json\n{}\n```", pretty)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

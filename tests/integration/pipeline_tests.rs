//! Integration tests for the scrape, map, extract and chat pipelines

use crate::{config, count_requests};
use firecrawl_pipes::api::OutputFormat;
use firecrawl_pipes::message::WELCOME_MESSAGE;
use firecrawl_pipes::{CancellationToken, Pipelines, PipeError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_scrape_renders_content_and_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({
            "url": "https://example.com",
            "formats": ["markdown"],
            "onlyMainContent": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "# Welcome\n\nBody text",
                "links": ["https://example.com/about"],
                "metadata": {
                    "title": "Example Domain",
                    "description": "An example",
                    "sourceURL": "https://example.com"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).expect("Failed to create pipelines");
    let request = pipelines.scrape_request("https://example.com");
    let output = pipelines
        .scrape(&request, &CancellationToken::new())
        .await
        .expect("Scrape failed");

    assert!(output.starts_with("### Extracted Content\n\n# Welcome"));
    assert!(output.contains("**Title:** Example Domain"));
    assert!(output.contains("**Description:** An example"));
    assert!(output.contains("1. https://example.com/about"));
}

#[tokio::test]
async fn test_scrape_in_links_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "links": ["https://example.com/a", "https://example.com/b"] }
        })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let mut request = pipelines.scrape_request("https://example.com");
    request.options.formats = vec![OutputFormat::Links];

    let output = pipelines
        .scrape(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(output.contains("- https://example.com/a\n- https://example.com/b"));
}

#[tokio::test]
async fn test_scrape_without_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let request = pipelines.scrape_request("https://example.com");
    let output = pipelines
        .scrape(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output, "No content was extracted from the URL.");
}

#[tokio::test]
async fn test_map_lists_links() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(body_partial_json(json!({ "url": "https://example.com", "search": "blog" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": ["https://example.com/blog", "https://example.com/blog/post-1"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let request = pipelines.map_request("https://example.com", "blog");
    let output = pipelines
        .map(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(output.starts_with("Found 2 URLs on https://example.com containing 'blog'."));
    assert!(output.contains("- https://example.com/blog/post-1"));
}

#[tokio::test]
async fn test_map_http_error_is_request_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "success": false,
            "error": "Insufficient credits"
        })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let request = pipelines.map_request("https://example.com", "");
    let result = pipelines.map(&request, &CancellationToken::new()).await;

    match result {
        Err(PipeError::Request { endpoint, message }) => {
            assert_eq!(endpoint, "map");
            assert!(message.contains("402"), "message: {}", message);
            assert!(message.contains("Insufficient credits"), "message: {}", message);
        }
        other => panic!("expected request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_extract_waits_for_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .and(body_partial_json(json!({
            "urls": ["https://example.com"],
            "prompt": "Find the company name"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "ext-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "processing"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "completed",
            "data": { "name": "Acme", "offices": ["Berlin", "Lisbon"] },
            "expiresAt": "2030-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let request = pipelines.extract_request(
        vec!["https://example.com".to_string()],
        "Find the company name",
        None,
    );
    let output = pipelines
        .extract(&request, &CancellationToken::new())
        .await
        .expect("Extract failed");

    assert!(output.starts_with("### Extracted Data"));
    assert!(output.contains("**name**: Acme"));
    assert!(output.contains("**offices**:\n```json"));
    assert!(output.contains("**Expires at**: 2030-01-01T00:00:00Z"));
    assert_eq!(count_requests(&server, "GET", "/v1/extract/ext-1").await, 2);
}

#[tokio::test]
async fn test_extract_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "ext-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "status": "failed",
            "error": "No pages could be scraped"
        })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let request = pipelines.extract_request(vec!["https://example.com".to_string()], "", None);
    let result = pipelines.extract(&request, &CancellationToken::new()).await;

    match result {
        Err(PipeError::ExtractFailed(message)) => {
            assert_eq!(message, "No pages could be scraped");
        }
        other => panic!("expected extract failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_extract_status_while_processing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "processing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let output = pipelines
        .extract_status("ext-3", &CancellationToken::new())
        .await
        .unwrap();

    assert!(output.starts_with("The extraction is still processing."));
}

#[tokio::test]
async fn test_respond_routes_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({ "url": "https://example.com/docs" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "chat-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/chat-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 1,
            "completed": 1,
            "data": [{
                "markdown": "Docs home",
                "metadata": { "sourceURL": "https://example.com/docs" }
            }]
        })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let cancel = CancellationToken::new();

    let greeting = pipelines.respond("hi", &cancel).await.unwrap();
    assert_eq!(greeting, WELCOME_MESSAGE);

    let crawl = pipelines
        .respond("Please crawl https://example.com/docs", &cancel)
        .await
        .unwrap();
    assert!(crawl.contains("Docs home"));

    let status = pipelines
        .respond("check status of chat-1", &cancel)
        .await
        .unwrap();
    assert!(status.starts_with("Crawl job status: completed"));
}

#[tokio::test]
async fn test_respond_routes_scrape_map_and_extract() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://example.com/pricing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "Plans and prices" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(body_partial_json(json!({ "url": "https://example.com", "search": "blog" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": ["https://example.com/blog"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .and(body_partial_json(json!({
            "urls": ["https://example.com/about"],
            "prompt": "list prices"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "ext-9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "completed",
            "data": { "plan": "Pro" }
        })))
        .mount(&server)
        .await;

    let pipelines = Pipelines::new(config(&server)).unwrap();
    let cancel = CancellationToken::new();

    let scraped = pipelines
        .respond("scrape https://example.com/pricing", &cancel)
        .await
        .unwrap();
    assert!(scraped.contains("Plans and prices"));

    let mapped = pipelines
        .respond(r#"map https://example.com search for "blog""#, &cancel)
        .await
        .unwrap();
    assert!(mapped.starts_with("Found 1 URLs on https://example.com containing 'blog'."));

    let extracted = pipelines
        .respond(r#"extract from https://example.com/about prompt: "list prices""#, &cancel)
        .await
        .unwrap();
    assert!(extracted.contains("**plan**: Pro"));

    let status = pipelines
        .respond("check extract status of ext-9", &cancel)
        .await
        .unwrap();
    assert!(status.contains("**plan**: Pro"));

    assert_eq!(count_requests(&server, "POST", "/v1/crawl").await, 0);
    assert_eq!(count_requests(&server, "GET", "/v1/extract/ext-9").await, 2);
}

//! Integration tests for the crawl pipeline
//!
//! These tests mock the Firecrawl crawl endpoints and drive the coordinator
//! through submission, polling, pagination and the failure paths.

use crate::{api_config, count_requests};
use firecrawl_pipes::crawler::Coordinator;
use firecrawl_pipes::{CancellationToken, CrawlRequest, PipeError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_submission(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": job_id,
            "url": format!("{}/v1/crawl/{}", server.uri(), job_id)
        })))
        .mount(server)
        .await;
}

fn page(url: &str, content: &str) -> serde_json::Value {
    json!({
        "markdown": content,
        "metadata": { "sourceURL": url, "statusCode": 200 }
    })
}

#[tokio::test]
async fn test_crawl_single_page() {
    // Start a mock server
    let server = MockServer::start().await;

    // Submission must carry the bearer token and the request options
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(header("authorization", "Bearer fc-test-key"))
        .and(body_partial_json(json!({ "url": "https://example.com", "limit": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "job-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 1,
            "completed": 1,
            "creditsUsed": 1,
            "expiresAt": "2030-01-01T00:00:00.000Z",
            "data": [page("https://example.com", "Hello")]
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).expect("Failed to create coordinator");
    let request = CrawlRequest {
        limit: 5,
        ..CrawlRequest::new("https://example.com")
    };

    let output = coordinator
        .run_crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(output.contains("https://example.com"), "output: {}", output);
    assert!(output.contains("Hello"), "output: {}", output);
    assert!(output.starts_with("Crawled 1 page (job job-1"));
}

#[tokio::test]
async fn test_crawl_polls_until_completed() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-2").await;

    // Two in-progress answers, then completion
    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "scraping",
            "total": 3,
            "completed": 1
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 3,
            "completed": 3,
            "data": [page("https://example.com", "Done")]
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let output = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(output.contains("Done"));
    assert_eq!(count_requests(&server, "GET", "/v1/crawl/job-2").await, 3);
}

#[tokio::test]
async fn test_submission_error_stops_before_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "success": false, "error": "boom" })),
        )
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    match result {
        Err(PipeError::Submission(message)) => {
            assert!(message.contains("500"), "message: {}", message);
            assert!(message.contains("boom"), "message: {}", message);
        }
        other => panic!("expected submission error, got {:?}", other),
    }

    let gets = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "GET")
        .count();
    assert_eq!(gets, 0);
}

#[tokio::test]
async fn test_submission_without_id_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(PipeError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_failed_job_reports_service_message() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-f").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-f"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": "Target site refused the connection"
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    match result {
        Err(PipeError::CrawlFailed(message)) => {
            assert_eq!(message, "Target site refused the connection");
        }
        other => panic!("expected crawl failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_http_error_is_poll_error() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-e").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-e"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    match result {
        Err(PipeError::Poll { job_id, message }) => {
            assert_eq!(job_id, "job-e");
            assert!(message.contains("502"), "message: {}", message);
        }
        other => panic!("expected poll error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_between_polls() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-c").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "scraping" })))
        .mount(&server)
        .await;

    // Long interval: the cancel must land while the poller sleeps
    let config = api_config(&server).with_poll_interval(5.0).with_max_wait(60);
    let coordinator = Coordinator::new(&config).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &cancel)
        .await;

    assert!(matches!(result, Err(PipeError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(count_requests(&server, "GET", "/v1/crawl/job-c").await, 1);
}

#[tokio::test]
async fn test_wait_times_out() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-t").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "scraping" })))
        .mount(&server)
        .await;

    let config = api_config(&server).with_poll_interval(0.2).with_max_wait(1);
    let coordinator = Coordinator::new(&config).unwrap();

    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    match result {
        Err(PipeError::Timeout { job_id, waited_secs }) => {
            assert_eq!(job_id, "job-t");
            assert_eq!(waited_secs, 1);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pagination_follows_absolute_next_urls() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-p").await;

    let status_url = format!("{}/v1/crawl/job-p", server.uri());

    // Continuation pages are mounted before the plain status mock so the
    // query matchers win
    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-p"))
        .and(query_param("skip", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 3,
            "completed": 3,
            "next": format!("{}?skip=2", status_url),
            "data": [page("https://example.com/b", "Page B")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-p"))
        .and(query_param("skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 3,
            "completed": 3,
            "data": [page("https://example.com/c", "Page C")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 3,
            "completed": 3,
            "next": format!("{}?skip=1", status_url),
            "data": [page("https://example.com/a", "Page A")]
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let outcome = coordinator
        .collect_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    let contents: Vec<&str> = outcome
        .documents
        .iter()
        .filter_map(|d| d.markdown.as_deref())
        .collect();
    assert_eq!(contents, vec!["Page A", "Page B", "Page C"]);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(count_requests(&server, "GET", "/v1/crawl/job-p").await, 3);
}

#[tokio::test]
async fn test_pagination_with_relative_token() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-r").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-r"))
        .and(query_param("next", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": [page("https://example.com/2", "Second")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-r"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "next": "tok-2",
            "data": [page("https://example.com/1", "First")]
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let output = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    let first = output.find("First").expect("first page missing");
    let second = output.find("Second").expect("second page missing");
    assert!(first < second);
}

#[tokio::test]
async fn test_repeated_continuation_token_is_invalid() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-loop").await;

    let loop_url = format!("{}/v1/crawl/job-loop?skip=1", server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-loop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "next": loop_url,
            "data": [page("https://example.com", "Again")]
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(PipeError::InvalidResponse(_))));
    // Initial status plus exactly one follow-up before the repeat is noticed
    assert_eq!(count_requests(&server, "GET", "/v1/crawl/job-loop").await, 2);
}

#[tokio::test]
async fn test_check_status_does_not_wait() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "scraping",
            "total": 10,
            "completed": 4,
            "creditsUsed": 4,
            "data": [{
                "markdown": "partial",
                "metadata": { "title": "Docs", "sourceURL": "https://example.com/docs" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let output = coordinator
        .check_status("job-s", &CancellationToken::new())
        .await
        .expect("Status check failed");

    assert!(output.starts_with("Crawl job status: scraping"));
    assert!(output.contains("Total URLs: 10"));
    assert!(output.contains("Completed: 4"));
    assert!(output.contains("1. Docs - https://example.com/docs"));
}

#[tokio::test]
async fn test_foreign_continuation_url_is_not_followed() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mock_submission(&server, "job-x").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "next": format!("{}/v1/crawl/job-x?skip=1", foreign.uri()),
            "data": [page("https://example.com", "First")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "completed" })))
        .mount(&foreign)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let result = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(PipeError::InvalidResponse(_))));

    // The API key must never reach another host
    let leaked = foreign.received_requests().await.unwrap_or_default();
    assert!(leaked.is_empty(), "foreign host received {} request(s)", leaked.len());
}

#[tokio::test]
async fn test_unlimited_max_wait_does_not_overflow() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-u").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-u"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "scraping" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-u"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": [page("https://example.com", "Eventually")]
        })))
        .mount(&server)
        .await;

    let config = api_config(&server).with_max_wait(u64::MAX);
    firecrawl_pipes::config::validate_api_config(&config).expect("config should be valid");

    let coordinator = Coordinator::new(&config).unwrap();
    let output = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(output.contains("Eventually"));
}

#[tokio::test]
async fn test_unrecognized_status_keeps_polling() {
    let server = MockServer::start().await;
    mock_submission(&server, "job-q").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Completed page without any source URL
    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "total": 1,
            "completed": 1,
            "data": [{ "markdown": "Orphan page" }]
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&api_config(&server)).unwrap();
    let output = coordinator
        .run_crawl(&CrawlRequest::new("https://example.com"), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(
        output.contains("## 1. Unknown URL\n\nSource: Unknown URL\n\nOrphan page"),
        "output: {}",
        output
    );
    assert_eq!(count_requests(&server, "GET", "/v1/crawl/job-q").await, 2);
}

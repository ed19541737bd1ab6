//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over the HTTP fetch session.

use sitesweep::config::{CrawlParams, FetchConfig};
use sitesweep::crawler::{crawl, Crawl, FinishReason, Notification, PageResult};
use sitesweep::output::{writer_for, OutputFormat};
use std::io::Read;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates crawl parameters suited to a local mock server
fn create_test_params(seed: &str) -> CrawlParams {
    let mut params = CrawlParams::new(seed);
    params.interval = 0;
    params.connections = 2;
    params.retry_count = 2;
    params.base_timeout = 300;
    params.backoff_unit = 10;
    params
}

async fn mount_html(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Drains both streams of a crawl
async fn collect(mut crawl: Crawl) -> (Vec<PageResult>, Vec<Notification>) {
    let drain = async {
        let mut results = Vec::new();
        while let Some(result) = crawl.results.recv().await {
            results.push(result);
        }
        let mut notifications = Vec::new();
        while let Some(note) = crawl.notifications.recv().await {
            notifications.push(note);
        }
        (results, notifications)
    };

    tokio::time::timeout(Duration::from_secs(20), drain)
        .await
        .expect("crawl did not finish in time")
}

/// Mounts a small site: home, two pages, a 404 and a page that never answers
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    mount_html(
        server,
        "/",
        200,
        format!(
            r#"<html><head><title>Home</title>
            <meta name="description" content=" Welcome home "></head><body>
            <a href="{base}/page1">Page 1</a>
            <a href="{base}/page1?ref=home">Page 1 again</a>
            <a href="/page2">Page 2</a>
            <a href="https://elsewhere.example/">Elsewhere</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="/slow">Slow</a>
            </body></html>"#
        ),
    )
    .await;

    mount_html(
        server,
        "/page1",
        200,
        format!(
            r#"<html><head><title>Page 1</title></head><body>
            <a href="{base}/">Home</a>
            <a href="page2#top">Page 2 top</a>
            <a href="/missing">Missing</a>
            </body></html>"#
        ),
    )
    .await;

    mount_html(
        server,
        "/page2",
        200,
        r#"<html><head><title>Page 2</title>
        <meta name="description" content="Second page"></head><body></body></html>"#
            .to_string(),
    )
    .await;

    mount_html(
        server,
        "/missing",
        404,
        "<html><head><title>Not Found</title></head></html>".to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base = mock_server.uri();
    let seed = format!("{}/", base);

    let crawl = crawl(create_test_params(&seed), &FetchConfig::default())
        .await
        .expect("crawl should start");
    let handle = crawl.handle.clone();
    let (mut results, notifications) = collect(crawl).await;

    results.sort_by(|a, b| a.url.cmp(&b.url));
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            seed.clone(),
            format!("{}/missing", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
            format!("{}/slow", base),
        ]
    );

    let home = &results[0];
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.description.as_deref(), Some("Welcome home"));

    // Error statuses still render a page
    assert_eq!(results[1].title.as_deref(), Some("Not Found"));

    assert_eq!(results[3].description.as_deref(), Some("Second page"));

    // Exhausted retries leave only the URL
    assert_eq!(results[4], PageResult::failed(format!("{}/slow", base)));

    assert_eq!(
        notifications.last(),
        Some(&Notification::Finished {
            finished: FinishReason::Completed
        })
    );
    assert_eq!(
        notifications.iter().filter(|n| n.is_terminal()).count(),
        1
    );

    let progress = handle.progress();
    assert_eq!(progress.processed, 5);
    assert_eq!(progress.sum, 5);
    assert_eq!(progress.queued, 0);
    assert_eq!(handle.finished().await, FinishReason::Completed);
}

#[tokio::test]
async fn test_keep_query_crawls_variants() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        200,
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{base}/list?page=1">First</a>
            <a href="{base}/list?page=2">Second</a>
            <a href="{base}/list?page=2">Second again</a>
            </body></html>"#
        ),
    )
    .await;
    mount_html(
        &mock_server,
        "/list",
        200,
        "<html><head><title>List</title></head></html>".to_string(),
    )
    .await;

    let mut params = create_test_params(&format!("{}/", base));
    params.ignore_query_params = false;

    let crawl = crawl(params, &FetchConfig::default())
        .await
        .expect("crawl should start");
    let handle = crawl.handle.clone();
    let (results, _) = collect(crawl).await;

    assert_eq!(results.len(), 3);
    assert_eq!(handle.progress().sum, 3);
}

#[tokio::test]
async fn test_stop_running_crawl() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let mut params = create_test_params(&format!("{}/", mock_server.uri()));
    params.connections = 1;
    params.interval = 60_000;

    let mut crawl = crawl(params, &FetchConfig::default())
        .await
        .expect("crawl should start");

    // Wait for the seed page so the worker is parked in its interval sleep
    let first = tokio::time::timeout(Duration::from_secs(10), crawl.results.recv())
        .await
        .expect("seed page should load");
    assert!(first.is_some());

    assert!(crawl.handle.stop(FinishReason::Killed));
    assert!(!crawl.handle.stop(FinishReason::Error));

    let handle = crawl.handle.clone();
    let (results, notifications) = collect(crawl).await;
    assert!(results.is_empty());
    assert_eq!(
        notifications.last(),
        Some(&Notification::Finished {
            finished: FinishReason::Killed
        })
    );
    assert_eq!(handle.finished().await, FinishReason::Killed);
    assert!(handle.progress().processed < handle.progress().sum);
}

#[tokio::test]
async fn test_results_written_as_json_lines() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        200,
        r#"<html><head><title>Only page</title></head></html>"#.to_string(),
    )
    .await;

    let crawl = crawl(
        create_test_params(&format!("{}/", mock_server.uri())),
        &FetchConfig::default(),
    )
    .await
    .expect("crawl should start");
    let (results, _) = collect(crawl).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    {
        let mut writer = writer_for(OutputFormat::JsonLines, file.as_file_mut());
        for result in &results {
            writer.write_result(result).unwrap();
        }
        writer.finish().unwrap();
    }

    let mut written = String::new();
    file.reopen().unwrap().read_to_string(&mut written).unwrap();
    assert_eq!(
        written,
        format!(
            "{{\"url\":\"{}/\",\"title\":\"Only page\"}}\n",
            mock_server.uri()
        )
    );
}

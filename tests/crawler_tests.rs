//! Integration tests for comment-tree traversal
//!
//! These drive `CommentCrawler` against a wiremock server and check the
//! walk itself: budget clamping, end-of-stream termination, nested reply
//! draining, the reply-mode delivery contract, and cancellation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bilicrawl::crawler::MemorySink;
use bilicrawl::{
    BiliClient, BiliError, BrowserSession, CommentCrawler, CommentNode, CrawlOptions, PageSink,
    RawCookie,
};

const IMG_URL: &str = "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png";
const SUB_URL: &str = "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png";

const COMMENT_PATH: &str = "/x/v2/reply/wbi/main";
const REPLY_PATH: &str = "/x/v2/reply/reply";

/// A canned browsing session whose local storage carries the signing keys
struct StubSession;

#[async_trait]
impl BrowserSession for StubSession {
    async fn cookies(&self) -> bilicrawl::Result<Vec<RawCookie>> {
        Ok(vec![])
    }

    async fn local_storage(&self) -> bilicrawl::Result<HashMap<String, String>> {
        Ok(HashMap::from([(
            "wbi_img_urls".to_string(),
            format!("{}-{}", IMG_URL, SUB_URL),
        )]))
    }
}

fn create_test_client(host: &str) -> BiliClient {
    let mut client = BiliClient::new(host, Duration::from_secs(5), "TestAgent/1.0")
        .expect("Failed to create client");
    client.attach_browser(Arc::new(StubSession));
    client
}

/// Options tuned for tests: no pause between pages
fn create_test_options(max_items: usize, fetch_replies: bool) -> CrawlOptions {
    CrawlOptions {
        max_items,
        interval: Duration::from_millis(0),
        fetch_replies,
        ..Default::default()
    }
}

fn comment_nodes(start_id: i64, count: i64, rcount: i64) -> Vec<Value> {
    (0..count)
        .map(|offset| {
            json!({
                "rpid": start_id + offset,
                "parent": 0,
                "rcount": rcount,
                "content": {"message": format!("comment {}", start_id + offset)}
            })
        })
        .collect()
}

fn comment_page_body(is_end: bool, next: i64, nodes: Vec<Value>) -> Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {
            "cursor": {"is_end": is_end, "next": next},
            "replies": nodes
        }
    })
}

fn reply_page_body(num: i64, size: i64, count: i64, nodes: Vec<Value>) -> Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {
            "page": {"num": num, "size": size, "count": count},
            "replies": nodes
        }
    })
}

/// A sink that refuses every delivery
struct FailingSink;

#[async_trait]
impl PageSink for FailingSink {
    async fn on_page(&self, _owner_id: &str, _items: &[CommentNode]) -> bilicrawl::Result<()> {
        Err(BiliError::Session("sink refused".to_string()))
    }
}

#[tokio::test]
async fn test_budget_truncates_final_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(false, 20, comment_nodes(1, 20, 0))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "20"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(false, 40, comment_nodes(21, 20, 0))),
        )
        .mount(&server)
        .await;

    // The budget fills on page two, so no third fetch happens
    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_page_body(true, 0, vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let crawler = CommentCrawler::new(&client, create_test_options(25, false));
    let sink = MemorySink::new();

    let collected = crawler
        .crawl_video_comments("170001", &sink)
        .await
        .expect("Crawl failed");

    assert_eq!(collected.len(), 25);
    assert_eq!(sink.page_sizes(), vec![20, 5]);
    // The clamp keeps the page head, so ids stay contiguous
    assert_eq!(collected[24].id, 25);
}

#[tokio::test]
async fn test_stops_at_end_of_stream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(true, 0, comment_nodes(1, 3, 0))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let crawler = CommentCrawler::new(&client, create_test_options(100, false));
    let sink = MemorySink::new();

    let collected = crawler
        .crawl_video_comments("170001", &sink)
        .await
        .expect("Crawl failed");

    assert_eq!(collected.len(), 3);
    assert_eq!(sink.page_sizes(), vec![3]);
}

#[tokio::test]
async fn test_nested_replies_drained_by_reported_total() {
    let server = MockServer::start().await;

    // One top-level comment with 25 nested replies
    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(true, 0, comment_nodes(42, 1, 25))),
        )
        .mount(&server)
        .await;

    for (pn, page_len) in [(1, 10), (2, 10), (3, 5)] {
        Mock::given(method("GET"))
            .and(path(REPLY_PATH))
            .and(query_param("root", "42"))
            .and(query_param("pn", &pn.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_page_body(
                pn,
                10,
                25,
                comment_nodes(100 + pn * 100, page_len, 0),
            )))
            .mount(&server)
            .await;
    }

    // Page three covers the reported total of 25
    Mock::given(method("GET"))
        .and(path(REPLY_PATH))
        .and(query_param("pn", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_page_body(4, 10, 25, vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let crawler = CommentCrawler::new(&client, create_test_options(100, true));
    let sink = MemorySink::new();

    let collected = crawler
        .crawl_video_comments("170001", &sink)
        .await
        .expect("Crawl failed");

    // Nested pages land before the top-level page they hang under,
    // every page tagged with the video id
    assert_eq!(sink.page_sizes(), vec![10, 10, 5, 1]);
    assert!(sink.owners().iter().all(|owner| owner == "170001"));
    // Reply mode delivers through the sink only
    assert!(collected.is_empty());
}

#[tokio::test]
async fn test_reply_mode_never_trips_the_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(false, 20, comment_nodes(1, 20, 0))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "20"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(true, 0, comment_nodes(21, 20, 0))),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    // max_items of five, yet both pages are fetched: nothing accumulates
    // in reply mode, so only the end of stream stops the walk
    let crawler = CommentCrawler::new(&client, create_test_options(5, true));
    let sink = MemorySink::new();

    let collected = crawler
        .crawl_video_comments("170001", &sink)
        .await
        .expect("Crawl failed");

    assert!(collected.is_empty());
    assert_eq!(sink.page_sizes(), vec![5, 5]);
}

#[tokio::test]
async fn test_cancel_stops_before_first_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_page_body(true, 0, vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let crawler = CommentCrawler::new(&client, create_test_options(100, false));
    crawler.cancel_token().cancel();
    let sink = MemorySink::new();

    let collected = crawler
        .crawl_video_comments("170001", &sink)
        .await
        .expect("Crawl failed");

    // A fired token is a clean stop, not an error
    assert!(collected.is_empty());
    assert!(sink.page_sizes().is_empty());
}

#[tokio::test]
async fn test_sink_error_aborts_the_walk() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page_body(false, 20, comment_nodes(1, 20, 0))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .and(query_param("next", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_page_body(true, 0, vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let crawler = CommentCrawler::new(&client, create_test_options(100, false));

    let result = crawler.crawl_video_comments("170001", &FailingSink).await;

    assert!(matches!(result, Err(BiliError::Session(m)) if m == "sink refused"));
}

#[tokio::test]
async fn test_platform_rejection_aborts_the_walk() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(COMMENT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": -404, "message": "啥都木有", "data": null})),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let crawler = CommentCrawler::new(&client, create_test_options(100, false));
    let sink = MemorySink::new();

    let result = crawler.crawl_video_comments("170001", &sink).await;

    assert!(matches!(result, Err(BiliError::DataFetch(m)) if m == "啥都木有"));
}

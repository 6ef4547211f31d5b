//! Integration tests for the crawler
//!
//! These tests use wiremock to serve the catalog data routes and run the
//! full crawl cycle end-to-end.

use nord_sound_crawler::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use nord_sound_crawler::crawler::{run_crawl, ChainOutcome, Coordinator};
use nord_sound_crawler::output::MemorySink;
use nord_sound_crawler::url::Category;
use nord_sound_crawler::SoundItem;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUILD_ID: &str = "test-build";

/// Creates a test configuration pointing at the mock server
fn create_test_config(origin: &str, categories: Vec<Category>, items_path: &str) -> Config {
    Config {
        site: SiteConfig {
            origin: origin.to_string(),
            build_id: BUILD_ID.to_string(),
            locale: "en".to_string(),
        },
        crawler: CrawlerConfig {
            selected_product: "54".to_string(),
            categories,
            max_concurrent_requests: 2,
            request_timeout: 5_000,
            max_retries: 1,
            retry_delay: 10, // Very short for testing
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            items_path: items_path.to_string(),
        },
    }
}

fn route(category: Category) -> String {
    format!("/_next/data/{}/en/sounds/{}.json", BUILD_ID, category)
}

fn raw_item(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Title {}", id),
        "type": "Grand Piano",
        "text": "A sound",
        "image": { "title": "cover", "url": format!("/images/{}.png", id) },
        "link": { "href": format!("/sounds/{}", id) },
        "download": null,
        "playerData": null,
        "pianoDownloads": null
    })
}

fn envelope(pagination: Value, items: Value) -> Value {
    json!({ "pageProps": { "componentProps": { "pagination": pagination, "items": items } } })
}

async fn mount_page(server: &MockServer, category: Category, page: u64, body: Value) {
    Mock::given(method("GET"))
        .and(path(route(category)))
        .and(query_param("selected_product", "54"))
        .and(query_param("page", page.to_string()))
        .and(query_param("sort", "alphabetic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn ids_with_prefix<'a>(items: &'a [SoundItem], prefix: &str) -> Vec<&'a str> {
    items
        .iter()
        .map(|item| item.id.as_str())
        .filter(|id| id.starts_with(prefix))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_all_categories() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    // Piano library: two pages, one invalid item on the second
    let mut downloadable = raw_item("piano-2");
    downloadable["download"] = json!("true");
    downloadable["pianoDownloads"] = json!("/downloads/piano-2.zip");
    mount_page(
        &mock_server,
        Category::PianoLibrary,
        1,
        envelope(
            json!({ "currentPage": 1, "totalPages": 2 }),
            json!([raw_item("piano-1"), downloadable]),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        Category::PianoLibrary,
        2,
        envelope(
            json!({ "currentPage": 2, "totalPages": 2 }),
            json!([{ "id": "piano-broken", "type": "x" }, raw_item("piano-3")]),
        ),
    )
    .await;

    // Sample library: item list is not an array, single page
    mount_page(
        &mock_server,
        Category::SampleLibrary,
        1,
        envelope(json!({ "currentPage": 1, "totalPages": 1 }), json!({ "oops": true })),
    )
    .await;

    // Sound collections: no pagination block, items still extracted
    mount_page(
        &mock_server,
        Category::SoundCollections,
        1,
        json!({ "pageProps": { "componentProps": {
            "items": [raw_item("collection-1")]
        } } }),
    )
    .await;

    // Signature sound banks: missing route
    Mock::given(method("GET"))
        .and(path(route(Category::SignatureSoundBanks)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&origin, Category::ALL.to_vec(), "unused.jsonl");
    let mut coordinator = Coordinator::new(config, MemorySink::new()).expect("coordinator");
    let stats = coordinator.run().await.expect("crawl should succeed");

    let sink = coordinator.into_sink();
    assert!(sink.is_finished());
    let items = sink.items();

    // Within a category, items arrive in page order
    assert_eq!(
        ids_with_prefix(items, "piano-"),
        vec!["piano-1", "piano-2", "piano-3"]
    );
    assert_eq!(ids_with_prefix(items, "collection-"), vec!["collection-1"]);
    assert_eq!(items.len(), 4);

    let piano_1 = items.iter().find(|i| i.id == "piano-1").unwrap();
    assert_eq!(piano_1.link, format!("{}/sounds/piano-1", origin));
    assert_eq!(piano_1.image.url, "/images/piano-1.png");
    assert_eq!(piano_1.piano_downloads, None);

    let piano_2 = items.iter().find(|i| i.id == "piano-2").unwrap();
    assert_eq!(
        piano_2.piano_downloads.as_deref(),
        Some(format!("{}/downloads/piano-2.zip", origin).as_str())
    );

    assert_eq!(stats.pages_fetched(), 4);
    assert_eq!(stats.items_emitted(), 4);
    assert_eq!(stats.validation_failures(), 1);
    assert_eq!(stats.envelope_errors(), 1);
    assert_eq!(stats.pagination_errors(), 1);
    assert_eq!(stats.fetch_failures(), 1);

    assert_eq!(
        stats.categories[&Category::PianoLibrary].outcome,
        Some(ChainOutcome::Exhausted)
    );
    assert_eq!(
        stats.categories[&Category::SampleLibrary].outcome,
        Some(ChainOutcome::Exhausted)
    );
    assert!(matches!(
        stats.categories[&Category::SoundCollections].outcome,
        Some(ChainOutcome::PaginationError { .. })
    ));
    match &stats.categories[&Category::SignatureSoundBanks].outcome {
        Some(ChainOutcome::FetchFailed { reason, .. }) => assert_eq!(reason, "HTTP 404"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_crawl_writes_json_lines() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();
    let items_path = dir.path().join("items.jsonl");

    for page in 1..=3u64 {
        mount_page(
            &mock_server,
            Category::SignatureSoundBanks,
            page,
            envelope(
                json!({ "currentPage": page, "totalPages": 3 }),
                json!([raw_item(&format!("bank-{}", page))]),
            ),
        )
        .await;
    }

    let config = create_test_config(
        &origin,
        vec![Category::SignatureSoundBanks],
        &items_path.display().to_string(),
    );
    let stats = run_crawl(config).await.expect("crawl should succeed");
    assert_eq!(stats.items_emitted(), 3);

    let content = std::fs::read_to_string(&items_path).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], "bank-1");
    assert_eq!(lines[2]["id"], "bank-3");
    assert_eq!(lines[1]["type"], "Grand Piano");
    assert_eq!(lines[1]["link"], format!("{}/sounds/bank-2", origin));
    assert!(lines[1]["pianoDownloads"].is_null());
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(route(Category::PianoLibrary)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(route(Category::PianoLibrary)))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!({ "currentPage": 1, "totalPages": 1 }),
            json!([raw_item("piano-1")]),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&origin, vec![Category::PianoLibrary], "unused.jsonl");
    let mut coordinator = Coordinator::new(config, MemorySink::new()).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_emitted(), 1);
    assert_eq!(stats.fetch_failures(), 0);
}

#[tokio::test]
async fn test_invalid_json_stops_only_its_category() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(route(Category::SampleLibrary)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        Category::PianoLibrary,
        1,
        envelope(
            json!({ "currentPage": 1, "totalPages": 1 }),
            json!([raw_item("piano-1")]),
        ),
    )
    .await;

    let config = create_test_config(
        &origin,
        vec![Category::PianoLibrary, Category::SampleLibrary],
        "unused.jsonl",
    );
    let mut coordinator = Coordinator::new(config, MemorySink::new()).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(coordinator.sink().items().len(), 1);
    assert_eq!(stats.fetch_failures(), 1);
    assert!(matches!(
        &stats.categories[&Category::SampleLibrary].outcome,
        Some(ChainOutcome::FetchFailed { reason, .. }) if reason.starts_with("invalid JSON")
    ));
}

//! End-to-end tests for the song endpoints
//!
//! These tests drive `SongHandler` over the in-memory repository with a
//! scripted details provider:
//! - Creation with enrichment, then verse reads
//! - Listing with filters and pagination
//! - Partial updates and deletes
//! - Error-to-status mapping and cancellation

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use core_library::date::ReleaseDate;
use core_library::models::SongDetail;
use core_library::InMemorySongRepository;
use core_metadata::{MetadataError, SongDetailProvider};
use core_service::{ApiResponse, CoreDependencies, CoreService, SongHandler};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Details provider answering every lookup the same way
struct ScriptedDetails {
    text: Option<&'static str>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedDetails {
    fn answering(text: &'static str) -> Self {
        Self {
            text: Some(text),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            text: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            text: Some("slow"),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SongDetailProvider for ScriptedDetails {
    async fn fetch(&self, _title: &str, _group: &str) -> core_metadata::Result<SongDetail> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.text {
            Some(text) => Ok(SongDetail {
                text: text.to_string(),
                link: "http://x".to_string(),
                release_date: ReleaseDate::from_ymd(2020, 1, 1).unwrap(),
            }),
            None => Err(MetadataError::EnrichmentUnavailable { status: 500 }),
        }
    }
}

struct Harness {
    handler: Arc<SongHandler>,
    repository: Arc<InMemorySongRepository>,
    details: Arc<ScriptedDetails>,
}

fn harness_with(details: ScriptedDetails, timeout: Option<Duration>) -> Harness {
    let repository = Arc::new(InMemorySongRepository::new());
    let details = Arc::new(details);
    let core = CoreService::new(
        CoreDependencies::new(repository.clone(), details.clone()),
        timeout,
        &Span::none(),
    );

    Harness {
        handler: core.handler(),
        repository,
        details,
    }
}

fn harness(text: &'static str) -> Harness {
    harness_with(ScriptedDetails::answering(text), None)
}

fn query(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn empty_error(status: u16) -> ApiResponse {
    ApiResponse {
        status,
        body: Some(json!({})),
    }
}

async fn create(harness: &Harness, song: &str, group: &str) -> i64 {
    let body = json!({ "song": song, "group": group }).to_string();
    let response = harness
        .handler
        .create_song(body.as_bytes(), &CancellationToken::new())
        .await;
    assert_eq!(response.status, 201);
    response.body.unwrap()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_then_read_second_verse() {
    let harness = harness("V1\n\nV2");
    let cancel = CancellationToken::new();

    let id = create(&harness, "X", "Y").await;

    let stored = harness.repository.get(id).unwrap().unwrap();
    assert_eq!(stored.text, "V1\n\nV2");
    assert_eq!(stored.link, "http://x");
    assert_eq!(stored.release_date.to_string(), "01.01.2020");

    let response = harness
        .handler
        .read_text(&id.to_string(), &query(&[("page", "2")]), &cancel)
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        Some(json!({ "id": id, "page": 2, "verse": "V2" }))
    );

    let response = harness
        .handler
        .read_text(&id.to_string(), &query(&[("page", "3")]), &cancel)
        .await;
    assert_eq!(response, empty_error(400));
}

#[tokio::test]
async fn test_failed_enrichment_writes_nothing() {
    let harness = harness_with(ScriptedDetails::failing(), None);

    let response = harness
        .handler
        .create_song(br#"{"song":"X","group":"Y"}"#, &CancellationToken::new())
        .await;

    assert_eq!(response, empty_error(502));
    assert_eq!(harness.details.calls.load(Ordering::SeqCst), 1);
    assert!(harness.repository.is_empty().unwrap());
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let harness = harness("V1");
    let cancel = CancellationToken::new();

    let bodies: [&[u8]; 3] = [b"not json", br#"{"song":"X"}"#, br#"{"song":" ","group":"Y"}"#];
    for body in bodies {
        let response = harness.handler.create_song(body, &cancel).await;
        assert_eq!(response, empty_error(400));
    }
    assert_eq!(harness.details.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let harness = harness("V1");
    let cancel = CancellationToken::new();

    let empty = harness
        .handler
        .list_songs(&query(&[("page", "1"), ("limit", "10")]), &cancel)
        .await;
    assert_eq!(empty.status, 200);
    assert_eq!(empty.body, Some(json!([])));

    create(&harness, "A", "Muse").await;
    create(&harness, "B", "Muse").await;
    create(&harness, "C", "Queen").await;

    let response = harness
        .handler
        .list_songs(
            &query(&[("group", "Muse"), ("page", "2"), ("limit", "1")]),
            &cancel,
        )
        .await;
    assert_eq!(response.status, 200);
    let songs = response.body.unwrap();
    assert_eq!(songs.as_array().unwrap().len(), 1);
    assert_eq!(songs[0]["song"], "B");
    assert_eq!(songs[0]["releaseDate"], "01.01.2020");

    let response = harness
        .handler
        .list_songs(
            &query(&[("release_date", "01.01.2020"), ("page", "1"), ("limit", "10")]),
            &cancel,
        )
        .await;
    assert_eq!(response.body.unwrap().as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let harness = harness("V1");
    let cancel = CancellationToken::new();

    for params in [
        vec![("page", "0"), ("limit", "10")],
        vec![("page", "1"), ("limit", "0")],
        vec![("page", "1"), ("limit", "2147483648")],
        vec![("page", "1")],
        vec![("page", "x"), ("limit", "10")],
        vec![("page", "1"), ("limit", "10"), ("release_date", "2020-01-01")],
        vec![("page", "1"), ("limit", "10"), ("order", "name")],
        vec![("page", "1"), ("limit", "10"), ("group", "a"), ("group", "b")],
    ] {
        let response = harness.handler.list_songs(&query(&params), &cancel).await;
        assert_eq!(response, empty_error(400), "accepted {params:?}");
    }
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let harness = harness("V1\n\nV2");
    let cancel = CancellationToken::new();
    let id = create(&harness, "X", "Y").await;

    let response = harness
        .handler
        .update_song(
            &id.to_string(),
            br#"{"text":"new lyrics","releaseDate":"17.03.2021"}"#,
            &cancel,
        )
        .await;
    assert_eq!(response, ApiResponse { status: 204, body: None });

    let song = harness.repository.get(id).unwrap().unwrap();
    assert_eq!(song.text, "new lyrics");
    assert_eq!(song.release_date.to_string(), "17.03.2021");
    assert_eq!(song.title, "X");
    assert_eq!(song.link, "http://x");
}

#[tokio::test]
async fn test_update_errors() {
    let harness = harness("V1");
    let cancel = CancellationToken::new();
    let id = create(&harness, "X", "Y").await.to_string();

    let cases: [(&str, &[u8], u16); 5] = [
        (&id, b"{}", 400),
        (&id, br#"{"releaseDate":"2021-03-17"}"#, 400),
        (&id, b"[", 400),
        ("abc", br#"{"text":"t"}"#, 400),
        ("999", br#"{"text":"t"}"#, 404),
    ];

    for (target, body, status) in cases {
        let response = harness.handler.update_song(target, body, &cancel).await;
        assert_eq!(response, empty_error(status));
    }
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let harness = harness("V1");
    let cancel = CancellationToken::new();
    let id = create(&harness, "X", "Y").await.to_string();

    for _ in 0..2 {
        let response = harness.handler.delete_song(&id, &cancel).await;
        assert_eq!(response, ApiResponse { status: 204, body: None });
    }
    assert!(harness.repository.is_empty().unwrap());

    let response = harness
        .handler
        .read_text(&id, &query(&[("page", "1")]), &cancel)
        .await;
    assert_eq!(response, empty_error(404));
}

#[tokio::test]
async fn test_cancelled_request_fails_without_writing() {
    let harness = harness("V1");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let response = harness
        .handler
        .create_song(br#"{"song":"X","group":"Y"}"#, &cancel)
        .await;

    assert_eq!(response, empty_error(500));
    assert!(harness.repository.is_empty().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_aborts_slow_lookup() {
    let harness = harness_with(
        ScriptedDetails::slow(Duration::from_secs(30)),
        Some(Duration::from_millis(200)),
    );

    let response = harness
        .handler
        .create_song(br#"{"song":"X","group":"Y"}"#, &CancellationToken::new())
        .await;

    assert_eq!(response, empty_error(500));
    assert!(harness.repository.is_empty().unwrap());
}

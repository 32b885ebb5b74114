// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end collection pipeline tests against fake provider endpoints.

use activity_collector::db::{ActivityStore, MemoryStore};
use activity_collector::services::{
    CollectorService, ListenBrainzClient, MonkeytypeClient, WakaTimeClient,
};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Serve a router on an ephemeral local port, returning its base URL.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}", addr)
}

async fn serve_json(path: &str, payload: Value) -> String {
    let app = Router::new().route(path, get(move || {
        let payload = payload.clone();
        async move { Json(payload) }
    }));
    spawn_server(app).await
}

async fn serve_error(path: &str) -> String {
    let app = Router::new().route(path, get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    spawn_server(app).await
}

fn wakatime_payload() -> Value {
    json!({
        "data": [{
            "projects": [
                {"name": "activity-collector", "total_seconds": 4523.66},
                {"name": "dotfiles", "total_seconds": 845.2}
            ],
            "range": {
                "date": "2024-01-01",
                "start": "2024-01-01T05:00:00Z",
                "end": "2024-01-02T04:59:59Z"
            }
        }]
    })
}

fn monkeytype_payload() -> Value {
    json!({
        "message": "Results retrieved",
        "data": [
            {
                "_id": "65a1f0aa7",
                "wpm": 87.6,
                "acc": 96.2,
                "mode": "time",
                "mode2": "30",
                "timestamp": 1704146400000i64,
                "testDuration": 30.02
            },
            {
                "_id": "65a1e99b2",
                "wpm": 102.4,
                "acc": 98.7,
                "mode": "words",
                "mode2": "25",
                "timestamp": 1704142800000i64,
                "testDuration": 14.55
            }
        ]
    })
}

fn listenbrainz_payload() -> Value {
    json!({
        "payload": {
            "count": 2,
            "listens": [
                {
                    "listened_at": 1704150000,
                    "track_metadata": {
                        "track_name": "Windowlicker",
                        "artist_name": "Aphex Twin",
                        "additional_info": {
                            "recording_mbid": "d88e2a3e-6ef7-4f2f-9880-2c6b4a2ce7c6",
                            "duration_ms": 366521
                        }
                    }
                },
                {
                    "listened_at": 1704149000,
                    "track_metadata": {
                        "track_name": "Avril 14th",
                        "artist_name": "Aphex Twin",
                        "additional_info": {
                            "recording_mbid": "9b2fb2b8-9b9b-4b5e-93b0-6c0b4a3f74d3",
                            "duration_ms": 125000
                        }
                    }
                }
            ]
        }
    })
}

const WAKATIME_PATH: &str = "/users/current/summaries";
const MONKEYTYPE_PATH: &str = "/results";
const LISTENBRAINZ_PATH: &str = "/1/user/listener/listens";

fn collector(
    store: MemoryStore,
    waka_base: &str,
    monkey_base: &str,
    listen_base: &str,
) -> CollectorService<MemoryStore> {
    let http = reqwest::Client::new();
    CollectorService::new(
        WakaTimeClient::new(http.clone(), "waka-key".to_string()).with_base_url(waka_base),
        MonkeytypeClient::new(http.clone(), "ape-key".to_string()).with_base_url(monkey_base),
        ListenBrainzClient::new(http, "listener".to_string()).with_base_url(listen_base),
        store,
    )
}

#[tokio::test]
async fn test_full_run_writes_all_sources() {
    let waka = serve_json(WAKATIME_PATH, wakatime_payload()).await;
    let monkey = serve_json(MONKEYTYPE_PATH, monkeytype_payload()).await;
    let listen = serve_json(LISTENBRAINZ_PATH, listenbrainz_payload()).await;

    let store = MemoryStore::new();
    let summary = collector(store.clone(), &waka, &monkey, &listen)
        .run()
        .await
        .expect("run succeeds");

    assert_eq!(summary.coding, 2);
    assert_eq!(summary.typing, 2);
    assert_eq!(summary.listening, 2);
    assert_eq!(summary.written, 6);

    assert_eq!(store.len(), 6);
    assert_eq!(store.upsert_call_count(), 1);

    // Deterministic ids derived from each provider's native identifier.
    assert!(store.get("coding-2024-01-01-activity-collector").is_some());
    assert!(store.get("typing-65a1f0aa7").is_some());
    assert!(store
        .get("listening-1704150000-d88e2a3e-6ef7-4f2f-9880-2c6b4a2ce7c6")
        .is_some());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let waka = serve_json(WAKATIME_PATH, wakatime_payload()).await;
    let monkey = serve_json(MONKEYTYPE_PATH, monkeytype_payload()).await;
    let listen = serve_json(LISTENBRAINZ_PATH, listenbrainz_payload()).await;

    let store = MemoryStore::new();
    let collector = collector(store.clone(), &waka, &monkey, &listen);

    collector.run().await.expect("first run");
    let after_first = store.len();
    collector.run().await.expect("second run");

    // Same provider events, same ids: overwrite, never duplicate.
    assert_eq!(store.len(), after_first);
    assert_eq!(store.upsert_call_count(), 2);
}

#[tokio::test]
async fn test_reingest_replaces_fields() {
    let store = MemoryStore::new();

    let waka = serve_json(WAKATIME_PATH, wakatime_payload()).await;
    let monkey = serve_error(MONKEYTYPE_PATH).await;
    let listen = serve_error(LISTENBRAINZ_PATH).await;
    collector(store.clone(), &waka, &monkey, &listen)
        .run()
        .await
        .expect("first run");

    // The same reporting window later in the day: totals grew.
    let mut updated = wakatime_payload();
    updated["data"][0]["projects"][0]["total_seconds"] = json!(7200.4);
    let waka = serve_json(WAKATIME_PATH, updated).await;
    collector(store.clone(), &waka, &monkey, &listen)
        .run()
        .await
        .expect("second run");

    assert_eq!(store.len(), 2);
    let refreshed = store
        .get("coding-2024-01-01-activity-collector")
        .expect("record present");
    assert_eq!(refreshed.duration_seconds, Some(7200));
}

#[tokio::test]
async fn test_failing_provider_does_not_abort_batch() {
    let waka = serve_error(WAKATIME_PATH).await;
    let monkey = serve_json(MONKEYTYPE_PATH, monkeytype_payload()).await;
    let listen = serve_json(LISTENBRAINZ_PATH, listenbrainz_payload()).await;

    let store = MemoryStore::new();
    let summary = collector(store.clone(), &waka, &monkey, &listen)
        .run()
        .await
        .expect("run still succeeds");

    assert_eq!(summary.coding, 0);
    assert_eq!(summary.typing, 2);
    assert_eq!(summary.listening, 2);
    assert_eq!(summary.written, 4);

    assert!(store.get("typing-65a1f0aa7").is_some());
    assert!(store
        .get("listening-1704149000-9b2fb2b8-9b9b-4b5e-93b0-6c0b4a3f74d3")
        .is_some());
}

#[tokio::test]
async fn test_missing_credential_disables_only_that_adapter() {
    let monkey = serve_json(MONKEYTYPE_PATH, monkeytype_payload()).await;
    let listen = serve_json(LISTENBRAINZ_PATH, listenbrainz_payload()).await;

    let store = MemoryStore::new();
    let http = reqwest::Client::new();
    // No WakaTime key configured: that adapter fails locally, the rest of
    // the batch is unaffected (no request is ever made to the default URL).
    let collector = CollectorService::new(
        WakaTimeClient::new(http.clone(), String::new()),
        MonkeytypeClient::new(http.clone(), "ape-key".to_string()).with_base_url(&monkey),
        ListenBrainzClient::new(http, "listener".to_string()).with_base_url(&listen),
        store.clone(),
    );

    let summary = collector.run().await.expect("run succeeds");
    assert_eq!(summary.coding, 0);
    assert_eq!(summary.written, 4);
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn test_empty_batch_skips_store_call() {
    let waka = serve_json(
        WAKATIME_PATH,
        json!({
            "data": [{
                "projects": [],
                "range": {
                    "date": "2024-01-01",
                    "start": "2024-01-01T05:00:00Z",
                    "end": "2024-01-02T04:59:59Z"
                }
            }]
        }),
    )
    .await;
    let monkey = serve_json(MONKEYTYPE_PATH, json!({"data": []})).await;
    let listen = serve_json(LISTENBRAINZ_PATH, json!({"payload": {"listens": []}})).await;

    let store = MemoryStore::new();
    let summary = collector(store.clone(), &waka, &monkey, &listen)
        .run()
        .await
        .expect("run succeeds");

    assert_eq!(summary.written, 0);
    assert_eq!(store.upsert_call_count(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_store_failure_fails_the_run() {
    let waka = serve_json(WAKATIME_PATH, wakatime_payload()).await;
    let monkey = serve_json(MONKEYTYPE_PATH, monkeytype_payload()).await;
    let listen = serve_json(LISTENBRAINZ_PATH, listenbrainz_payload()).await;

    let store = MemoryStore::new();
    store.set_fail_writes(true);

    let result = collector(store.clone(), &waka, &monkey, &listen).run().await;

    assert!(result.is_err());
    assert_eq!(store.upsert_call_count(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_feed_query_groups_the_written_day() {
    let waka = serve_json(WAKATIME_PATH, wakatime_payload()).await;
    let monkey = serve_json(MONKEYTYPE_PATH, monkeytype_payload()).await;
    let listen = serve_json(LISTENBRAINZ_PATH, listenbrainz_payload()).await;

    let store = MemoryStore::new();
    collector(store.clone(), &waka, &monkey, &listen)
        .run()
        .await
        .expect("run succeeds");

    // All fixture events complete between 2024-01-01T05:00Z and
    // 2024-01-02T05:00Z, i.e. on 2024-01-01 at the -05:00 display offset.
    let activities = store
        .activities_completed_between("2024-01-01T05:00:00Z", "2024-01-02T04:59:59Z")
        .await
        .expect("query succeeds");

    assert_eq!(activities.len(), 6);
    // Ordered newest first.
    let completed: Vec<&str> = activities.iter().map(|a| a.completed_at.as_str()).collect();
    let mut sorted = completed.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(completed, sorted);

    // The day before is empty, not an error.
    let previous_day = store
        .activities_completed_between("2023-12-31T05:00:00Z", "2024-01-01T04:59:59Z")
        .await
        .expect("query succeeds");
    assert!(previous_day.is_empty());
}

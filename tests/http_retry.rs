// tests/http_retry.rs
mod common;

use std::time::Duration;

use common::{ok_json, reset, status, ScriptedTransport};
use product_ranker::ingest::client::{HttpRequest, ResilientClient, RetryPolicy};
use product_ranker::IngestError;
use serde_json::json;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn persistent_503_is_attempted_three_times_with_growing_gaps() {
    let t = ScriptedTransport::new(|req, _| status(req, 503));
    let client = ResilientClient::new("test", t.clone(), Duration::ZERO);

    let started = Instant::now();
    let err = client
        .send(&HttpRequest::get("https://shop.test/search"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Status { status: 503, .. }));
    assert_eq!(t.calls(), 3);

    let at = t.instants();
    let gap1 = at[1] - at[0];
    let gap2 = at[2] - at[1];
    assert!(gap1 >= Duration::from_secs(1) && gap1 < Duration::from_millis(1502), "{gap1:?}");
    assert!(gap2 >= Duration::from_secs(2) && gap2 < Duration::from_millis(2502), "{gap2:?}");
    assert!(gap2 > gap1);

    // no sleep after the final attempt (another one would add 4s or more)
    assert!(started.elapsed() < Duration::from_millis(4100));
}

#[tokio::test(start_paused = true)]
async fn transient_reset_recovers_on_second_attempt() {
    let t = ScriptedTransport::new(|req, n| {
        if n == 0 {
            reset(req)
        } else {
            ok_json(json!({"ok": true}))
        }
    });
    let client = ResilientClient::new("test", t.clone(), Duration::ZERO);
    let rsp = client.send(&HttpRequest::get("https://shop.test/a")).await.unwrap();
    assert_eq!(rsp.status, 200);
    assert_eq!(t.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn decode_failures_are_not_retried() {
    let t = ScriptedTransport::new(|_, _| {
        Err(IngestError::Decode {
            context: "body".into(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        })
    });
    let client = ResilientClient::new("test", t.clone(), Duration::ZERO);
    assert!(client.send(&HttpRequest::get("https://shop.test/a")).await.is_err());
    assert_eq!(t.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn requests_are_spaced_by_min_interval() {
    let t = ScriptedTransport::new(|_, _| ok_json(json!([])));
    let client = ResilientClient::new("test", t.clone(), Duration::from_millis(500));
    for _ in 0..3 {
        client.send(&HttpRequest::get("https://shop.test/a")).await.unwrap();
    }
    let at = t.instants();
    assert!(at[1] - at[0] >= Duration::from_millis(500));
    assert!(at[2] - at[1] >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn throttle_is_per_client() {
    let t = ScriptedTransport::new(|_, _| ok_json(json!([])));
    let a = ResilientClient::new("a", t.clone(), Duration::from_secs(5));
    let b = ResilientClient::new("b", t.clone(), Duration::from_secs(5));
    a.send(&HttpRequest::get("https://shop.test/a")).await.unwrap();
    b.send(&HttpRequest::get("https://shop.test/b")).await.unwrap();
    let at = t.instants();
    assert!(at[1] - at[0] < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn custom_policy_changes_attempt_count() {
    let t = ScriptedTransport::new(|req, _| status(req, 500));
    let client = ResilientClient::new("test", t.clone(), Duration::ZERO).with_policy(RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(10),
        max_jitter: Duration::ZERO,
    });
    assert!(client.send(&HttpRequest::get("https://shop.test/a")).await.is_err());
    assert_eq!(t.calls(), 5);
}

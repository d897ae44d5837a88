//! End-to-end watcher scenarios with fake collaborators
//!
//! These tests drive `VersionWatcher` through its public API using
//! hand-rolled trait implementations, without a network or a real host.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use verwatch::config::WatchConfig;
use verwatch::io::{HttpClient, HttpResponse};
use verwatch::notifier::{Notice, Notifier};
use verwatch::reload::Reloader;
use verwatch::store::{MemoryStore, SessionStore};
use verwatch::watcher::{CheckOutcome, VERSION_KEY};
use verwatch::{VersionWatcher, WatchError};

// ============================================================================
// Fake collaborators
// ============================================================================

/// Serves a scripted sequence of responses, then repeats the last one
struct ScriptedHttp {
    responses: StdMutex<VecDeque<Result<HttpResponse, String>>>,
    last: StdMutex<Option<Result<HttpResponse, String>>>,
    requests: StdMutex<Vec<String>>,
}

impl ScriptedHttp {
    fn new(responses: Vec<Result<HttpResponse, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: StdMutex::new(responses.into_iter().collect()),
            last: StdMutex::new(None),
            requests: StdMutex::new(Vec::new()),
        })
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn get(&self, url: &str) -> verwatch::Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        let next = {
            let mut responses = self.responses.lock().unwrap();
            match responses.pop_front() {
                Some(response) => {
                    *self.last.lock().unwrap() = Some(response.clone());
                    response
                }
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| Err("no scripted response".to_string())),
            }
        };

        next.map_err(WatchError::Http)
    }
}

/// Records every event in order, so cross-collaborator ordering is checkable
#[derive(Default)]
struct EventLog {
    events: StdMutex<Vec<String>>,
}

impl EventLog {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

struct RecordingNotifier {
    log: Arc<EventLog>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &Notice) -> verwatch::Result<()> {
        self.log
            .push(format!("notice:{}:{}", notice.kind, notice.message));
        Ok(())
    }
}

struct RecordingReloader {
    log: Arc<EventLog>,
    store: Arc<MemoryStore>,
}

#[async_trait]
impl Reloader for RecordingReloader {
    async fn reload(&self) -> verwatch::Result<()> {
        let baseline = self.store.get(VERSION_KEY).await?;
        self.log
            .push(format!("reload:baseline={}", baseline.unwrap_or_default()));
        Ok(())
    }
}

fn watch_config() -> WatchConfig {
    WatchConfig {
        version_url: "https://example.com/version.json".to_string(),
        check_interval_seconds: 120,
        failure_warn_threshold: 5,
    }
}

fn build(
    http: Arc<ScriptedHttp>,
    store: Arc<MemoryStore>,
    with_notifier: bool,
) -> (VersionWatcher, Arc<EventLog>) {
    let log = Arc::new(EventLog::default());
    let notifier: Option<Arc<dyn Notifier>> = if with_notifier {
        Some(Arc::new(RecordingNotifier {
            log: Arc::clone(&log),
        }))
    } else {
        None
    };
    let reloader = Arc::new(RecordingReloader {
        log: Arc::clone(&log),
        store: Arc::clone(&store),
    });

    let watcher = VersionWatcher::new(
        &watch_config(),
        Duration::ZERO,
        http,
        store,
        notifier,
        reloader,
    );
    (watcher, log)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn session_lifecycle_baseline_then_update() {
    let http = ScriptedHttp::new(vec![
        ScriptedHttp::ok(200, r#"{"version": "1.0.0"}"#),
        ScriptedHttp::ok(200, r#"{"version": "1.0.0"}"#),
        ScriptedHttp::ok(200, r#"{"version": "1.0.1"}"#),
        ScriptedHttp::ok(200, r#"{"version": "1.0.1"}"#),
    ]);
    let store = Arc::new(MemoryStore::new());
    let (watcher, log) = build(Arc::clone(&http), Arc::clone(&store), true);

    assert_eq!(watcher.check().await, CheckOutcome::BaselineStored);
    assert_eq!(watcher.check().await, CheckOutcome::Unchanged);
    assert_eq!(watcher.check().await, CheckOutcome::Refreshed);
    assert_eq!(watcher.check().await, CheckOutcome::Unchanged);

    assert_eq!(
        store.get(VERSION_KEY).await.unwrap(),
        Some("1.0.1".to_string())
    );
    assert_eq!(
        log.events(),
        vec![
            "notice:info:Updating site to the latest version...".to_string(),
            "reload:baseline=1.0.1".to_string(),
        ]
    );
}

#[tokio::test]
async fn without_notifier_refresh_is_immediate_and_silent() {
    let http = ScriptedHttp::new(vec![
        ScriptedHttp::ok(200, r#"{"version": "1.0.0"}"#),
        ScriptedHttp::ok(200, r#"{"version": "2.0.0"}"#),
    ]);
    let store = Arc::new(MemoryStore::new());
    let (watcher, log) = build(http, store, false);

    assert_eq!(watcher.check().await, CheckOutcome::BaselineStored);
    assert_eq!(watcher.check().await, CheckOutcome::Refreshed);

    assert_eq!(log.events(), vec!["reload:baseline=2.0.0".to_string()]);
}

#[tokio::test]
async fn failed_cycles_recover_on_next_successful_poll() {
    let http = ScriptedHttp::new(vec![
        ScriptedHttp::ok(200, r#"{"version": "1.0.0"}"#),
        Err("connection reset".to_string()),
        ScriptedHttp::ok(503, "Service Unavailable"),
        ScriptedHttp::ok(200, "not json at all"),
        ScriptedHttp::ok(200, r#"{"version": "1.0.1"}"#),
    ]);
    let store = Arc::new(MemoryStore::new());
    let (watcher, log) = build(http, Arc::clone(&store), true);

    assert_eq!(watcher.check().await, CheckOutcome::BaselineStored);
    assert_eq!(watcher.check().await, CheckOutcome::Skipped);
    assert_eq!(watcher.check().await, CheckOutcome::Skipped);
    assert_eq!(watcher.check().await, CheckOutcome::Skipped);

    // Baseline survived three failed cycles untouched.
    assert_eq!(
        store.get(VERSION_KEY).await.unwrap(),
        Some("1.0.0".to_string())
    );
    assert!(log.events().is_empty());

    assert_eq!(watcher.check().await, CheckOutcome::Refreshed);
    assert_eq!(
        store.get(VERSION_KEY).await.unwrap(),
        Some("1.0.1".to_string())
    );
}

#[tokio::test]
async fn every_request_gets_a_fresh_cache_buster() {
    let http = ScriptedHttp::new(vec![ScriptedHttp::ok(200, r#"{"version": "1.0.0"}"#)]);
    let store = Arc::new(MemoryStore::new());
    let (watcher, _log) = build(Arc::clone(&http), store, false);

    watcher.check().await;
    watcher.check().await;

    let requests = http.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert!(
            request.starts_with("https://example.com/version.json?t="),
            "{request}"
        );
    }
}

#[tokio::test]
async fn version_string_comparison_is_exact() {
    // "1.0" and "1.0.0" are different opaque tokens, so this is a change.
    let http = ScriptedHttp::new(vec![
        ScriptedHttp::ok(200, r#"{"version": "1.0"}"#),
        ScriptedHttp::ok(200, r#"{"version": "1.0.0"}"#),
    ]);
    let store = Arc::new(MemoryStore::new());
    let (watcher, log) = build(http, store, false);

    assert_eq!(watcher.check().await, CheckOutcome::BaselineStored);
    assert_eq!(watcher.check().await, CheckOutcome::Refreshed);
    assert_eq!(log.events(), vec!["reload:baseline=1.0.0".to_string()]);
}

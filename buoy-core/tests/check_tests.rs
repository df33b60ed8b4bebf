// Tests for the check pipeline and change classification

use async_trait::async_trait;
use buoy_core::check::{ChangeStatus, CheckOptions, classify, execute_check};
use buoy_core::config::Target;
use buoy_core::store::HashRecord;
use buoy_probe::error::Result as ProbeOutcome;
use buoy_probe::{ContentProbe, ProbeError, ProbeResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Scripted probe
// ============================================================================

/// One canned outcome for a probe call.
#[derive(Debug, Clone)]
enum Script {
    /// Respond 200 with this body.
    Body(&'static str),
    /// Fail with this HTTP status.
    Status(u16),
}

/// Probe that replays a per-URL queue of scripted outcomes, one per call.
struct ScriptedProbe {
    outcomes: Mutex<HashMap<String, VecDeque<Script>>>,
}

impl ScriptedProbe {
    fn new(scripts: &[(&str, &[Script])]) -> Self {
        let mut outcomes = HashMap::new();
        for (url, steps) in scripts {
            outcomes.insert(url.to_string(), steps.iter().cloned().collect());
        }
        Self {
            outcomes: Mutex::new(outcomes),
        }
    }
}

#[async_trait]
impl ContentProbe for ScriptedProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome<ProbeResult> {
        let script = self
            .outcomes
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .expect("probe called for an unscripted URL");

        match script {
            Script::Body(body) => Ok(probe_result(url, body)),
            Script::Status(code) => Err(ProbeError::HttpStatus(code)),
        }
    }
}

fn digest_of(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn probe_result(url: &str, body: &str) -> ProbeResult {
    ProbeResult {
        url: url.to_string(),
        digest: digest_of(body),
        status_code: 200,
        content_type: Some("text/html".to_string()),
        content_length: body.len() as u64,
        response_time: Duration::from_millis(1),
    }
}

fn target(name: &str, url: &str) -> Target {
    Target {
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn no_pause() -> CheckOptions {
    CheckOptions {
        pause: Duration::ZERO,
        show_progress: false,
    }
}

// ============================================================================
// Classification tests
// ============================================================================

#[test]
fn test_classify_initial() {
    let outcome = Ok(probe_result("http://a", "hello"));
    let event = classify("A", "http://a", None, &outcome);

    assert_eq!(event.status, ChangeStatus::Initial);
    assert_eq!(event.status_text(), "Initial Check (No history recorded)");
    assert_eq!(
        event.detail,
        format!("Initial Hash: {}...", &digest_of("hello")[..8])
    );
    assert!(event.error.is_none());
}

#[test]
fn test_classify_changed() {
    let old = digest_of("hello");
    let outcome = Ok(probe_result("http://a", "world"));
    let event = classify("A", "http://a", Some(&old), &outcome);

    assert_eq!(event.status, ChangeStatus::Changed);
    assert_eq!(event.status_text(), "Content Changed");
    assert_eq!(
        event.detail,
        format!(
            "Old: {}... -> New: {}...",
            &digest_of("hello")[..8],
            &digest_of("world")[..8]
        )
    );
}

#[test]
fn test_classify_unchanged() {
    let old = digest_of("hello");
    let outcome = Ok(probe_result("http://a", "hello"));
    let event = classify("A", "http://a", Some(&old), &outcome);

    assert_eq!(event.status, ChangeStatus::Unchanged);
}

#[test]
fn test_classify_error() {
    let outcome: ProbeOutcome<ProbeResult> = Err(ProbeError::HttpStatus(500));
    let event = classify("A", "http://a", Some("deadbeef"), &outcome);

    assert_eq!(event.status, ChangeStatus::Error);
    assert_eq!(event.status_text(), "Error: HTTP status 500");
    assert_eq!(event.detail, "N/A");
}

#[test]
fn test_classify_timestamp_is_rfc3339() {
    let outcome = Ok(probe_result("http://a", "hello"));
    let event = classify("A", "http://a", None, &outcome);

    assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp).is_ok());
}

// ============================================================================
// Pipeline tests
// ============================================================================

#[tokio::test]
async fn test_initial_then_unchanged() {
    let targets = vec![target("A", "http://a")];
    let probe = ScriptedProbe::new(&[("http://a", &[Script::Body("hello"), Script::Body("hello")])]);

    let run1 = execute_check(&probe, &targets, &HashRecord::new(), &no_pause(), None).await;
    assert_eq!(run1.events.len(), 1);
    assert_eq!(run1.events[0].status, ChangeStatus::Initial);
    assert_eq!(run1.hashes.get("A"), Some(&digest_of("hello")));

    let run2 = execute_check(&probe, &targets, &run1.hashes, &no_pause(), None).await;
    assert_eq!(run2.events[0].status, ChangeStatus::Unchanged);
    assert!(run2.reportable_events().is_empty());
    assert_eq!(run2.hashes.get("A"), Some(&digest_of("hello")));
}

#[tokio::test]
async fn test_changed_updates_store() {
    let targets = vec![target("A", "http://a")];
    let probe = ScriptedProbe::new(&[("http://a", &[Script::Body("world")])]);

    let mut previous = HashRecord::new();
    previous.insert("A".to_string(), digest_of("hello"));

    let outcome = execute_check(&probe, &targets, &previous, &no_pause(), None).await;

    assert_eq!(outcome.events[0].status, ChangeStatus::Changed);
    assert_eq!(outcome.hashes.get("A"), Some(&digest_of("world")));
}

#[tokio::test]
async fn test_unchanged_emits_no_report_event() {
    let targets = vec![target("A", "http://a")];
    let probe = ScriptedProbe::new(&[("http://a", &[Script::Body("hello")])]);

    let mut previous = HashRecord::new();
    previous.insert("A".to_string(), digest_of("hello"));

    let outcome = execute_check(&probe, &targets, &previous, &no_pause(), None).await;

    assert!(outcome.reportable_events().is_empty());
    assert_eq!(outcome.hashes, previous);
}

#[tokio::test]
async fn test_error_preserves_prior_digest() {
    let targets = vec![target("A", "http://a")];
    let probe = ScriptedProbe::new(&[("http://a", &[Script::Status(500)])]);

    let mut previous = HashRecord::new();
    previous.insert("A".to_string(), digest_of("hello"));

    let outcome = execute_check(&probe, &targets, &previous, &no_pause(), None).await;

    assert_eq!(outcome.events[0].status, ChangeStatus::Error);
    // A failed fetch never overwrites or erases prior history.
    assert_eq!(outcome.hashes.get("A"), Some(&digest_of("hello")));

    let reportable = outcome.reportable_events();
    assert_eq!(reportable.len(), 1);
    assert_eq!(reportable[0].status_text(), "Error: HTTP status 500");
}

#[tokio::test]
async fn test_error_never_persists_unmeasured_target() {
    let targets = vec![target("A", "http://a")];
    let probe = ScriptedProbe::new(&[("http://a", &[Script::Status(503)])]);

    let outcome = execute_check(&probe, &targets, &HashRecord::new(), &no_pause(), None).await;

    // A target that errors on every run never gets a persisted digest.
    assert!(outcome.hashes.get("A").is_none());
}

#[tokio::test]
async fn test_idempotence_across_runs() {
    let targets = vec![target("A", "http://a"), target("B", "http://b")];
    let probe = ScriptedProbe::new(&[
        ("http://a", &[Script::Body("aaa"), Script::Body("aaa")]),
        ("http://b", &[Script::Body("bbb"), Script::Body("bbb")]),
    ]);

    let run1 = execute_check(&probe, &targets, &HashRecord::new(), &no_pause(), None).await;
    let run2 = execute_check(&probe, &targets, &run1.hashes, &no_pause(), None).await;

    assert!(run2.reportable_events().is_empty());
    assert_eq!(run2.hashes, run1.hashes);
}

#[tokio::test]
async fn test_changed_reported_after_transient_error() {
    // A transient error right after a real change: the next successful run
    // still compares against the pre-change digest and reports Changed.
    let targets = vec![target("A", "http://a")];
    let probe = ScriptedProbe::new(&[(
        "http://a",
        &[
            Script::Body("before"),
            Script::Status(502),
            Script::Body("after"),
        ],
    )]);

    let run1 = execute_check(&probe, &targets, &HashRecord::new(), &no_pause(), None).await;
    assert_eq!(run1.events[0].status, ChangeStatus::Initial);

    let run2 = execute_check(&probe, &targets, &run1.hashes, &no_pause(), None).await;
    assert_eq!(run2.events[0].status, ChangeStatus::Error);
    assert_eq!(run2.hashes.get("A"), Some(&digest_of("before")));

    let run3 = execute_check(&probe, &targets, &run2.hashes, &no_pause(), None).await;
    assert_eq!(run3.events[0].status, ChangeStatus::Changed);
    assert_eq!(
        run3.events[0].detail,
        format!(
            "Old: {}... -> New: {}...",
            &digest_of("before")[..8],
            &digest_of("after")[..8]
        )
    );
    assert_eq!(run3.hashes.get("A"), Some(&digest_of("after")));
}

#[tokio::test]
async fn test_worked_example_sequence() {
    // Initial -> Unchanged -> Changed -> Error keeps the last good digest.
    let targets = vec![target("A", "http://x")];
    let probe = ScriptedProbe::new(&[(
        "http://x",
        &[
            Script::Body("hello"),
            Script::Body("hello"),
            Script::Body("world"),
            Script::Status(500),
        ],
    )]);

    let run1 = execute_check(&probe, &targets, &HashRecord::new(), &no_pause(), None).await;
    assert_eq!(run1.events[0].status, ChangeStatus::Initial);
    assert!(
        run1.events[0]
            .detail
            .contains(&digest_of("hello")[..8])
    );

    let run2 = execute_check(&probe, &targets, &run1.hashes, &no_pause(), None).await;
    assert_eq!(run2.events[0].status, ChangeStatus::Unchanged);
    assert!(run2.reportable_events().is_empty());

    let run3 = execute_check(&probe, &targets, &run2.hashes, &no_pause(), None).await;
    assert_eq!(run3.events[0].status, ChangeStatus::Changed);
    assert!(run3.events[0].detail.contains(&digest_of("hello")[..8]));
    assert!(run3.events[0].detail.contains(&digest_of("world")[..8]));

    let run4 = execute_check(&probe, &targets, &run3.hashes, &no_pause(), None).await;
    assert_eq!(run4.events[0].status, ChangeStatus::Error);
    assert_eq!(run4.hashes.get("A"), Some(&digest_of("world")));
}

#[tokio::test]
async fn test_failure_does_not_abort_remaining_targets() {
    let targets = vec![
        target("A", "http://a"),
        target("B", "http://b"),
        target("C", "http://c"),
    ];
    let probe = ScriptedProbe::new(&[
        ("http://a", &[Script::Body("aaa")]),
        ("http://b", &[Script::Status(500)]),
        ("http://c", &[Script::Body("ccc")]),
    ]);

    let outcome = execute_check(&probe, &targets, &HashRecord::new(), &no_pause(), None).await;

    assert_eq!(outcome.events.len(), 3);
    assert_eq!(outcome.events[0].status, ChangeStatus::Initial);
    assert_eq!(outcome.events[1].status, ChangeStatus::Error);
    assert_eq!(outcome.events[2].status, ChangeStatus::Initial);
    assert_eq!(outcome.hashes.len(), 2);
}

#[tokio::test]
async fn test_report_events_preserve_declared_order() {
    let targets = vec![
        target("first", "http://1"),
        target("second", "http://2"),
        target("third", "http://3"),
    ];
    let probe = ScriptedProbe::new(&[
        ("http://1", &[Script::Body("one")]),
        ("http://2", &[Script::Body("unchanged")]),
        ("http://3", &[Script::Status(404)]),
    ]);

    let mut previous = HashRecord::new();
    previous.insert("second".to_string(), digest_of("unchanged"));

    let outcome = execute_check(&probe, &targets, &previous, &no_pause(), None).await;

    let reportable = outcome.reportable_events();
    let names: Vec<&str> = reportable.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["first", "third"]);
}

#[tokio::test]
async fn test_event_callback_sees_every_classification() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let targets = vec![target("A", "http://a"), target("B", "http://b")];
    let probe = ScriptedProbe::new(&[
        ("http://a", &[Script::Body("aaa")]),
        ("http://b", &[Script::Status(500)]),
    ]);

    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    let callback: buoy_core::check::EventCallback = Arc::new(move |_event| {
        seen_clone.fetch_add(1, Ordering::Relaxed);
    });

    execute_check(
        &probe,
        &targets,
        &HashRecord::new(),
        &no_pause(),
        Some(callback),
    )
    .await;

    assert_eq!(seen.load(Ordering::Relaxed), 2);
}

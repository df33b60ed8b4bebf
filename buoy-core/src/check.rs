use crate::config::Target;
use crate::store::HashRecord;
use buoy_probe::error::Result as ProbeOutcome;
use buoy_probe::{ContentProbe, ProbeResult};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options for configuring a monitoring pass
pub struct CheckOptions {
    /// Pause inserted after each target, regardless of outcome.
    pub pause: Duration,
    pub show_progress: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            show_progress: false,
        }
    }
}

/// Per-target classification for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeStatus {
    Initial,
    Changed,
    Unchanged,
    Error,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Initial => "Initial Check (No history recorded)",
            ChangeStatus::Changed => "Content Changed",
            ChangeStatus::Unchanged => "Unchanged",
            ChangeStatus::Error => "Error",
        }
    }
}

/// One reportable outcome for a target in a given run. Never persisted;
/// only the report and the console see these.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub name: String,
    pub url: String,
    /// RFC 3339 classification time.
    pub timestamp: String,
    pub status: ChangeStatus,
    /// Probe failure message, set only for `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable digest-change or error description.
    pub detail: String,
}

impl ChangeEvent {
    /// Status line as it appears in the report.
    pub fn status_text(&self) -> String {
        match (&self.status, &self.error) {
            (ChangeStatus::Error, Some(msg)) => format!("Error: {}", msg),
            _ => self.status.as_str().to_string(),
        }
    }
}

/// Result of one monitoring pass
pub struct CheckOutcome {
    /// Every classification, in target order (Unchanged included).
    pub events: Vec<ChangeEvent>,
    /// The digest mapping to persist at the end of the run.
    pub hashes: HashRecord,
}

impl CheckOutcome {
    /// Events that belong in the report: target order, Unchanged filtered out.
    pub fn reportable_events(&self) -> Vec<&ChangeEvent> {
        self.events
            .iter()
            .filter(|e| e.status != ChangeStatus::Unchanged)
            .collect()
    }
}

/// Callback for reporting individual classifications as they come in
pub type EventCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

fn short_digest(digest: &str) -> &str {
    &digest[..digest.len().min(8)]
}

/// Classify one probe outcome against the previously recorded digest.
///
/// A failed probe classifies as `Error` and never participates in hash
/// comparison; the caller must leave any prior digest for the target intact.
pub fn classify(
    name: &str,
    url: &str,
    previous: Option<&str>,
    outcome: &ProbeOutcome<ProbeResult>,
) -> ChangeEvent {
    let timestamp = Local::now().to_rfc3339();

    match outcome {
        Err(e) => ChangeEvent {
            name: name.to_string(),
            url: url.to_string(),
            timestamp,
            status: ChangeStatus::Error,
            error: Some(e.to_string()),
            detail: "N/A".to_string(),
        },
        Ok(result) => match previous {
            None => ChangeEvent {
                name: name.to_string(),
                url: url.to_string(),
                timestamp,
                status: ChangeStatus::Initial,
                error: None,
                detail: format!("Initial Hash: {}...", short_digest(&result.digest)),
            },
            Some(old) if old != result.digest => ChangeEvent {
                name: name.to_string(),
                url: url.to_string(),
                timestamp,
                status: ChangeStatus::Changed,
                error: None,
                detail: format!(
                    "Old: {}... -> New: {}...",
                    short_digest(old),
                    short_digest(&result.digest)
                ),
            },
            Some(_) => ChangeEvent {
                name: name.to_string(),
                url: url.to_string(),
                timestamp,
                status: ChangeStatus::Unchanged,
                error: None,
                detail: format!("Hash: {}...", short_digest(&result.digest)),
            },
        },
    }
}

/// Execute one monitoring pass over the targets, strictly in order.
///
/// Each target is fully processed (request + hash + pause) before the next
/// begins. Probe failures never abort the remaining targets, and never
/// overwrite a previously recorded digest.
pub async fn execute_check(
    probe: &dyn ContentProbe,
    targets: &[Target],
    previous: &HashRecord,
    options: &CheckOptions,
    event_callback: Option<EventCallback>,
) -> CheckOutcome {
    info!("Starting check of {} target(s)", targets.len());

    let spinner = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut events = Vec::with_capacity(targets.len());
    let mut hashes = previous.clone();

    for (idx, target) in targets.iter().enumerate() {
        if let Some(ref pb) = spinner {
            pb.set_message(format!(
                "Checking {}/{}: {}",
                idx + 1,
                targets.len(),
                target.name
            ));
        }

        let outcome = probe.probe(&target.url).await;

        let event = classify(
            &target.name,
            &target.url,
            hashes.get(&target.name).map(String::as_str),
            &outcome,
        );

        match &outcome {
            Ok(result) => {
                debug!(
                    "{}: {} ({} bytes, status {})",
                    target.name, event.status.as_str(), result.content_length, result.status_code
                );
                hashes.insert(target.name.clone(), result.digest.clone());
            }
            Err(e) => {
                warn!("Probe failed for {} ({}): {}", target.name, target.url, e);
            }
        }

        if let Some(ref callback) = event_callback {
            match spinner {
                Some(ref pb) => pb.suspend(|| callback(&event)),
                None => callback(&event),
            }
        }

        events.push(event);

        if options.pause > Duration::ZERO {
            tokio::time::sleep(options.pause).await;
        }
    }

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!("Check complete: {} target(s) processed", targets.len()));
    }

    CheckOutcome { events, hashes }
}

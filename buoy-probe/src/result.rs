use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one successful probe: the content digest plus response metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    /// Lowercase SHA-256 hex over the exact response body bytes.
    pub digest: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub content_length: u64,
    pub response_time: Duration,
}

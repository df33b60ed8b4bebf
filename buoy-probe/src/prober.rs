use crate::error::{ProbeError, Result};
use crate::result::ProbeResult;
use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Anything that can turn a URL into a content digest.
///
/// The check pipeline only sees this trait, so tests can drive it with canned
/// outcomes instead of live HTTP.
#[async_trait]
pub trait ContentProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ProbeResult>;
}

/// Reqwest-backed prober. One shared client per run; no retries.
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new() -> Self {
        Self::with_timeout(15)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Buoy/0.1 (content change monitor)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs((timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl ContentProbe for Prober {
    /// GET the URL and hash the exact body bytes. Any non-2xx status is a
    /// failure, same as a connection error or timeout.
    async fn probe(&self, url: &str) -> Result<ProbeResult> {
        let parsed =
            Url::parse(url).map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Probing {}", parsed);

        let start = Instant::now();
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await?;
        let response_time = start.elapsed();

        let mut hasher = Sha256::new();
        hasher.update(&body);
        let digest = format!("{:x}", hasher.finalize());

        Ok(ProbeResult {
            url: url.to_string(),
            digest,
            status_code: status.as_u16(),
            content_type,
            content_length: body.len() as u64,
            response_time,
        })
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

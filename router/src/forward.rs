//! Outbound HTTP: envelope delivery with retry, liveness probes, and
//! violation notices.
//!
//! Envelope posts retry up to three times with a linearly increasing delay
//! before the failure becomes fatal. Liveness probes and violation notices
//! are single-shot: the startup barrier supplies its own retry rounds, and
//! violation fan-out is best effort by design.

use crate::RouterError;
use std::time::Duration;
use switchboard_types::Envelope;
use tracing::{debug, warn};

/// Retry behaviour for envelope delivery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before the failure is fatal.
    pub max_attempts: u32,
    /// Base delay; attempt n waits n times this.
    pub delay_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_unit: Duration::from_secs(4),
        }
    }
}

/// HTTP client for all traffic a router originates.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Forwarder {
    /// Create a forwarder with the given retry policy.
    pub fn new(retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, retry })
    }

    /// Deliver an envelope to a participant's base URL, retrying on failure.
    pub async fn post_envelope(
        &self,
        peer: &str,
        base_url: &str,
        envelope: &Envelope,
    ) -> Result<(), RouterError> {
        let mut attempt = 1;
        loop {
            let result = self
                .client
                .post(base_url)
                .json(envelope)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);
            match result {
                Ok(_) => {
                    debug!(peer, attempt, "envelope delivered");
                    return Ok(());
                }
                Err(source) if attempt >= self.retry.max_attempts => {
                    return Err(RouterError::Transport {
                        peer: peer.to_string(),
                        source,
                    });
                }
                Err(error) => {
                    warn!(peer, attempt, %error, "delivery failed, retrying");
                    tokio::time::sleep(self.retry.delay_unit * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Probe a liveness endpoint once. `Ok` means the target answered 2xx
    /// within the timeout.
    pub async fn probe_alive(&self, base_url: &str, timeout: Duration) -> bool {
        let url = format!("{}/api/alive", base_url.trim_end_matches('/'));
        matches!(
            self.client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status),
            Ok(_)
        )
    }

    /// Signal a wrapped party that transmission may begin.
    pub async fn post_commence(&self, peer: &str, base_url: &str) -> Result<(), RouterError> {
        let url = format!("{}/api/alive", base_url.trim_end_matches('/'));
        self.client
            .post(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map(|_| ())
            .map_err(|source| RouterError::Transport {
                peer: peer.to_string(),
                source,
            })
    }

    /// Best-effort violation notice; failures are logged and swallowed.
    pub async fn post_violation(&self, peer: &str, base_url: &str) {
        let url = format!("{}/api/violation", base_url.trim_end_matches('/'));
        if let Err(error) = self.client.post(url).send().await {
            warn!(peer, %error, "could not deliver violation notice");
        }
    }
}

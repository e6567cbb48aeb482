//! Polling loop that turns a server-side job into a synchronous result.
//!
//! Each attempt asks the status endpoint for the payload, then falls back to
//! fetching the asset from the CDN. Every non-fatal error inside the window
//! is logged and retried; when the attempt budget runs out the caller gets
//! [`InlinerError::Timeout`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::InlinerConfig;
use crate::error::{InlinerError, Result};
use crate::result::{wrap, Payload};
use crate::transport::{Transport, TransportRequest};
use crate::types::GenerationResult;

/// Result of a single polling attempt.
#[derive(Debug)]
pub enum PollOutcome {
    /// The image is available.
    Ready(GenerationResult),
    /// The job is still running.
    Pending,
    /// Something failed this attempt; try again next time.
    TransientError(InlinerError),
    /// Stop polling and surface this error.
    Fatal(InlinerError),
}

/// Polls one content path until ready, timed out, or cancelled.
pub struct Poller<'a> {
    transport: &'a dyn Transport,
    config: &'a InlinerConfig,
    cancellation: Option<Arc<AtomicBool>>,
}

impl<'a> Poller<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a InlinerConfig) -> Self {
        Self {
            transport,
            config,
            cancellation: None,
        }
    }

    /// Abort the loop once `flag` is set. Checked before every attempt.
    pub fn with_cancellation(mut self, flag: Option<Arc<AtomicBool>>) -> Self {
        self.cancellation = flag;
        self
    }

    fn check_cancelled(&self, label: &str) -> Result<()> {
        if let Some(ref cancel) = self.cancellation {
            if cancel.load(Ordering::Relaxed) {
                return Err(InlinerError::Cancelled {
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Run up to `floor(max_seconds / interval)` attempts, sleeping between
    /// them but not after the last one.
    pub async fn poll(
        &self,
        content_path: &str,
        label: &str,
        max_seconds: u64,
    ) -> Result<GenerationResult> {
        let content_path = content_path.trim_start_matches('/');
        let max_attempts = self.config.max_attempts(max_seconds);

        for attempt in 1..=max_attempts {
            self.check_cancelled(label)?;

            match self.attempt(content_path).await {
                PollOutcome::Ready(result) => {
                    info!(content_path, attempt, label, "image ready");
                    return Ok(result);
                }
                PollOutcome::Pending => {
                    debug!(content_path, attempt, max_attempts, label, "still processing");
                }
                PollOutcome::TransientError(e) => {
                    warn!(content_path, attempt, max_attempts, label, error = %e, "poll attempt failed, retrying");
                }
                PollOutcome::Fatal(e) => return Err(e),
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        Err(InlinerError::Timeout {
            label: label.to_string(),
            max_seconds,
        })
    }

    /// One status check plus CDN fallback.
    pub async fn attempt(&self, content_path: &str) -> PollOutcome {
        let mut last_error = None;

        match self.check_status(content_path).await {
            Ok(Some(result)) => return PollOutcome::Ready(result),
            Ok(None) => {}
            Err(e) if e.is_fatal() => return PollOutcome::Fatal(e),
            Err(e) => {
                debug!(content_path, error = %e, "status check failed, trying CDN");
                last_error = Some(e);
            }
        }

        match self.check_cdn(content_path).await {
            Ok(Some(result)) => PollOutcome::Ready(result),
            Ok(None) => match last_error {
                Some(e) => PollOutcome::TransientError(e),
                None => PollOutcome::Pending,
            },
            Err(e) if e.is_fatal() => PollOutcome::Fatal(e),
            Err(e) => PollOutcome::TransientError(e),
        }
    }

    async fn check_status(&self, content_path: &str) -> Result<Option<GenerationResult>> {
        let url = self
            .config
            .api_url(&format!("content/request-json/{}", content_path));
        let resp = self
            .transport
            .send(TransportRequest::get(url).bearer(&self.config.api_key))
            .await?;

        if resp.status == 202 {
            return Ok(None);
        }

        let json: Value = resp.json()?;
        match extract_payload(&json) {
            Some(payload) => Ok(Some(wrap(
                self.config,
                Payload::Text(payload.to_string()),
                content_path,
            )?)),
            None => Ok(None),
        }
    }

    async fn check_cdn(&self, content_path: &str) -> Result<Option<GenerationResult>> {
        let url = self.config.image_url(content_path);
        let resp = match self.transport.send(TransportRequest::get(url.clone())).await {
            Ok(resp) => resp,
            // Not rendered yet
            Err(InlinerError::Http { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if resp.status != 200 || resp.body.is_empty() {
            return Ok(None);
        }

        Ok(Some(GenerationResult {
            data: resp.body,
            url,
            content_path: content_path.to_string(),
        }))
    }
}

/// Image payload carried inline in a JSON response, if any.
pub(crate) fn extract_payload(json: &Value) -> Option<&str> {
    ["data", "image"]
        .iter()
        .filter_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
}

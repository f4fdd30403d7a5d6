//! Control-plane client.
//!
//! Two endpoints, both best-effort: `GET /api/rules` for the active rule set
//! and `POST /api/traffic` for telemetry. The client is built with ambient
//! proxy configuration disabled — the control plane sits on loopback, and a
//! call routed through the system proxy would re-enter the very interception
//! path this addon runs inside and recurse. Timeouts are short so an absent
//! control plane can never stall a flow for longer than one second.

use crate::config::AddonConfig;
use crate::event::TrafficEvent;
use crate::rules::MockRule;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on any single control-plane call.
pub const CONTROL_PLANE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect failure, timeout, or a malformed JSON payload.
    #[error("control plane request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Reachable but unhappy control plane.
    #[error("control plane returned status {0}")]
    Status(u16),
}

pub struct ControlPlaneClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControlPlaneClient {
    pub fn new(config: &AddonConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(CONTROL_PLANE_TIMEOUT)
            .build()?;
        Ok(ControlPlaneClient {
            http,
            base_url: config.control_plane_base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the ordered rule set. Every failure mode is a [`TransportError`]
    /// the caller swallows exactly once, at the cache boundary.
    pub async fn fetch_rules(&self) -> Result<Vec<MockRule>, TransportError> {
        let response = self
            .http
            .get(format!("{}/api/rules", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Deliver one telemetry event. No retry; a non-2xx answer is an error
    /// only so tests can observe it.
    pub async fn post_event(&self, event: &TrafficEvent) -> Result<(), TransportError> {
        let response = self
            .http
            .post(format!("{}/api/traffic", self.base_url))
            .json(event)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        Ok(())
    }

    /// Fire-and-forget delivery: the POST runs as a detached task the caller
    /// never waits on. Failures are dropped, and the task itself may be
    /// dropped at shutdown — the control plane is optional infrastructure.
    pub fn send_event(self: &Arc<Self>, event: TrafficEvent) {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let _ = client.post_event(&event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::normalize_http;
    use crate::flow::{Flow, FlowRequest};
    use std::collections::HashMap;

    fn unreachable_client() -> Arc<ControlPlaneClient> {
        // Port 9 (discard) is not listening in the test environment
        Arc::new(ControlPlaneClient::new(&AddonConfig::new(9)).unwrap())
    }

    fn flow() -> Flow {
        Flow::new(
            "f1",
            FlowRequest {
                method: "GET".to_string(),
                url: "http://x/".to_string(),
                host: "x".to_string(),
                path: "/".to_string(),
                headers: HashMap::new(),
                body: None,
                timestamp_start: None,
            },
        )
    }

    #[test]
    fn test_base_url_from_config() {
        let client = ControlPlaneClient::new(&AddonConfig::new(4521)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:4521");
    }

    #[tokio::test]
    async fn test_fetch_rules_unreachable_is_error_not_panic() {
        let client = unreachable_client();
        assert!(client.fetch_rules().await.is_err());
    }

    #[tokio::test]
    async fn test_send_event_unreachable_is_silent() {
        let client = unreachable_client();
        client.send_event(normalize_http(&flow(), 0.0));
        // Nothing to observe: the task is detached and its failure dropped.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

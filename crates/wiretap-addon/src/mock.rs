//! Mock response synthesis.

use crate::flow::{Flow, FlowResponse};
use crate::rules::MockRule;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// Build the synthetic response described by a rule. String bodies are
/// encoded as-is; structured bodies are serialized to their JSON text.
pub fn synthesize(rule: &MockRule) -> MockResponse {
    let body = match &rule.body {
        Value::String(text) => text.clone(),
        value => value.to_string(),
    };

    MockResponse {
        status: rule.status_code,
        headers: rule.headers.clone(),
        body: Bytes::from(body),
    }
}

/// Suspend the current flow's hook invocation for the rule's artificial
/// latency. Blocks only this invocation; no extra tasks are spawned, so the
/// host's concurrency model decides whether other flows are affected.
pub async fn apply_delay(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Install a synthesized response on the flow and stamp the metadata the
/// normalizer reports later. Short-circuits upstream forwarding.
pub fn install(flow: &mut Flow, rule: &MockRule, response: MockResponse) {
    flow.response = Some(FlowResponse {
        status: response.status,
        reason: reason_phrase(response.status).to_string(),
        headers: response.headers,
        body: Some(response.body),
        timestamp_end: None,
    });
    flow.metadata.mocked = true;
    flow.metadata.rule_id = Some(rule.id.clone());
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        418 => "I'm a teapot",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowRequest;
    use std::time::Instant;

    fn rule(json: &str) -> MockRule {
        serde_json::from_str(json).unwrap()
    }

    fn request() -> FlowRequest {
        FlowRequest {
            method: "GET".to_string(),
            url: "http://x/api/users/1".to_string(),
            host: "x".to_string(),
            path: "/api/users/1".to_string(),
            headers: HashMap::new(),
            body: None,
            timestamp_start: None,
        }
    }

    #[test]
    fn test_structured_body_serialized_to_json_text() {
        let rule = rule(r#"{"id": "r1", "urlPattern": "*", "body": {"ok": true}}"#);
        let response = synthesize(&rule);
        assert_eq!(response.body, Bytes::from(r#"{"ok":true}"#));
    }

    #[test]
    fn test_string_body_passes_through() {
        let rule = rule(r#"{"id": "r1", "urlPattern": "*", "body": "plain text"}"#);
        let response = synthesize(&rule);
        assert_eq!(response.body, Bytes::from("plain text"));
    }

    #[test]
    fn test_default_headers_and_status() {
        let rule = rule(r#"{"id": "r1", "urlPattern": "*"}"#);
        let response = synthesize(&rule);
        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_install_stamps_flow_metadata() {
        let rule = rule(r#"{"id": "rule-42", "urlPattern": "*", "statusCode": 201}"#);
        let mut flow = Flow::new("f1", request());

        install(&mut flow, &rule, synthesize(&rule));

        assert!(flow.metadata.mocked);
        assert_eq!(flow.metadata.rule_id.as_deref(), Some("rule-42"));
        let response = flow.response.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.reason, "Created");
    }

    #[tokio::test]
    async fn test_apply_delay_suspends() {
        let started = Instant::now();
        apply_delay(50).await;
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let started = Instant::now();
        apply_delay(0).await;
        assert!(started.elapsed() < Duration::from_millis(20));
    }
}

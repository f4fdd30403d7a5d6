//! Traffic event normalization.
//!
//! Every observed exchange is flattened into one [`TrafficEvent`] in the
//! wire shape the control plane expects: camelCase keys, nullable
//! request/response bodies, and an optional nested response record. Four
//! normalizers cover the hook kinds (HTTP response phase, WebSocket open /
//! message / close); all of them share the same payload-safety rules.

use crate::flow::{Flow, WsMessage};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bodies larger than this are replaced by a size placeholder, never sent.
pub const MAX_BODY_BYTES: usize = 50_000;

/// Content-type marker reported for binary WebSocket frames.
pub const BINARY_CONTENT_TYPE: &str = "binary/protobuf";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficEvent {
    pub id: String,
    /// Epoch seconds.
    pub timestamp: f64,
    /// `"websocket"` for WS events; absent for plain HTTP.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// WS lifecycle: open, message, close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub method: String,
    pub url: String,
    pub host: String,
    pub path: String,
    pub request_headers: HashMap<String, String>,
    pub request_body: Option<String>,
    pub mocked: bool,
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseInfo>,
    /// Milliseconds, rounded to 2 decimals. Only present when both request
    /// start and response end timestamps were observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub status: u16,
    pub reason: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub size: u64,
}

/// HTTP response-phase event: real or mocked, the shape is identical.
pub fn normalize_http(flow: &Flow, now: f64) -> TrafficEvent {
    let response = flow.response.as_ref().map(|res| ResponseInfo {
        status: res.status,
        reason: res.reason.clone(),
        headers: res.headers.clone(),
        body: safe_decode(res.body.as_deref()),
        size: res.body.as_ref().map(|b| b.len() as u64).unwrap_or(0),
    });

    let duration = match (
        flow.request.timestamp_start,
        flow.response.as_ref().and_then(|r| r.timestamp_end),
    ) {
        (Some(start), Some(end)) => Some(round2((end - start) * 1000.0)),
        _ => None,
    };

    TrafficEvent {
        id: flow.id.clone(),
        timestamp: now,
        kind: None,
        event: None,
        method: flow.request.method.clone(),
        url: flow.request.url.clone(),
        host: flow.request.host.clone(),
        path: flow.request.path.clone(),
        request_headers: flow.request.headers.clone(),
        request_body: safe_decode(flow.request.body.as_deref()),
        mocked: flow.metadata.mocked,
        rule_id: flow.metadata.rule_id.clone(),
        response,
        duration,
    }
}

/// Synthetic event for a completed WebSocket handshake.
pub fn normalize_ws_open(flow: &Flow, now: f64) -> TrafficEvent {
    let upgrade_headers = flow
        .response
        .as_ref()
        .map(|res| res.headers.clone())
        .unwrap_or_default();

    TrafficEvent {
        id: format!("ws-{}", flow.id),
        timestamp: now,
        kind: Some("websocket".to_string()),
        event: Some("open".to_string()),
        method: "WS".to_string(),
        url: websocket_url(&flow.request.url),
        host: flow.request.host.clone(),
        path: flow.request.path.clone(),
        request_headers: flow.request.headers.clone(),
        request_body: None,
        mocked: false,
        rule_id: None,
        response: Some(ResponseInfo {
            status: 101,
            reason: "Switching Protocols".to_string(),
            headers: upgrade_headers,
            body: Some("[WebSocket Connected]".to_string()),
            size: 0,
        }),
        duration: None,
    }
}

/// One event per WebSocket frame. `seq` is the running message count on the
/// connection, used only to keep event ids unique.
pub fn normalize_ws_message(
    flow: &Flow,
    message: &WsMessage,
    seq: usize,
    now: f64,
) -> TrafficEvent {
    let direction = if message.from_client { "→" } else { "←" };
    let transfer = if message.from_client { "sent" } else { "received" };

    let (content, content_type) = if message.is_text {
        (
            String::from_utf8_lossy(&message.content).into_owned(),
            "text",
        )
    } else {
        // Binary frames (Protobuf and friends) travel base64-encoded so the
        // receiver can display and copy them.
        (BASE64.encode(&message.content), BINARY_CONTENT_TYPE)
    };

    // Informational metadata, not real HTTP headers: both sides carry
    // direction, classification, and frame size.
    let mut frame_headers = HashMap::new();
    frame_headers.insert("Direction".to_string(), transfer.to_string());
    frame_headers.insert("Content-Type".to_string(), content_type.to_string());
    frame_headers.insert(
        "Size".to_string(),
        format!("{} bytes", message.content.len()),
    );

    let (request_body, response_body) = if message.from_client {
        (Some(content), None)
    } else {
        (None, Some(content))
    };

    TrafficEvent {
        id: format!("ws-msg-{}-{}", flow.id, seq),
        timestamp: now,
        kind: Some("websocket".to_string()),
        event: Some("message".to_string()),
        method: format!("WS {direction}"),
        url: websocket_url(&flow.request.url),
        host: flow.request.host.clone(),
        path: flow.request.path.clone(),
        request_headers: frame_headers.clone(),
        request_body,
        mocked: false,
        rule_id: None,
        response: Some(ResponseInfo {
            status: 0,
            reason: transfer.to_string(),
            headers: frame_headers,
            body: response_body,
            size: message.content.len() as u64,
        }),
        duration: Some(0.0),
    }
}

/// Synthetic event for a closed WebSocket connection.
pub fn normalize_ws_close(flow: &Flow, now: f64) -> TrafficEvent {
    TrafficEvent {
        id: format!("ws-close-{}", flow.id),
        timestamp: now,
        kind: Some("websocket".to_string()),
        event: Some("close".to_string()),
        method: "WS ✕".to_string(),
        url: websocket_url(&flow.request.url),
        host: flow.request.host.clone(),
        path: flow.request.path.clone(),
        request_headers: HashMap::new(),
        request_body: None,
        mocked: false,
        rule_id: None,
        response: Some(ResponseInfo {
            status: 0,
            reason: "Connection Closed".to_string(),
            headers: HashMap::new(),
            body: Some("[WebSocket Closed]".to_string()),
            size: 0,
        }),
        duration: None,
    }
}

/// Decode body bytes into something safe to put on the wire.
///
/// Empty or absent content is null. Oversized content becomes a placeholder
/// naming its length. Otherwise UTF-8, falling back to a byte-per-character
/// (latin-1) decode; that fallback is total, so content is never dropped
/// without at least a placeholder or lossy text standing in for it.
pub fn safe_decode(content: Option<&[u8]>) -> Option<String> {
    let content = content?;
    if content.is_empty() {
        return None;
    }

    if content.len() > MAX_BODY_BYTES {
        return Some(format!("[Content too large: {} bytes]", content.len()));
    }

    match std::str::from_utf8(content) {
        Ok(text) => Some(text.to_string()),
        Err(_) => Some(content.iter().map(|&b| b as char).collect()),
    }
}

/// Rewrite the request URL scheme for WebSocket events.
fn websocket_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Host-boundary flow types.
//!
//! The host proxy owns one [`Flow`] per intercepted exchange (or WebSocket
//! connection) and passes it to the hook methods. This crate only reads the
//! request/response/frame data, and writes back a synthesized response plus
//! the `mocked`/`rule_id` metadata when a rule fires.

use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Flow {
    /// Host-assigned flow identifier, used for telemetry correlation only.
    pub id: String,
    pub request: FlowRequest,
    pub response: Option<FlowResponse>,
    /// Present for WebSocket flows; the message hook inspects the most
    /// recently appended frame.
    pub websocket: Option<WebSocketState>,
    pub metadata: FlowMetadata,
}

impl Flow {
    pub fn new(id: impl Into<String>, request: FlowRequest) -> Self {
        Flow {
            id: id.into(),
            request,
            response: None,
            websocket: None,
            metadata: FlowMetadata::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowRequest {
    pub method: String,
    pub url: String,
    pub host: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Epoch seconds when the request started, if the host tracks it.
    pub timestamp_start: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FlowResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Epoch seconds when the response completed, if the host tracks it.
    pub timestamp_end: Option<f64>,
}

/// Per-flow state written by the mock synthesizer and read back by the
/// normalizer when the response-phase hook fires.
#[derive(Debug, Clone, Default)]
pub struct FlowMetadata {
    pub mocked: bool,
    pub rule_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WebSocketState {
    pub messages: Vec<WsMessage>,
}

#[derive(Debug, Clone)]
pub struct WsMessage {
    pub from_client: bool,
    pub is_text: bool,
    pub content: Bytes,
}

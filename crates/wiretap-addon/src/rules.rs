//! Mock rule wire model.
//!
//! Rules are fetched from the control plane as an ordered JSON array; the
//! order is significant (first match wins) and must survive deserialization.
//! Optional fields carry their defaults here, at the serde boundary, so the
//! matching and synthesis code never re-derives them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockRule {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "urlPattern")]
    pub url_pattern: String,
    #[serde(default, rename = "urlPatternType")]
    pub url_pattern_type: UrlPatternType,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_status_code", rename = "statusCode")]
    pub status_code: u16,
    #[serde(default = "default_headers")]
    pub headers: HashMap<String, String>,
    /// String or structured JSON; structured bodies are serialized to text
    /// at synthesis time.
    #[serde(default = "default_body")]
    pub body: Value,
    /// Artificial latency in milliseconds, applied before the mock response
    /// is installed.
    #[serde(default)]
    pub delay: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlPatternType {
    Exact,
    #[default]
    Wildcard,
    Regex,
    /// Pattern types introduced by a newer control plane. Never matches.
    #[serde(other)]
    Unknown,
}

fn default_enabled() -> bool {
    true
}

fn default_method() -> String {
    "ANY".to_string()
}

fn default_status_code() -> u16 {
    200
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

fn default_body() -> Value {
    Value::Object(serde_json::Map::new())
}

//! Addon configuration.
//!
//! A single knob: the port the control plane listens on. Everything else is
//! data-driven by the fetched rule set.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Environment variable consulted by [`AddonConfig::from_env`].
pub const SERVER_PORT_ENV: &str = "WIRETAP_SERVER_PORT";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddonConfig {
    /// Port where the control plane (rules + traffic sink) is running.
    #[serde(default = "default_server_port", rename = "serverPort")]
    pub server_port: u16,
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

impl Default for AddonConfig {
    fn default() -> Self {
        AddonConfig {
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl AddonConfig {
    pub fn new(server_port: u16) -> Self {
        AddonConfig { server_port }
    }

    /// Read the control-plane port from the environment, defaulting when the
    /// variable is absent. A present-but-malformed value is a startup error.
    pub fn from_env() -> Result<Self> {
        match std::env::var(SERVER_PORT_ENV) {
            Ok(raw) => {
                let port = raw
                    .parse::<u16>()
                    .with_context(|| format!("invalid {SERVER_PORT_ENV} value: {raw:?}"))?;
                Ok(AddonConfig { server_port: port })
            }
            Err(_) => Ok(AddonConfig::default()),
        }
    }

    /// Base URL of the control plane. Always loopback; outbound calls to it
    /// must never route through the proxy this addon runs inside.
    pub fn control_plane_base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.server_port)
    }
}

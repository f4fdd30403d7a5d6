//! Data-path plugin for an intercepting proxy.
//!
//! The host proxy terminates connections and invokes the hook methods on
//! [`addon::InterceptAddon`] once per flow event. This crate decides whether
//! a request should be answered from a server-defined mock rule, and turns
//! every observed exchange (HTTP and WebSocket) into a normalized telemetry
//! event delivered best-effort to the control plane.

pub mod addon;
pub mod cache;
pub mod config;
pub mod event;
pub mod flow;
pub mod matcher;
pub mod mock;
pub mod resolver;
pub mod rules;
pub mod transport;

pub use addon::InterceptAddon;
pub use config::AddonConfig;
pub use flow::Flow;
pub use rules::MockRule;

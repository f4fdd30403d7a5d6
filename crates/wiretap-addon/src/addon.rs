//! Hook surface invoked by the host proxy.
//!
//! One method per lifecycle event, executing synchronously within whatever
//! invocation context the host provides. None of them may disturb the
//! traffic path: every internal failure degrades to "no mock applied" or
//! "no telemetry sent". The only intentional suspension is a rule's
//! artificial delay, which blocks just that flow's request hook.

use crate::cache::{Clock, RuleCache, SystemClock};
use crate::config::AddonConfig;
use crate::event;
use crate::flow::Flow;
use crate::mock;
use crate::resolver;
use crate::rules::MockRule;
use crate::transport::{ControlPlaneClient, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct InterceptAddon {
    client: Arc<ControlPlaneClient>,
    cache: Mutex<RuleCache>,
    clock: Arc<dyn Clock>,
}

impl InterceptAddon {
    pub fn new(config: &AddonConfig) -> Result<Self, TransportError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Construct with an injected clock, so freshness behavior is testable
    /// without real waits.
    pub fn with_clock(
        config: &AddonConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TransportError> {
        Ok(InterceptAddon {
            client: Arc::new(ControlPlaneClient::new(config)?),
            cache: Mutex::new(RuleCache::new()),
            clock,
        })
    }

    /// Request hook: decide whether to answer from a mock rule. Installing a
    /// response short-circuits upstream forwarding in the host.
    pub async fn on_request(&self, flow: &mut Flow) {
        let rules = self.get_rules().await;

        let Some(rule) =
            resolver::find_matching_rule(&rules, &flow.request.url, &flow.request.method)
        else {
            return;
        };

        mock::apply_delay(rule.delay).await;

        let response = mock::synthesize(rule);
        let status = response.status;
        mock::install(flow, rule, response);

        tracing::info!("[Mock] {} {} -> {}", flow.request.method, flow.request.url, status);
    }

    /// Response hook: the exchange (real or mocked) is final, report it.
    pub fn on_response(&self, flow: &Flow) {
        let event = event::normalize_http(flow, self.clock.now());
        self.client.send_event(event);
    }

    pub fn on_websocket_open(&self, flow: &Flow) {
        let event = event::normalize_ws_open(flow, self.clock.now());
        self.client.send_event(event);
        tracing::info!("[WebSocket] Connected: {}", flow.request.url);
    }

    /// Message hook: the host appends each frame to the flow before calling;
    /// only the most recent one is reported.
    pub fn on_websocket_message(&self, flow: &Flow) {
        let Some(ws) = flow.websocket.as_ref() else {
            return;
        };
        let Some(message) = ws.messages.last() else {
            return;
        };

        let event =
            event::normalize_ws_message(flow, message, ws.messages.len(), self.clock.now());
        self.client.send_event(event);
    }

    pub fn on_websocket_close(&self, flow: &Flow) {
        let event = event::normalize_ws_close(flow, self.clock.now());
        self.client.send_event(event);
        tracing::info!("[WebSocket] Closed: {}", flow.request.url);
    }

    /// Current rule set, refreshed when the TTL has lapsed. The freshness
    /// check and the store happen under the cache lock; the fetch itself
    /// does not, so a slow control plane never holds the lock. A redundant
    /// concurrent fetch is harmless (last store wins). On failure the stale
    /// snapshot is served and the fetch timestamp is left untouched, so the
    /// very next request retries instead of waiting out the TTL.
    async fn get_rules(&self) -> Arc<[MockRule]> {
        {
            let cache = self.cache.lock();
            if cache.fresh(self.clock.now()) {
                return cache.snapshot();
            }
        }

        match self.client.fetch_rules().await {
            Ok(rules) => {
                let mut cache = self.cache.lock();
                cache.store(rules, self.clock.now());
                cache.snapshot()
            }
            // Deliberately unlogged: the control plane is optional, and a
            // line per request would be pure noise while it is down.
            Err(_) => self.cache.lock().snapshot(),
        }
    }
}

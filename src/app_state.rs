// =============================================================================
// Central Application State
// =============================================================================
//
// Holds what outlives a single request: the runtime configuration, the
// outbound HTTP clients and a few counters for the health endpoint.  Computed
// indicator series are never stored here; each request builds and drops its
// own.
//
// Thread safety:
//   - Atomic counters for lock-free request accounting.
//   - parking_lot::RwLock around the mutable configuration.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::advisor::LlmClient;
use crate::market_data::QuoteFeedClient;
use crate::runtime_config::RuntimeConfig;

/// Shared state handed to every handler via `Arc<AppState>`.
pub struct AppState {
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub llm: LlmClient,
    pub quote_feed: QuoteFeedClient,

    /// Analyses that reached the completion step.
    pub analyses_served: AtomicU64,
    /// Analyses that failed before the completion step: unreadable CSV, quote
    /// feed failure, schema errors or the history gate.
    pub analyses_rejected: AtomicU64,

    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state from `config` and the completion API key.
    pub fn new(config: RuntimeConfig, llm_api_key: impl Into<String>) -> Self {
        let llm = LlmClient::new(llm_api_key, config.llm.base_url.clone(), config.llm.timeout_secs);
        let quote_feed =
            QuoteFeedClient::new(config.quote_feed_url.clone(), config.quote_feed_timeout_secs);

        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            llm,
            quote_feed,
            analyses_served: AtomicU64::new(0),
            analyses_rejected: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn record_served(&self) {
        self.analyses_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.analyses_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> RuntimeConfig {
        self.runtime_config.read().clone()
    }
}

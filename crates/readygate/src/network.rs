//! Network capability.
//!
//! The loader never fetches anything itself. When a `<script>` is injected
//! the page asks its [`Network`] what the browser would do with the URL:
//! complete after some latency, or never answer. Stylesheets are
//! fire-and-forget and are not reported here.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// What happens to a requested script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The script loads and signals completion after the given latency.
    Complete(Duration),
    /// No completion signal ever arrives (network error, 404, hang).
    Stalled,
}

/// Host capability deciding the fate of injected scripts.
pub trait Network {
    /// Called once per injected script element, with its full `src`.
    fn fetch(&mut self, url: &str) -> FetchOutcome;
}

/// Never completes anything on its own; the host delivers every signal
/// with [`crate::Page::signal_script`].
#[derive(Debug, Default, Clone)]
pub struct ManualNetwork {
    requested: Vec<String>,
}

impl ManualNetwork {
    /// Create a manual network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> &[String] {
        &self.requested
    }
}

impl Network for ManualNetwork {
    fn fetch(&mut self, url: &str) -> FetchOutcome {
        self.requested.push(url.to_string());
        FetchOutcome::Stalled
    }
}

/// Completes every script after a latency, except URLs marked stalled.
#[derive(Debug, Clone)]
pub struct LatencyNetwork {
    default_latency: Duration,
    overrides: HashMap<String, Duration>,
    stalled: HashSet<String>,
}

impl LatencyNetwork {
    /// Every script completes after `default_latency`.
    #[must_use]
    pub fn new(default_latency: Duration) -> Self {
        Self {
            default_latency,
            overrides: HashMap::new(),
            stalled: HashSet::new(),
        }
    }

    /// Use a specific latency for `url`.
    #[must_use]
    pub fn with_latency(mut self, url: &str, latency: Duration) -> Self {
        let _ = self.overrides.insert(url.to_string(), latency);
        self
    }

    /// Never complete `url`.
    #[must_use]
    pub fn with_stalled(mut self, url: &str) -> Self {
        let _ = self.stalled.insert(url.to_string());
        self
    }
}

impl Network for LatencyNetwork {
    fn fetch(&mut self, url: &str) -> FetchOutcome {
        if self.stalled.contains(url) {
            return FetchOutcome::Stalled;
        }
        FetchOutcome::Complete(
            self.overrides
                .get(url)
                .copied()
                .unwrap_or(self.default_latency),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_network_overrides_and_stalls() {
        let mut network = LatencyNetwork::new(Duration::from_millis(100))
            .with_latency("slow.js", Duration::from_secs(2))
            .with_stalled("dead.js");

        assert_eq!(
            network.fetch("a.js"),
            FetchOutcome::Complete(Duration::from_millis(100))
        );
        assert_eq!(
            network.fetch("slow.js"),
            FetchOutcome::Complete(Duration::from_secs(2))
        );
        assert_eq!(network.fetch("dead.js"), FetchOutcome::Stalled);
    }

    #[test]
    fn test_manual_network_records_requests() {
        let mut network = ManualNetwork::new();
        assert_eq!(network.fetch("a.js"), FetchOutcome::Stalled);
        assert_eq!(network.requested(), ["a.js"]);
    }
}

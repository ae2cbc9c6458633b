//! Metrics-sink boundary.
//!
//! The engine emits two kinds of observations per completed request: an
//! outcome count keyed by router, node label, and status, and a latency
//! sample keyed by router and node. How those observations are exported
//! is the caller's concern; the `gradsim` binary backs this trait with
//! prometheus collectors.

use crate::types::{NodeId, RequestStatus, RouterKind};
use std::collections::HashMap;
use std::sync::Mutex;

/// Node label used for outcomes with no serving node (rejections).
pub const NO_NODE_LABEL: &str = "none";

/// Receiver for simulation observations.
pub trait MetricsSink: Send + Sync {
    /// Count one request outcome. `node` is `None` for rejections.
    fn record_outcome(&self, router: RouterKind, node: Option<&NodeId>, status: RequestStatus);

    /// Record one latency sample, in seconds.
    fn observe_latency(&self, router: RouterKind, node: &NodeId, seconds: f64);
}

/// In-memory sink for tests and end-of-run inspection.
///
/// Shipped as a library type (not test-gated) so integration tests and
/// downstream harnesses can assert on recorded observations.
#[derive(Debug, Default)]
pub struct MemorySink {
    counts: Mutex<HashMap<(RouterKind, String, RequestStatus), u64>>,
    latencies: Mutex<HashMap<(RouterKind, String), Vec<f64>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for one (router, node label, status) key.
    pub fn count(&self, router: RouterKind, node_label: &str, status: RequestStatus) -> u64 {
        self.counts
            .lock()
            .unwrap()
            .get(&(router, node_label.to_string(), status))
            .copied()
            .unwrap_or_default()
    }

    /// Total outcomes recorded for a router across nodes and statuses.
    pub fn total(&self, router: RouterKind) -> u64 {
        self.counts
            .lock()
            .unwrap()
            .iter()
            .filter(|((r, _, _), _)| *r == router)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Number of latency samples recorded for one (router, node) key.
    pub fn latency_samples(&self, router: RouterKind, node_label: &str) -> usize {
        self.latencies
            .lock()
            .unwrap()
            .get(&(router, node_label.to_string()))
            .map(Vec::len)
            .unwrap_or_default()
    }

    /// Total latency samples recorded for a router.
    pub fn total_latency_samples(&self, router: RouterKind) -> usize {
        self.latencies
            .lock()
            .unwrap()
            .iter()
            .filter(|((r, _), _)| *r == router)
            .map(|(_, samples)| samples.len())
            .sum()
    }
}

impl MetricsSink for MemorySink {
    fn record_outcome(&self, router: RouterKind, node: Option<&NodeId>, status: RequestStatus) {
        let label = node.map_or(NO_NODE_LABEL, NodeId::as_str).to_string();
        *self
            .counts
            .lock()
            .unwrap()
            .entry((router, label, status))
            .or_default() += 1;
    }

    fn observe_latency(&self, router: RouterKind, node: &NodeId, seconds: f64) {
        self.latencies
            .lock()
            .unwrap()
            .entry((router, node.as_str().to_string()))
            .or_default()
            .push(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_per_key() {
        let sink = MemorySink::new();
        let a = NodeId::new("a");

        sink.record_outcome(RouterKind::Gradient, Some(&a), RequestStatus::Success);
        sink.record_outcome(RouterKind::Gradient, Some(&a), RequestStatus::Success);
        sink.record_outcome(RouterKind::Gradient, Some(&a), RequestStatus::Error);
        sink.record_outcome(RouterKind::Traditional, Some(&a), RequestStatus::Success);

        assert_eq!(sink.count(RouterKind::Gradient, "a", RequestStatus::Success), 2);
        assert_eq!(sink.count(RouterKind::Gradient, "a", RequestStatus::Error), 1);
        assert_eq!(
            sink.count(RouterKind::Traditional, "a", RequestStatus::Success),
            1
        );
        assert_eq!(sink.total(RouterKind::Gradient), 3);
    }

    #[test]
    fn rejections_use_the_none_label() {
        let sink = MemorySink::new();
        sink.record_outcome(RouterKind::Traditional, None, RequestStatus::Rejected);
        assert_eq!(
            sink.count(RouterKind::Traditional, NO_NODE_LABEL, RequestStatus::Rejected),
            1
        );
    }

    #[test]
    fn latency_samples_tracked_per_router_and_node() {
        let sink = MemorySink::new();
        let a = NodeId::new("a");

        sink.observe_latency(RouterKind::Gradient, &a, 0.010);
        sink.observe_latency(RouterKind::Gradient, &a, 0.020);
        sink.observe_latency(RouterKind::Traditional, &a, 0.030);

        assert_eq!(sink.latency_samples(RouterKind::Gradient, "a"), 2);
        assert_eq!(sink.latency_samples(RouterKind::Traditional, "a"), 1);
        assert_eq!(sink.total_latency_samples(RouterKind::Gradient), 2);
    }
}

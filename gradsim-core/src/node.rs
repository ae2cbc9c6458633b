//! Per-node simulated health and the request-processing model.
//!
//! A node's mutable health fields are written by the event scheduler while
//! requests are in flight, so they are stored as atomics. Each field has a
//! single writer (the scheduler for health fields, the processing path for
//! the connection counter), which keeps relaxed ordering sufficient.

use crate::rng::SimRng;
use crate::types::{NodeId, RequestOutcome};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Effective error probability is capped below certainty so a degraded
/// node keeps an observable success path at any injected severity.
pub(crate) const ERROR_RATE_CAP: f64 = 0.95;

/// `f64` stored as raw bits in an `AtomicU64`.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// One simulated cluster node.
#[derive(Debug)]
pub struct SimNode {
    id: NodeId,
    /// Latency floor under no load, in milliseconds.
    base_latency_ms: f64,
    /// Capacity denominator for load-factor scaling.
    max_connections: u32,
    /// Intrinsic error probability before degradation scaling.
    error_rate: AtomicF64,
    /// Injected fault severity multiplier (1.0 = healthy).
    degradation_factor: AtomicF64,
    /// Requests currently in flight on this node.
    active_connections: AtomicU32,
}

impl SimNode {
    pub fn new(id: NodeId, base_latency_ms: f64, max_connections: u32) -> Self {
        Self {
            id,
            base_latency_ms,
            max_connections,
            error_rate: AtomicF64::new(0.0),
            degradation_factor: AtomicF64::new(1.0),
            active_connections: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn base_latency_ms(&self) -> f64 {
        self.base_latency_ms
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate.load()
    }

    pub fn set_error_rate(&self, rate: f64) {
        self.error_rate.store(rate);
    }

    pub fn degradation_factor(&self) -> f64 {
        self.degradation_factor.load()
    }

    pub fn set_degradation_factor(&self, factor: f64) {
        self.degradation_factor.store(factor);
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Error probability after degradation scaling, capped at
    /// [`ERROR_RATE_CAP`] regardless of magnitude.
    pub fn effective_error_rate(&self) -> f64 {
        (self.error_rate.load() * self.degradation_factor.load()).min(ERROR_RATE_CAP)
    }

    /// Serve one request against this node's current health state.
    ///
    /// Increments the in-flight counter, scales latency by degradation and
    /// load, draws the error outcome, suspends for the simulated latency
    /// without blocking the runtime, and decrements the counter. The load
    /// factor includes the request's own connection. Always succeeds.
    pub async fn process_request(&self, rng: &SimRng) -> RequestOutcome {
        let active = self.active_connections.fetch_add(1, Ordering::SeqCst) + 1;
        let load_factor = f64::from(active) / f64::from(self.max_connections);
        let latency_ms =
            self.base_latency_ms * self.degradation_factor.load() * (1.0 + load_factor * 2.0);
        let is_error = rng.draw() < self.effective_error_rate();

        tokio::time::sleep(Duration::from_secs_f64(latency_ms / 1000.0)).await;

        self.active_connections.fetch_sub(1, Ordering::SeqCst);
        RequestOutcome {
            latency_ms,
            is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn node(base_latency_ms: f64, max_connections: u32) -> SimNode {
        SimNode::new(NodeId::new("n1"), base_latency_ms, max_connections)
    }

    #[tokio::test]
    async fn latency_scales_with_degradation_and_load() {
        let n = node(10.0, 100);
        let rng = SimRng::seeded(42);

        // Single request: load factor 1/100.
        let outcome = n.process_request(&rng).await;
        let expected = 10.0 * 1.0 * (1.0 + (1.0 / 100.0) * 2.0);
        assert!((outcome.latency_ms - expected).abs() < 1e-9);

        // Degraded: latency multiplies by the injected factor.
        n.set_degradation_factor(3.0);
        let outcome = n.process_request(&rng).await;
        let expected = 10.0 * 3.0 * (1.0 + (1.0 / 100.0) * 2.0);
        assert!((outcome.latency_ms - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn active_connections_return_to_zero_after_concurrent_requests() {
        let n = Arc::new(node(1.0, 10));
        let rng = Arc::new(SimRng::seeded(7));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let n = Arc::clone(&n);
            let rng = Arc::clone(&rng);
            handles.push(tokio::spawn(async move {
                n.process_request(&rng).await;
            }));
        }
        for handle in handles {
            handle.await.expect("request task panicked");
        }

        assert_eq!(n.active_connections(), 0);
    }

    #[tokio::test]
    async fn concurrent_requests_raise_the_load_factor() {
        let n = Arc::new(node(5.0, 8));
        let rng = Arc::new(SimRng::seeded(7));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let n = Arc::clone(&n);
            let rng = Arc::clone(&rng);
            handles.push(tokio::spawn(
                async move { n.process_request(&rng).await },
            ));
        }

        let mut latencies = Vec::new();
        for handle in handles {
            latencies.push(handle.await.expect("request task panicked").latency_ms);
        }
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap());

        // With capacity 8 and 8 concurrent requests, the last arrival sees
        // load factor 1.0 and thus 3x the base latency; nothing exceeds it.
        let max_expected = 5.0 * (1.0 + 1.0 * 2.0);
        assert!(latencies.iter().all(|l| *l <= max_expected + 1e-9));
        assert!(*latencies.last().unwrap() > *latencies.first().unwrap());
    }

    #[tokio::test]
    async fn failed_node_still_produces_successes() {
        // fail-event severity: error rate 0.99 at 100x degradation still
        // caps at 0.95, so successes remain possible.
        let n = node(0.0, 100);
        n.set_error_rate(0.99);
        n.set_degradation_factor(100.0);
        let rng = SimRng::seeded(42);

        let mut successes = 0u32;
        for _ in 0..200 {
            if !n.process_request(&rng).await.is_error {
                successes += 1;
            }
        }
        assert!(successes > 0, "0.95 cap must leave a success path open");
    }

    proptest! {
        #[test]
        fn effective_error_rate_never_exceeds_cap(
            rate in 0.0f64..=1.0,
            factor in 1.0f64..=1000.0,
        ) {
            let n = node(10.0, 100);
            n.set_error_rate(rate);
            n.set_degradation_factor(factor);
            prop_assert!(n.effective_error_rate() <= ERROR_RATE_CAP);
        }
    }
}

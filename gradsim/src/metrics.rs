//! Prometheus collectors backing the engine's metrics sink.
//!
//! Exposition lives in [`crate::http_api`]; recording happens through
//! [`PrometheusSink`], the binary's implementation of the engine's
//! `MetricsSink` boundary.

use gradsim_core::{MetricsSink, NO_NODE_LABEL, NodeId, RequestStatus, RouterKind};
use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder};
use tracing::info;

lazy_static! {
    /// Outcome counts per router, node, and status.
    pub static ref SIM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "sim_requests_total",
            "Total simulated requests by router, node, and status.",
        ),
        &["router", "node", "status"],
    )
    .expect("sim_requests_total definition is valid");

    /// Latency samples per router and node, in seconds.
    pub static ref SIM_LATENCY_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "sim_latency_seconds",
            "Simulated request latency by router and node.",
        )
        .buckets(
            prometheus::exponential_buckets(0.001, 2.0, 14)
                .expect("latency bucket definition is valid"),
        ),
        &["router", "node"],
    )
    .expect("sim_latency_seconds definition is valid");
}

/// Register the simulation collectors with the default registry.
///
/// Call once at startup; a second call reports an already-registered
/// error from prometheus.
pub fn register_metrics() -> prometheus::Result<()> {
    let registry = prometheus::default_registry();
    registry.register(Box::new(SIM_REQUESTS_TOTAL.clone()))?;
    registry.register(Box::new(SIM_LATENCY_SECONDS.clone()))?;
    Ok(())
}

/// Encode the default registry in Prometheus text format.
pub fn encode_metrics() -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Metrics sink recording into the prometheus collectors.
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn record_outcome(&self, router: RouterKind, node: Option<&NodeId>, status: RequestStatus) {
        let node_label = node.map_or(NO_NODE_LABEL, NodeId::as_str);
        SIM_REQUESTS_TOTAL
            .with_label_values(&[router.as_str(), node_label, status.as_str()])
            .inc();
    }

    fn observe_latency(&self, router: RouterKind, node: &NodeId, seconds: f64) {
        SIM_LATENCY_SECONDS
            .with_label_values(&[router.as_str(), node.as_str()])
            .observe(seconds);
    }
}

/// Log a per-router, per-node comparison of the recorded outcomes.
pub fn log_summary(node_ids: &[String]) {
    for router in [RouterKind::Gradient, RouterKind::Traditional] {
        for node in node_ids {
            let success = SIM_REQUESTS_TOTAL
                .with_label_values(&[router.as_str(), node, RequestStatus::Success.as_str()])
                .get();
            let errors = SIM_REQUESTS_TOTAL
                .with_label_values(&[router.as_str(), node, RequestStatus::Error.as_str()])
                .get();

            let latency = SIM_LATENCY_SECONDS.with_label_values(&[router.as_str(), node]);
            let samples = latency.get_sample_count();
            let mean_latency_ms = if samples > 0 {
                latency.get_sample_sum() / samples as f64 * 1000.0
            } else {
                0.0
            };

            info!(
                router = router.as_str(),
                node = %node,
                success,
                errors,
                mean_latency_ms,
                "router outcome summary"
            );
        }

        let rejected = SIM_REQUESTS_TOTAL
            .with_label_values(&[router.as_str(), NO_NODE_LABEL, RequestStatus::Rejected.as_str()])
            .get();
        if rejected > 0 {
            info!(
                router = router.as_str(),
                rejected, "requests turned away with no eligible node"
            );
        }
    }
}

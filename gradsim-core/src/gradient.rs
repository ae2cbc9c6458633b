//! Externally-guided router with random fallback.
//!
//! Every dispatch asks the decision service to pick among all known nodes;
//! circuit-breaker state plays no part here, because avoiding unhealthy
//! nodes is the service's job. Any decision failure degrades to a uniform
//! random choice instead of failing the request, so a dispatched request
//! always produces exactly one outcome.

use crate::decision::DecisionClient;
use crate::metrics::MetricsSink;
use crate::pool::NodePool;
use crate::rng::SimRng;
use crate::types::{Dispatch, NodeId, RequestStatus, RouterKind};
use std::sync::Arc;
use tracing::debug;

pub struct GradientRouter {
    pool: Arc<NodePool>,
    decision: DecisionClient,
    rng: Arc<SimRng>,
    sink: Arc<dyn MetricsSink>,
}

impl GradientRouter {
    pub fn new(
        pool: Arc<NodePool>,
        decision: DecisionClient,
        rng: Arc<SimRng>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            pool,
            decision,
            rng,
            sink,
        }
    }

    /// Resolve a target node, serve one request on it, and record the
    /// outcome. Never propagates decision-service failures.
    pub async fn route_and_serve(&self) -> Dispatch {
        let candidates = self.pool.ids();

        let selected = match self.decision.select(&candidates).await {
            Ok(id) => id,
            Err(err) => {
                debug!(error = %err, "decision service failed, falling back to random choice");
                match self.rng.pick(&candidates) {
                    Some(id) => id.clone(),
                    None => return self.reject(),
                }
            }
        };

        let Some(node) = self.pool.get(&selected).map(Arc::clone) else {
            // Candidates come from the pool, so this is unreachable for a
            // validated scenario.
            return self.reject();
        };

        let outcome = node.process_request(&self.rng).await;
        self.sink
            .record_outcome(RouterKind::Gradient, Some(&selected), outcome.status());
        self.sink
            .observe_latency(RouterKind::Gradient, &selected, outcome.latency_ms / 1000.0);

        Dispatch::Served {
            node: selected,
            outcome,
        }
    }

    fn reject(&self) -> Dispatch {
        self.sink
            .record_outcome(RouterKind::Gradient, None, RequestStatus::Rejected);
        Dispatch::Rejected
    }
}

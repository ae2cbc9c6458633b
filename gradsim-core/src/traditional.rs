//! Round-robin router behind a per-node circuit breaker.
//!
//! Selection advances a shared cursor modulo the count of currently
//! eligible (circuit-closed) nodes. The cursor is deliberately unstable
//! across changes in the eligible set: when the set shrinks or grows
//! between dispatches, selection can skip or repeat nodes. That is the
//! measured behavior of the system being simulated and must not be
//! "fixed" into a stable-fairness variant.

use crate::circuit::CircuitBoard;
use crate::metrics::MetricsSink;
use crate::node::SimNode;
use crate::pool::NodePool;
use crate::rng::SimRng;
use crate::types::{Dispatch, RequestStatus, RouterKind};
use std::sync::{Arc, Mutex};

pub struct TraditionalRouter {
    pool: Arc<NodePool>,
    breakers: CircuitBoard,
    cursor: Mutex<usize>,
    rng: Arc<SimRng>,
    sink: Arc<dyn MetricsSink>,
}

impl TraditionalRouter {
    pub fn new(pool: Arc<NodePool>, rng: Arc<SimRng>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            pool,
            breakers: CircuitBoard::new(),
            cursor: Mutex::new(0),
            rng,
            sink,
        }
    }

    /// Circuit-breaker state, exposed for inspection.
    pub fn breakers(&self) -> &CircuitBoard {
        &self.breakers
    }

    /// Select the next eligible node round-robin, serve one request on
    /// it, and fold the outcome into its circuit-breaker score.
    ///
    /// When every node is circuit-open the request is turned away with a
    /// recorded rejection and no latency observation: deliberate
    /// admission control under total outage, not an error.
    pub async fn route_and_serve(&self) -> Dispatch {
        let eligible: Vec<Arc<SimNode>> = self
            .pool
            .iter()
            .filter(|node| !self.breakers.is_open(node.id()))
            .map(Arc::clone)
            .collect();

        if eligible.is_empty() {
            self.sink
                .record_outcome(RouterKind::Traditional, None, RequestStatus::Rejected);
            return Dispatch::Rejected;
        }

        let node = {
            let mut cursor = self.cursor.lock().unwrap();
            *cursor = (*cursor + 1) % eligible.len();
            Arc::clone(&eligible[*cursor])
        };

        let outcome = node.process_request(&self.rng).await;
        self.breakers.record(node.id(), outcome.is_error);

        self.sink
            .record_outcome(RouterKind::Traditional, Some(node.id()), outcome.status());
        self.sink
            .observe_latency(RouterKind::Traditional, node.id(), outcome.latency_ms / 1000.0);

        Dispatch::Served {
            node: node.id().clone(),
            outcome,
        }
    }
}

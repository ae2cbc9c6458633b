//! Per-node circuit-breaker scores for the traditional router.
//!
//! Each node carries a consecutive-failure score: +1 per error outcome,
//! -1 per success outcome floored at zero. A node is "open" (ineligible
//! for selection) once its score reaches [`OPEN_THRESHOLD`]. Scores are
//! created lazily on first dispatch and live for the whole scenario.
//!
//! Because open nodes are never selected, their score can never decrement:
//! an open node cannot self-recover without an explicit `recover` event
//! restoring its health. That lockout is the modeled behavior, not a bug.

use crate::types::NodeId;
use std::collections::HashMap;
use std::sync::RwLock;

/// Score at or above which a node's circuit is open.
pub const OPEN_THRESHOLD: u32 = 5;

/// Rolling failure scores for every node the traditional router has
/// dispatched to.
#[derive(Debug, Default)]
pub struct CircuitBoard {
    scores: RwLock<HashMap<NodeId, u32>>,
}

impl CircuitBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the node's circuit is open. Unknown nodes are closed.
    pub fn is_open(&self, id: &NodeId) -> bool {
        self.score(id) >= OPEN_THRESHOLD
    }

    /// Current failure score. Unknown nodes score zero.
    pub fn score(&self, id: &NodeId) -> u32 {
        self.scores
            .read()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    /// Fold one request outcome into the node's score.
    pub fn record(&self, id: &NodeId, is_error: bool) {
        let mut scores = self.scores.write().unwrap();
        let score = scores.entry(id.clone()).or_default();
        if is_error {
            *score += 1;
        } else {
            *score = score.saturating_sub(1);
        }
    }
}

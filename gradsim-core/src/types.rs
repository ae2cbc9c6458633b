//! Common types shared across the simulation engine.

use serde::{Deserialize, Serialize};

/// Unique identifier for a node in the simulated cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which routing strategy produced an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterKind {
    /// Externally-guided routing with random fallback.
    Gradient,
    /// Round-robin routing behind a circuit breaker.
    Traditional,
}

impl RouterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterKind::Gradient => "gradient",
            RouterKind::Traditional => "traditional",
        }
    }
}

impl std::fmt::Display for RouterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final status of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    /// Served and the simulated outcome draw succeeded.
    Success,
    /// Served but the simulated outcome draw failed.
    Error,
    /// Not served: no eligible node was available.
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Outcome of serving one request on a node.
///
/// Ephemeral: consumed immediately for circuit-breaker accounting and
/// metrics recording, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestOutcome {
    /// Simulated service latency in milliseconds.
    pub latency_ms: f64,
    /// Whether the simulated outcome draw came up as an error.
    pub is_error: bool,
}

impl RequestOutcome {
    pub fn status(&self) -> RequestStatus {
        if self.is_error {
            RequestStatus::Error
        } else {
            RequestStatus::Success
        }
    }
}

/// Result of one router dispatch, returned for callers that want to
/// inspect routing decisions (the metrics sink is updated either way).
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A node was selected and served the request.
    Served {
        node: NodeId,
        outcome: RequestOutcome,
    },
    /// No node was eligible; the request was turned away.
    Rejected,
}

impl Dispatch {
    /// Node that served the request, if any.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Dispatch::Served { node, .. } => Some(node),
            Dispatch::Rejected => None,
        }
    }
}

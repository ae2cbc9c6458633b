//! Cluster-behavior simulation engine.
//!
//! Simulates a small cluster under scripted health events and fixed-rate
//! synthetic traffic, dispatching every request through two routing
//! strategies side by side:
//!
//! - a **gradient router** that delegates node selection to an external
//!   decision service and degrades to random choice when that service is
//!   unavailable, and
//! - a **traditional router** that round-robins across nodes guarded by a
//!   per-node circuit breaker.
//!
//! The engine emits outcome counts and latency observations through the
//! [`MetricsSink`] trait; transport and exposition of those observations
//! belong to the caller (see the `gradsim` binary).

mod circuit;
mod decision;
mod error;
mod events;
mod gradient;
mod metrics;
mod node;
mod pool;
mod rng;
mod runner;
mod scenario;
mod traditional;
mod traffic;
mod types;

pub use circuit::{CircuitBoard, OPEN_THRESHOLD};
pub use decision::{DEFAULT_DECISION_TIMEOUT, DecisionClient};
pub use error::{DecisionError, ScenarioError};
pub use events::{EventScheduler, SchedulerPhase};
pub use gradient::GradientRouter;
pub use metrics::{MemorySink, MetricsSink, NO_NODE_LABEL};
pub use node::SimNode;
pub use pool::NodePool;
pub use rng::SimRng;
pub use runner::{RunReport, ScenarioRunner};
pub use scenario::{EventKind, EventSpec, NodeSpec, Scenario, TrafficSpec};
pub use traditional::TraditionalRouter;
pub use traffic::{TrafficGenerator, TrafficReport};
pub use types::{Dispatch, NodeId, RequestOutcome, RequestStatus, RouterKind};

//! Timed health-event scheduler.
//!
//! Fires the scenario's events against node health fields at their
//! configured offsets from scenario start. The scheduler is purely
//! sequential: events fire one at a time in listed order, and an event
//! whose offset is already in the past fires immediately. It runs as its
//! own task alongside traffic generation and never blocks it.

use crate::pool::NodePool;
use crate::scenario::{EventKind, EventSpec};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Degradation factor injected by a `fail` event.
const FAIL_DEGRADATION_FACTOR: f64 = 100.0;

/// Error rate injected by a `fail` event. Still subject to the node's
/// effective-rate cap when the outcome is drawn.
const FAIL_ERROR_RATE: f64 = 0.99;

/// Lifecycle of the scheduler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Running,
    Completed,
}

/// Applies scenario events to the shared node pool on schedule.
#[derive(Debug)]
pub struct EventScheduler {
    pool: Arc<NodePool>,
    events: Vec<EventSpec>,
    phase: AtomicU8,
}

impl EventScheduler {
    pub fn new(pool: Arc<NodePool>, events: Vec<EventSpec>) -> Self {
        Self {
            pool,
            events,
            phase: AtomicU8::new(SchedulerPhase::Idle as u8),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        match self.phase.load(Ordering::Relaxed) {
            0 => SchedulerPhase::Idle,
            1 => SchedulerPhase::Running,
            _ => SchedulerPhase::Completed,
        }
    }

    /// Run the event script to completion.
    ///
    /// Measures every offset against scenario start, so events with
    /// non-monotonic offsets never wait backwards.
    pub async fn run(&self) {
        self.phase
            .store(SchedulerPhase::Running as u8, Ordering::Relaxed);
        let start = tokio::time::Instant::now();

        for event in &self.events {
            let offset = Duration::from_secs_f64(event.at_second.max(0.0));
            tokio::time::sleep_until(start + offset).await;
            self.apply(event);
        }

        self.phase
            .store(SchedulerPhase::Completed as u8, Ordering::Relaxed);
    }

    fn apply(&self, event: &EventSpec) {
        let id = crate::types::NodeId::new(event.node.clone());
        let Some(node) = self.pool.get(&id) else {
            // Validation rejects unknown targets; nothing to mutate here.
            warn!(node = %event.node, "event targets a node missing from the pool");
            return;
        };

        match event.kind {
            EventKind::Degrade { factor } => {
                node.set_degradation_factor(factor);
            }
            EventKind::Recover => {
                node.set_degradation_factor(1.0);
                node.set_error_rate(0.0);
            }
            EventKind::Fail => {
                node.set_degradation_factor(FAIL_DEGRADATION_FACTOR);
                node.set_error_rate(FAIL_ERROR_RATE);
            }
            EventKind::IncreaseErrorRate { rate } => {
                node.set_error_rate(rate);
            }
        }

        info!(
            node = %event.node,
            at_second = event.at_second,
            kind = ?event.kind,
            degradation_factor = node.degradation_factor(),
            error_rate = node.error_rate(),
            "applied health event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::test_support::two_node_scenario;
    use crate::types::NodeId;

    fn event(at_second: f64, node: &str, kind: EventKind) -> EventSpec {
        EventSpec {
            at_second,
            node: node.to_string(),
            kind,
        }
    }

    fn pool() -> Arc<NodePool> {
        Arc::new(NodePool::from_scenario(&two_node_scenario()))
    }

    #[tokio::test]
    async fn degrade_sets_the_factor() {
        let pool = pool();
        let scheduler = EventScheduler::new(
            Arc::clone(&pool),
            vec![event(0.0, "node-a", EventKind::Degrade { factor: 4.0 })],
        );
        scheduler.run().await;

        let a = pool.get(&NodeId::new("node-a")).unwrap();
        assert_eq!(a.degradation_factor(), 4.0);
        assert_eq!(a.error_rate(), 0.0);
    }

    #[tokio::test]
    async fn fail_and_recover_round_trip() {
        let pool = pool();
        let scheduler = EventScheduler::new(
            Arc::clone(&pool),
            vec![
                event(0.0, "node-a", EventKind::Fail),
                event(0.0, "node-a", EventKind::Recover),
            ],
        );
        scheduler.run().await;

        let a = pool.get(&NodeId::new("node-a")).unwrap();
        assert_eq!(a.degradation_factor(), 1.0);
        assert_eq!(a.error_rate(), 0.0);
    }

    #[tokio::test]
    async fn fail_injects_extreme_severity() {
        let pool = pool();
        let scheduler = EventScheduler::new(
            Arc::clone(&pool),
            vec![event(0.0, "node-b", EventKind::Fail)],
        );
        scheduler.run().await;

        let b = pool.get(&NodeId::new("node-b")).unwrap();
        assert_eq!(b.degradation_factor(), FAIL_DEGRADATION_FACTOR);
        assert_eq!(b.error_rate(), FAIL_ERROR_RATE);
    }

    #[tokio::test]
    async fn increase_error_rate_leaves_degradation_untouched() {
        let pool = pool();
        let scheduler = EventScheduler::new(
            Arc::clone(&pool),
            vec![event(0.0, "node-a", EventKind::IncreaseErrorRate { rate: 0.3 })],
        );
        scheduler.run().await;

        let a = pool.get(&NodeId::new("node-a")).unwrap();
        assert_eq!(a.error_rate(), 0.3);
        assert_eq!(a.degradation_factor(), 1.0);
    }

    #[tokio::test]
    async fn events_fire_in_listed_order_even_when_offsets_regress() {
        // Second event's offset is in the past relative to the first; it
        // must still fire (immediately) and fire after the first.
        let pool = pool();
        let scheduler = EventScheduler::new(
            Arc::clone(&pool),
            vec![
                event(0.02, "node-a", EventKind::Degrade { factor: 2.0 }),
                event(0.0, "node-a", EventKind::Degrade { factor: 9.0 }),
            ],
        );
        scheduler.run().await;

        let a = pool.get(&NodeId::new("node-a")).unwrap();
        assert_eq!(a.degradation_factor(), 9.0);
    }

    #[tokio::test]
    async fn phase_tracks_the_lifecycle() {
        let scheduler = EventScheduler::new(pool(), Vec::new());
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        scheduler.run().await;
        assert_eq!(scheduler.phase(), SchedulerPhase::Completed);
    }
}

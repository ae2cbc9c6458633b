//! Fixed-rate traffic generator.
//!
//! Models offered load, not accepted load: ticks arrive at a constant
//! rate for the configured duration regardless of how the cluster is
//! coping. Each tick fans out one dispatch through each router without
//! waiting for either, so many requests are in flight simultaneously.
//! At the deadline the generator stops ticking but lets every in-flight
//! dispatch resolve before reporting.

use crate::gradient::GradientRouter;
use crate::scenario::TrafficSpec;
use crate::traditional::TraditionalRouter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;

/// Totals from one traffic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficReport {
    /// Ticks issued; each tick dispatched once per router.
    pub ticks: u64,
}

pub struct TrafficGenerator {
    gradient: Arc<GradientRouter>,
    traditional: Arc<TraditionalRouter>,
    spec: TrafficSpec,
}

impl TrafficGenerator {
    pub fn new(
        gradient: Arc<GradientRouter>,
        traditional: Arc<TraditionalRouter>,
        spec: TrafficSpec,
    ) -> Self {
        Self {
            gradient,
            traditional,
            spec,
        }
    }

    /// Generate load for the configured duration, then drain in-flight
    /// dispatches.
    pub async fn run(&self) -> TrafficReport {
        let period = Duration::from_secs_f64(1.0 / f64::from(self.spec.requests_per_second));
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(u64::from(self.spec.duration_seconds));
        let mut ticker = tokio::time::interval(period);

        let mut inflight = JoinSet::new();
        let mut ticks = 0u64;

        loop {
            ticker.tick().await;
            if tokio::time::Instant::now() >= deadline {
                break;
            }

            let gradient = Arc::clone(&self.gradient);
            inflight.spawn(async move {
                gradient.route_and_serve().await;
            });
            let traditional = Arc::clone(&self.traditional);
            inflight.spawn(async move {
                traditional.route_and_serve().await;
            });
            ticks += 1;
        }

        debug!(ticks, "traffic window closed, draining in-flight dispatches");
        while inflight.join_next().await.is_some() {}

        TrafficReport { ticks }
    }
}

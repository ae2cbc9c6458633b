//! Scenario runner: wires the engine together and executes one run.
//!
//! Owns the shared node-pool handle and hands it to each component
//! explicitly. The event scheduler and the traffic generator run as
//! concurrent activities; the run resolves once the event script has
//! completed and every dispatched request has drained.

use crate::decision::{DEFAULT_DECISION_TIMEOUT, DecisionClient};
use crate::error::{DecisionError, ScenarioError};
use crate::events::EventScheduler;
use crate::gradient::GradientRouter;
use crate::metrics::MetricsSink;
use crate::pool::NodePool;
use crate::rng::SimRng;
use crate::scenario::Scenario;
use crate::traditional::TraditionalRouter;
use crate::traffic::TrafficGenerator;
use std::sync::Arc;
use tracing::info;

/// Totals from one completed scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub scenario: String,
    /// Ticks issued; each tick dispatched once per router.
    pub ticks: u64,
    /// Health events applied.
    pub events_applied: usize,
}

pub struct ScenarioRunner {
    scenario: Scenario,
    pool: Arc<NodePool>,
    agent_url: String,
    rng: Arc<SimRng>,
    sink: Arc<dyn MetricsSink>,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("scenario", &self.scenario)
            .field("pool", &self.pool)
            .field("agent_url", &self.agent_url)
            .field("rng", &self.rng)
            .field("sink", &"<dyn MetricsSink>")
            .finish()
    }
}

impl ScenarioRunner {
    /// Validate the scenario and assemble the shared state for a run.
    ///
    /// An invalid scenario is rejected here; the simulation never starts
    /// with one.
    pub fn new(
        scenario: Scenario,
        seed: u64,
        sink: Arc<dyn MetricsSink>,
    ) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let agent_url = scenario
            .agent_url()
            .ok_or(ScenarioError::NoNodes)?
            .to_string();
        let pool = Arc::new(NodePool::from_scenario(&scenario));

        Ok(Self {
            scenario,
            pool,
            agent_url,
            rng: Arc::new(SimRng::seeded(seed)),
            sink,
        })
    }

    /// Execute the scenario to completion.
    pub async fn run(&self) -> Result<RunReport, DecisionError> {
        let decision = DecisionClient::new(&self.agent_url, DEFAULT_DECISION_TIMEOUT)?;

        let gradient = Arc::new(GradientRouter::new(
            Arc::clone(&self.pool),
            decision,
            Arc::clone(&self.rng),
            Arc::clone(&self.sink),
        ));
        let traditional = Arc::new(TraditionalRouter::new(
            Arc::clone(&self.pool),
            Arc::clone(&self.rng),
            Arc::clone(&self.sink),
        ));
        let scheduler = EventScheduler::new(Arc::clone(&self.pool), self.scenario.events.clone());
        let traffic = TrafficGenerator::new(gradient, traditional, self.scenario.traffic);

        info!(
            scenario = %self.scenario.name,
            nodes = self.pool.len(),
            requests_per_second = self.scenario.traffic.requests_per_second,
            duration_seconds = self.scenario.traffic.duration_seconds,
            events = self.scenario.events.len(),
            "starting scenario"
        );

        let (report, ()) = tokio::join!(traffic.run(), scheduler.run());

        info!(
            scenario = %self.scenario.name,
            ticks = report.ticks,
            "scenario complete"
        );

        Ok(RunReport {
            scenario: self.scenario.name.clone(),
            ticks: report.ticks,
            events_applied: self.scenario.events.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MemorySink;

    #[test]
    fn rejects_an_invalid_scenario_before_running() {
        let scenario = Scenario {
            name: "empty".to_string(),
            nodes: Vec::new(),
            traffic: crate::scenario::TrafficSpec {
                requests_per_second: 1,
                duration_seconds: 1,
            },
            events: Vec::new(),
        };
        let sink = Arc::new(MemorySink::new());
        let err = ScenarioRunner::new(scenario, 42, sink).unwrap_err();
        assert!(matches!(err, ScenarioError::NoNodes));
    }
}

//! Scenario definitions: the read-only configuration a run executes.
//!
//! Scenarios are TOML documents naming the cluster's nodes, the offered
//! traffic, and a script of timed health events. Parsing and validation
//! both happen before the run starts; an invalid scenario never reaches
//! the engine. Unknown event types are rejected here at load time, not
//! when the event would fire.

use crate::error::ScenarioError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

fn default_base_latency_ms() -> f64 {
    10.0
}

fn default_max_connections() -> u32 {
    100
}

/// One simulated node definition.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    /// Latency floor under no load, in milliseconds.
    #[serde(default = "default_base_latency_ms")]
    pub base_latency_ms: f64,
    /// Capacity denominator for load-factor scaling.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Decision-service endpoint consulted by the gradient router.
    pub gradient_agent_url: String,
}

/// Offered-load parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrafficSpec {
    pub requests_per_second: u32,
    pub duration_seconds: u32,
}

/// Health mutation applied to a node when its event fires.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Set the node's degradation factor.
    Degrade { factor: f64 },
    /// Restore the node to healthy defaults.
    Recover,
    /// Hard failure: extreme degradation and near-certain errors.
    Fail,
    /// Set the node's intrinsic error rate.
    IncreaseErrorRate { rate: f64 },
}

/// One timed health event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventSpec {
    /// Offset from scenario start, in seconds.
    pub at_second: f64,
    /// Target node id.
    pub node: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// A complete scenario document.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    pub traffic: TrafficSpec,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

impl Scenario {
    /// Read and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate a scenario from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the invariants a run relies on.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.nodes.is_empty() {
            return Err(ScenarioError::NoNodes);
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(ScenarioError::DuplicateNode(node.id.clone()));
            }
            if node.gradient_agent_url.trim().is_empty() {
                return Err(ScenarioError::EmptyAgentUrl(node.id.clone()));
            }
            if !node.base_latency_ms.is_finite() || node.base_latency_ms < 0.0 {
                return Err(ScenarioError::InvalidBaseLatency {
                    id: node.id.clone(),
                    value: node.base_latency_ms,
                });
            }
            if node.max_connections == 0 {
                return Err(ScenarioError::ZeroCapacity(node.id.clone()));
            }
        }

        if self.traffic.requests_per_second == 0 {
            return Err(ScenarioError::ZeroRate);
        }
        if self.traffic.duration_seconds == 0 {
            return Err(ScenarioError::ZeroDuration);
        }

        for event in &self.events {
            if !seen.contains(event.node.as_str()) {
                return Err(ScenarioError::UnknownEventNode {
                    at_second: event.at_second,
                    node: event.node.clone(),
                });
            }
            match event.kind {
                EventKind::Degrade { factor } if factor < 1.0 => {
                    return Err(ScenarioError::InvalidDegradeFactor {
                        at_second: event.at_second,
                        factor,
                    });
                }
                EventKind::IncreaseErrorRate { rate } if !(0.0..=1.0).contains(&rate) => {
                    return Err(ScenarioError::InvalidErrorRate {
                        at_second: event.at_second,
                        rate,
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Decision-service endpoint for the run: the first node's agent URL.
    pub fn agent_url(&self) -> Option<&str> {
        self.nodes.first().map(|n| n.gradient_agent_url.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
        name = "gradual-degradation"

        [[nodes]]
        id = "node-a"
        base_latency_ms = 5.0
        max_connections = 50
        gradient_agent_url = "http://localhost:8001"

        [[nodes]]
        id = "node-b"
        gradient_agent_url = "http://localhost:8002"

        [traffic]
        requests_per_second = 10
        duration_seconds = 30

        [[events]]
        at_second = 5.0
        node = "node-a"
        type = "degrade"
        factor = 3.0

        [[events]]
        at_second = 12.0
        node = "node-a"
        type = "recover"

        [[events]]
        at_second = 20.0
        node = "node-b"
        type = "increase_error_rate"
        rate = 0.4

        [[events]]
        at_second = 25.0
        node = "node-b"
        type = "fail"
    "#;

    #[test]
    fn parses_a_full_scenario() {
        let scenario = Scenario::from_toml_str(VALID).expect("valid scenario");
        assert_eq!(scenario.name, "gradual-degradation");
        assert_eq!(scenario.nodes.len(), 2);
        assert_eq!(scenario.events.len(), 4);
        assert_eq!(scenario.agent_url(), Some("http://localhost:8001"));

        assert_eq!(
            scenario.events[0].kind,
            EventKind::Degrade { factor: 3.0 }
        );
        assert_eq!(scenario.events[1].kind, EventKind::Recover);
        assert_eq!(
            scenario.events[2].kind,
            EventKind::IncreaseErrorRate { rate: 0.4 }
        );
        assert_eq!(scenario.events[3].kind, EventKind::Fail);
    }

    #[test]
    fn node_defaults_match_loader_defaults() {
        let scenario = Scenario::from_toml_str(VALID).unwrap();
        let b = &scenario.nodes[1];
        assert_eq!(b.base_latency_ms, 10.0);
        assert_eq!(b.max_connections, 100);
    }

    #[test]
    fn unknown_event_type_is_rejected_at_parse_time() {
        let raw = r#"
            name = "bad"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8001"

            [traffic]
            requests_per_second = 1
            duration_seconds = 1

            [[events]]
            at_second = 1.0
            node = "a"
            type = "explode"
        "#;
        let err = Scenario::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn event_targeting_unknown_node_is_rejected() {
        let raw = r#"
            name = "bad"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8001"

            [traffic]
            requests_per_second = 1
            duration_seconds = 1

            [[events]]
            at_second = 1.0
            node = "ghost"
            type = "fail"
        "#;
        let err = Scenario::from_toml_str(raw).unwrap_err();
        assert!(
            matches!(err, ScenarioError::UnknownEventNode { ref node, .. } if node == "ghost"),
            "got {err:?}"
        );
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let raw = r#"
            name = "bad"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8001"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8002"

            [traffic]
            requests_per_second = 1
            duration_seconds = 1
        "#;
        let err = Scenario::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ScenarioError::DuplicateNode(ref id) if id == "a"));
    }

    #[test]
    fn zero_traffic_parameters_are_rejected() {
        let raw = r#"
            name = "bad"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8001"

            [traffic]
            requests_per_second = 0
            duration_seconds = 1
        "#;
        assert!(matches!(
            Scenario::from_toml_str(raw).unwrap_err(),
            ScenarioError::ZeroRate
        ));
    }

    #[test]
    fn degrade_factor_below_one_is_rejected() {
        let raw = r#"
            name = "bad"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8001"

            [traffic]
            requests_per_second = 1
            duration_seconds = 1

            [[events]]
            at_second = 1.0
            node = "a"
            type = "degrade"
            factor = 0.5
        "#;
        assert!(matches!(
            Scenario::from_toml_str(raw).unwrap_err(),
            ScenarioError::InvalidDegradeFactor { .. }
        ));
    }

    #[test]
    fn error_rate_outside_unit_interval_is_rejected() {
        let raw = r#"
            name = "bad"

            [[nodes]]
            id = "a"
            gradient_agent_url = "http://localhost:8001"

            [traffic]
            requests_per_second = 1
            duration_seconds = 1

            [[events]]
            at_second = 1.0
            node = "a"
            type = "increase_error_rate"
            rate = 1.5
        "#;
        assert!(matches!(
            Scenario::from_toml_str(raw).unwrap_err(),
            ScenarioError::InvalidErrorRate { .. }
        ));
    }

    #[test]
    fn empty_node_list_is_rejected() {
        let raw = r#"
            name = "bad"

            [traffic]
            requests_per_second = 1
            duration_seconds = 1
        "#;
        assert!(matches!(
            Scenario::from_toml_str(raw).unwrap_err(),
            ScenarioError::NoNodes
        ));
    }

    #[test]
    fn load_reads_a_scenario_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(VALID.as_bytes()).expect("write scenario");

        let scenario = Scenario::load(file.path()).expect("load scenario");
        assert_eq!(scenario.name, "gradual-degradation");
    }

    #[test]
    fn load_surfaces_io_errors_with_the_path() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scenario.toml"));
    }
}

//! Error types for the simulation engine.
//!
//! Configuration problems are fatal and surface before a run starts.
//! Decision-service failures are recovered inside the gradient router and
//! never reach the traffic pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal scenario-configuration error.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario defines no nodes")]
    NoNodes,

    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("node `{0}`: gradient_agent_url must not be empty")]
    EmptyAgentUrl(String),

    #[error("node `{id}`: base_latency_ms must be finite and non-negative, got {value}")]
    InvalidBaseLatency { id: String, value: f64 },

    #[error("node `{0}`: max_connections must be at least 1")]
    ZeroCapacity(String),

    #[error("traffic.requests_per_second must be at least 1")]
    ZeroRate,

    #[error("traffic.duration_seconds must be at least 1")]
    ZeroDuration,

    #[error("event at {at_second}s targets unknown node `{node}`")]
    UnknownEventNode { at_second: f64, node: String },

    #[error("event at {at_second}s: degrade factor must be at least 1.0, got {factor}")]
    InvalidDegradeFactor { at_second: f64, factor: f64 },

    #[error("event at {at_second}s: error rate must be within [0, 1], got {rate}")]
    InvalidErrorRate { at_second: f64, rate: f64 },
}

/// Failure talking to the gradient decision service.
///
/// Always consumed by the gradient router's random fallback.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("decision request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decision service selected unknown node `{0}`")]
    UnknownNode(String),
}

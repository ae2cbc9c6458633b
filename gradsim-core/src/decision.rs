//! HTTP client for the external gradient decision service.
//!
//! The service is a black box: `GET {agent_url}/route?candidates=a,b,c`
//! answering `{"selected_node": "<id>"}`. Timeouts, transport errors,
//! non-2xx statuses, malformed bodies, and selections outside the
//! candidate set all surface as [`DecisionError`] for the gradient
//! router's fallback to consume.

use crate::error::DecisionError;
use crate::types::NodeId;
use serde::Deserialize;
use std::time::Duration;

/// Timeout applied to every decision request.
pub const DEFAULT_DECISION_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct RouteResponse {
    selected_node: String,
}

/// Client for one decision-service endpoint.
#[derive(Debug, Clone)]
pub struct DecisionClient {
    http: reqwest::Client,
    route_url: String,
}

impl DecisionClient {
    /// Build a client for `agent_url` with the given request timeout.
    pub fn new(agent_url: &str, timeout: Duration) -> Result<Self, DecisionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            route_url: format!("{}/route", agent_url.trim_end_matches('/')),
        })
    }

    /// Ask the service to pick one of `candidates`.
    pub async fn select(&self, candidates: &[NodeId]) -> Result<NodeId, DecisionError> {
        let list = candidates
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .get(&self.route_url)
            .query(&[("candidates", list.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: RouteResponse = response.json().await?;
        let selected = NodeId::new(body.selected_node);
        if candidates.contains(&selected) {
            Ok(selected)
        } else {
            Err(DecisionError::UnknownNode(selected.0))
        }
    }
}

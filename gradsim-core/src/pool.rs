//! Shared, identity-keyed collection of simulated nodes.
//!
//! Built once from a validated scenario and handed to the routers and the
//! event scheduler as an explicit shared handle. The set of nodes never
//! changes during a run; only per-node health fields do.

use crate::node::SimNode;
use crate::scenario::Scenario;
use crate::types::NodeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Identity-keyed node collection, preserving scenario order.
#[derive(Debug)]
pub struct NodePool {
    nodes: Vec<Arc<SimNode>>,
    by_id: HashMap<NodeId, usize>,
}

impl NodePool {
    /// Build the pool from a scenario's node definitions.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut nodes = Vec::with_capacity(scenario.nodes.len());
        let mut by_id = HashMap::with_capacity(scenario.nodes.len());
        for spec in &scenario.nodes {
            let id = NodeId::new(spec.id.clone());
            by_id.insert(id.clone(), nodes.len());
            nodes.push(Arc::new(SimNode::new(
                id,
                spec.base_latency_ms,
                spec.max_connections,
            )));
        }
        Self { nodes, by_id }
    }

    pub fn get(&self, id: &NodeId) -> Option<&Arc<SimNode>> {
        self.by_id.get(id).map(|idx| &self.nodes[*idx])
    }

    /// All node ids in scenario order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id().clone()).collect()
    }

    /// Nodes in scenario order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SimNode>> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

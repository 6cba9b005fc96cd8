use serde::{Deserialize, Serialize};

use super::edge::{EdgeAttrs, EdgeType};
use super::graph::WorldGraph;
use super::metadata::GraphMetadata;
use super::node::Node;
use crate::error::GraphError;

/// An edge with its endpoints named by node id rather than arena index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "edge_type")]
    pub kind: EdgeType,
    #[serde(flatten)]
    pub attrs: EdgeAttrs,
}

/// Serializable view of the whole graph at the end of a tick.
///
/// Enough to rebuild an identical [`WorldGraph`] with
/// [`WorldGraph::from_state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub tick: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub metadata: GraphMetadata,
}

impl WorldState {
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl WorldGraph {
    pub fn to_state(&self, tick: u64) -> WorldState {
        let edges = self
            .edge_slice()
            .iter()
            .map(|e| EdgeRecord {
                source: self.node_id(e.source).to_string(),
                target: self.node_id(e.target).to_string(),
                kind: e.kind,
                attrs: e.attrs.clone(),
            })
            .collect();
        WorldState {
            tick,
            nodes: self.node_slice().to_vec(),
            edges,
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild a graph from a snapshot, validating its structure.
    pub fn from_state(state: &WorldState) -> Result<Self, GraphError> {
        let mut graph = WorldGraph::new();
        for node in &state.nodes {
            graph.add_node(node.clone())?;
        }
        for e in &state.edges {
            graph.add_edge(&e.source, &e.target, e.kind, e.attrs.clone())?;
        }
        graph.metadata = state.metadata.clone();
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::{Profile, SocialClass, SocialRole, Territory, TerritoryType};

    fn sample_graph() -> WorldGraph {
        let mut g = WorldGraph::new();
        let mut p = SocialClass::new(SocialRole::PeripheryProletariat);
        p.wealth = 20.0;
        p.ideology.class_consciousness = 0.4;
        g.add_class("periphery", p).unwrap();
        g.add_class("core", SocialClass::new(SocialRole::CoreBourgeoisie))
            .unwrap();
        let mut t = Territory::new(TerritoryType::Periphery, Profile::HighProfile);
        t.biocapacity = 50.0;
        g.add_territory("delta", t).unwrap();
        g.add_edge(
            "periphery",
            "core",
            EdgeType::Exploitation,
            EdgeAttrs {
                tension: 0.3,
                ..EdgeAttrs::default()
            },
        )
        .unwrap();
        g
    }

    #[test]
    fn state_round_trips_through_json() {
        let g = sample_graph();
        let state = g.to_state(5);
        let json = serde_json::to_string(&state).unwrap();
        let parsed = WorldState::from_json_str(&json).unwrap();
        assert_eq!(parsed, state);

        let rebuilt = WorldGraph::from_state(&parsed).unwrap();
        assert_eq!(rebuilt.to_state(5), state);
    }

    #[test]
    fn edge_record_flattens_attributes() {
        let state = sample_graph().to_state(0);
        let json = serde_json::to_value(&state.edges[0]).unwrap();
        assert_eq!(json["edge_type"], "EXPLOITATION");
        assert_eq!(json["source"], "periphery");
        assert_eq!(json["tension"], 0.3);
    }

    #[test]
    fn snapshot_with_dangling_edge_fails() {
        let mut state = sample_graph().to_state(0);
        state.edges[0].target = "nowhere".into();
        assert!(matches!(
            WorldGraph::from_state(&state),
            Err(GraphError::UnknownNode(id)) if id == "nowhere"
        ));
    }

    #[test]
    fn minimal_json_graph_loads_with_defaults() {
        let json = r#"{
            "tick": 0,
            "nodes": [
                {"id": "w", "node_type": "SOCIAL_CLASS", "role": "PERIPHERY_PROLETARIAT", "wealth": 10},
                {"id": "t", "node_type": "TERRITORY", "sector_type": "INDUSTRIAL",
                 "territory_type": "CORE", "profile": "LOW_PROFILE", "biocapacity": 30}
            ],
            "edges": [
                {"source": "w", "target": "t", "edge_type": "TENANCY"}
            ]
        }"#;
        let state = WorldState::from_json_str(json).unwrap();
        let g = WorldGraph::from_state(&state).unwrap();
        assert_eq!(g.node_count(), 2);
        assert!((g.territory_by_id("t").unwrap().max_biocapacity - 30.0).abs() < f64::EPSILON);
        assert!(g.edge(crate::model::EdgeIdx(0)).attrs.tension.abs() < f64::EPSILON);
    }
}

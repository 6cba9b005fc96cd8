use std::collections::HashMap;

use super::edge::{Edge, EdgeAttrs, EdgeType};
use super::metadata::{EconomyState, GraphMetadata};
use super::node::{Node, NodeData, NodeKind, SocialClass, SocialRole, Territory};
use crate::config::EconomyConfig;
use crate::error::GraphError;

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

/// Index of an edge in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdx(pub usize);

/// Directed graph of classes and territories.
///
/// Nodes and edges live in insertion-ordered vectors and are never removed;
/// the id map is for lookup only. Every system iterates the vectors, so two
/// graphs built in the same order are walked in the same order.
#[derive(Debug, Clone, Default)]
pub struct WorldGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, NodeIdx>,
    pub metadata: GraphMetadata,
}

impl WorldGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Construction --

    /// Insert a node, pulling its attributes into range.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeIdx, GraphError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        node.normalize();
        let idx = NodeIdx(self.nodes.len());
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        Ok(idx)
    }

    pub fn add_class(&mut self, id: &str, class: SocialClass) -> Result<NodeIdx, GraphError> {
        self.add_node(Node {
            id: id.to_string(),
            data: NodeData::SocialClass(class),
        })
    }

    pub fn add_territory(&mut self, id: &str, territory: Territory) -> Result<NodeIdx, GraphError> {
        self.add_node(Node {
            id: id.to_string(),
            data: NodeData::Territory(territory),
        })
    }

    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        kind: EdgeType,
        mut attrs: EdgeAttrs,
    ) -> Result<EdgeIdx, GraphError> {
        let s = self.require(source)?;
        let t = self.require(target)?;
        if s == t {
            return Err(GraphError::SelfLoop(source.to_string(), kind));
        }
        attrs.normalize();
        let idx = EdgeIdx(self.edges.len());
        self.edges.push(Edge {
            source: s,
            target: t,
            kind,
            attrs,
        });
        Ok(idx)
    }

    fn require(&self, id: &str) -> Result<NodeIdx, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    // -- Nodes --

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        &mut self.nodes[idx.0]
    }

    pub fn node_id(&self, idx: NodeIdx) -> &str {
        &self.nodes[idx.0].id
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|idx| self.node(idx))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.index_of(id).map(|idx| &mut self.nodes[idx.0])
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }

    pub fn class(&self, idx: NodeIdx) -> Option<&SocialClass> {
        self.nodes[idx.0].data.as_class()
    }

    pub fn class_mut(&mut self, idx: NodeIdx) -> Option<&mut SocialClass> {
        self.nodes[idx.0].data.as_class_mut()
    }

    pub fn territory(&self, idx: NodeIdx) -> Option<&Territory> {
        self.nodes[idx.0].data.as_territory()
    }

    pub fn territory_mut(&mut self, idx: NodeIdx) -> Option<&mut Territory> {
        self.nodes[idx.0].data.as_territory_mut()
    }

    /// Class by string id, for tests and callers outside the tick loop.
    pub fn class_by_id(&self, id: &str) -> Option<&SocialClass> {
        self.get(id).and_then(|n| n.data.as_class())
    }

    pub fn territory_by_id(&self, id: &str) -> Option<&Territory> {
        self.get(id).and_then(|n| n.data.as_territory())
    }

    /// Indices of all nodes of one kind, in insertion order.
    pub fn indices_of_kind(&self, kind: NodeKind) -> Vec<NodeIdx> {
        self.nodes()
            .filter(|(_, n)| n.kind() == kind)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Indices of active classes with the given role, in insertion order.
    pub fn active_classes_with_role(&self, role: SocialRole) -> Vec<NodeIdx> {
        self.nodes()
            .filter(|(_, n)| n.data.as_class().is_some_and(|c| c.active && c.role == role))
            .map(|(idx, _)| idx)
            .collect()
    }

    // -- Edges --

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.0]
    }

    pub fn edge_mut(&mut self, idx: EdgeIdx) -> &mut Edge {
        &mut self.edges[idx.0]
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIdx, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeIdx(i), e))
    }

    /// Indices of all edges of a type, collected so callers can mutate the
    /// graph while walking them.
    pub fn edges_of_type(&self, kind: EdgeType) -> Vec<EdgeIdx> {
        self.edges()
            .filter(|(_, e)| e.kind == kind)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Targets of outgoing edges of a type from `source`, in insertion order.
    pub fn neighbors(&self, source: NodeIdx, kind: EdgeType) -> Vec<NodeIdx> {
        self.edges
            .iter()
            .filter(|e| e.kind == kind && e.source == source)
            .map(|e| e.target)
            .collect()
    }

    // -- Economy --

    /// Load the economy, creating it from configured defaults on first access.
    pub fn load_economy(&mut self, config: &EconomyConfig) -> EconomyState {
        *self
            .metadata
            .economy
            .get_or_insert_with(|| EconomyState::from_config(config))
    }

    pub fn save_economy(&mut self, state: EconomyState) {
        self.metadata.economy = Some(state);
    }

    // -- Snapshot support --

    pub(crate) fn node_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn edge_slice(&self) -> &[Edge] {
        &self.edges
    }
}

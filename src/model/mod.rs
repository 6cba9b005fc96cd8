pub mod edge;
pub mod event;
pub mod graph;
pub mod metadata;
pub mod node;
pub mod snapshot;

pub use edge::{Edge, EdgeAttrs, EdgeType};
pub use event::{EventType, SimEvent};
pub use graph::{EdgeIdx, NodeIdx, WorldGraph};
pub use metadata::{DisplacementMode, EconomyState, GraphMetadata, TerminalOutcome};
pub use node::{
    Ideology, Node, NodeData, NodeKind, Profile, SectorType, SocialClass, SocialRole, Territory,
    TerritoryType, is_node_attribute,
};
pub use snapshot::{EdgeRecord, WorldState};

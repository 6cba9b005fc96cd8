#[macro_use]
mod macros;

pub mod bus;
pub mod config;
pub mod error;
pub mod flush;
pub mod formulas;
pub mod id;
pub mod model;
pub mod scenario;
pub mod sim;
pub mod templates;
pub mod testutil;

pub use bus::{EventBus, SubscriptionId};
pub use config::SimulationConfig;
pub use error::{ConfigError, Error, GraphError, TemplateError};
pub use model::{
    EdgeType, EventType, NodeKind, SimEvent, SocialRole, TerritoryType, WorldGraph, WorldState,
};
pub use scenario::Scenario;
pub use sim::{SimSystem, Simulation, TickContext};
pub use templates::{EventTemplate, load_templates};

mod context;
mod control_ratio;
mod decomposition;
mod event_templates;
mod helpers;
mod imperial_rent;
mod metabolism;
mod runner;
mod solidarity;
mod struggle;
mod survival;
mod system;
mod territory;

pub use context::TickContext;
pub use control_ratio::ControlRatioSystem;
pub use decomposition::DecompositionSystem;
pub use event_templates::EventTemplateSystem;
pub use helpers::{both_active_classes, mean_edge_tension, transfer_wealth};
pub use imperial_rent::{ImperialRentSystem, RentContext};
pub use metabolism::MetabolismSystem;
pub use runner::{Simulation, default_systems, dispatch_systems};
pub use solidarity::SolidaritySystem;
pub use struggle::StruggleSystem;
pub use survival::SurvivalSystem;
pub use system::SimSystem;
pub use territory::TerritorySystem;

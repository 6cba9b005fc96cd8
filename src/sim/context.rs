use rand::RngCore;

use crate::bus::EventBus;
use crate::config::SimulationConfig;
use crate::model::{EventType, WorldGraph};

/// Context passed to each system on every tick.
///
/// Bundled so we can add fields later without changing the `SimSystem`
/// trait signature.
pub struct TickContext<'a> {
    pub graph: &'a mut WorldGraph,
    pub config: &'a SimulationConfig,
    pub bus: &'a mut EventBus,
    pub rng: &'a mut dyn RngCore,
    pub tick: u64,
}

impl TickContext<'_> {
    /// Publish an event stamped with the current tick.
    pub fn publish(&mut self, event_type: EventType, payload: serde_json::Value) -> u64 {
        self.bus.publish(event_type, self.tick, payload)
    }
}

use std::io;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use super::context::TickContext;
use super::control_ratio::ControlRatioSystem;
use super::decomposition::DecompositionSystem;
use super::event_templates::EventTemplateSystem;
use super::imperial_rent::ImperialRentSystem;
use super::metabolism::MetabolismSystem;
use super::solidarity::SolidaritySystem;
use super::struggle::StruggleSystem;
use super::survival::SurvivalSystem;
use super::system::SimSystem;
use super::territory::TerritorySystem;
use crate::bus::{EventBus, SubscriptionId};
use crate::config::SimulationConfig;
use crate::error::{ConfigError, Error, TemplateError};
use crate::flush::flush_to_jsonl;
use crate::model::{SimEvent, WorldGraph, WorldState};
use crate::templates::EventTemplate;

/// The standard system list in causal order: the economic circuit settles
/// before anything reads wealth, and the template pass sees the final state.
pub fn default_systems(
    templates: Vec<EventTemplate>,
) -> Result<Vec<Box<dyn SimSystem>>, TemplateError> {
    let mut systems = core_systems();
    systems.push(Box::new(EventTemplateSystem::new(templates)?));
    Ok(systems)
}

fn core_systems() -> Vec<Box<dyn SimSystem>> {
    vec![
        Box::new(ImperialRentSystem),
        Box::new(MetabolismSystem),
        Box::new(SolidaritySystem),
        Box::new(SurvivalSystem),
        Box::new(TerritorySystem),
        Box::new(DecompositionSystem),
        Box::new(ControlRatioSystem),
        Box::new(StruggleSystem),
    ]
}

/// Run every system once, in order, at `tick`.
pub fn dispatch_systems(
    graph: &mut WorldGraph,
    config: &SimulationConfig,
    bus: &mut EventBus,
    systems: &mut [Box<dyn SimSystem>],
    rng: &mut dyn RngCore,
    tick: u64,
) {
    for system in systems.iter_mut() {
        let before = bus.len();
        let mut ctx = TickContext {
            graph: &mut *graph,
            config,
            bus: &mut *bus,
            rng: &mut *rng,
            tick,
        };
        system.tick(&mut ctx);
        let published = bus.len() - before;
        debug!(tick, system = system.name(), published, "system ticked");
    }
}

/// A world graph plus everything needed to advance it deterministically.
///
/// Creates its RNG from `config.seed`, so the same graph, config and seed
/// always produce the same event log.
pub struct Simulation {
    graph: WorldGraph,
    config: SimulationConfig,
    bus: EventBus,
    systems: Vec<Box<dyn SimSystem>>,
    rng: SmallRng,
    tick: u64,
}

impl Simulation {
    /// Simulation with the standard systems and no event templates.
    pub fn new(graph: WorldGraph, config: SimulationConfig) -> Result<Self, ConfigError> {
        let mut systems = core_systems();
        systems.push(Box::new(EventTemplateSystem::default()));
        Self::with_systems(graph, config, systems)
    }

    /// Simulation with the standard systems and the given templates.
    pub fn with_templates(
        graph: WorldGraph,
        config: SimulationConfig,
        templates: Vec<EventTemplate>,
    ) -> Result<Self, Error> {
        let systems = default_systems(templates)?;
        Ok(Self::with_systems(graph, config, systems)?)
    }

    /// Simulation with a custom system list, run in the given order.
    pub fn with_systems(
        graph: WorldGraph,
        config: SimulationConfig,
        systems: Vec<Box<dyn SimSystem>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self {
            graph,
            config,
            bus: EventBus::new(),
            systems,
            rng,
            tick: 0,
        })
    }

    /// Run every system once at the current tick, then advance the tick.
    pub fn step(&mut self) -> WorldState {
        dispatch_systems(
            &mut self.graph,
            &self.config,
            &mut self.bus,
            &mut self.systems,
            &mut self.rng,
            self.tick,
        );
        self.tick += 1;
        self.snapshot()
    }

    /// Step `ticks` times, returning the state after each.
    pub fn run(&mut self, ticks: u64) -> Vec<WorldState> {
        (0..ticks).map(|_| self.step()).collect()
    }

    /// Step up to `ticks` times, stopping after the first tick that published
    /// an event matching `stop`.
    pub fn run_until(
        &mut self,
        ticks: u64,
        mut stop: impl FnMut(&SimEvent) -> bool,
    ) -> Vec<WorldState> {
        let mut states = Vec::new();
        for _ in 0..ticks {
            let before = self.bus.len();
            states.push(self.step());
            if self.bus.history()[before..].iter().any(&mut stop) {
                debug!(tick = self.tick, "stop condition met");
                break;
            }
        }
        states
    }

    /// Register a read-only observer of every published event.
    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn snapshot(&self) -> WorldState {
        self.graph.to_state(self.tick)
    }

    /// Write the current state and the full event log as JSONL.
    pub fn flush(&self, output_dir: &Path) -> io::Result<()> {
        flush_to_jsonl(&self.snapshot(), self.bus.history(), output_dir)
    }

    pub fn graph(&self) -> &WorldGraph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn events(&self) -> &[SimEvent] {
        self.bus.history()
    }

    /// Number of ticks completed.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }
}

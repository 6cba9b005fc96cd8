use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bus::EventBus;
use crate::config::SimulationConfig;
use crate::model::{SimEvent, WorldGraph};
use crate::sim::{SimSystem, TickContext};

// ---------------------------------------------------------------------------
// Tick execution helpers
// ---------------------------------------------------------------------------

/// Run a single system tick on a fresh bus. Returns the events it published.
pub fn tick_system(
    graph: &mut WorldGraph,
    config: &SimulationConfig,
    system: &mut dyn SimSystem,
    tick: u64,
    seed: u64,
) -> Vec<SimEvent> {
    let mut bus = EventBus::new();
    tick_system_with_bus(graph, config, system, &mut bus, tick, seed)
}

/// Run a single system tick against an existing bus, so earlier events at
/// the same tick are visible to the system. Returns only the new events.
pub fn tick_system_with_bus(
    graph: &mut WorldGraph,
    config: &SimulationConfig,
    system: &mut dyn SimSystem,
    bus: &mut EventBus,
    tick: u64,
    seed: u64,
) -> Vec<SimEvent> {
    let before = bus.len();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut ctx = TickContext {
        graph,
        config,
        bus: &mut *bus,
        rng: &mut rng,
        tick,
    };
    system.tick(&mut ctx);
    bus.history()[before..].to_vec()
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

/// Assert every bounded attribute of every node and edge is in range.
pub fn assert_in_range(graph: &WorldGraph) {
    let unit = |v: f64| (0.0..=1.0).contains(&v);
    for (_, node) in graph.nodes() {
        if let Some(c) = node.data.as_class() {
            assert!(c.wealth >= 0.0, "{} wealth {}", node.id, c.wealth);
            assert!(c.population >= 0.0, "{} population {}", node.id, c.population);
            for (name, v) in [
                ("organization", c.organization),
                ("repression_faced", c.repression_faced),
                ("class_consciousness", c.ideology.class_consciousness),
                ("agitation", c.ideology.agitation),
                ("p_acquiescence", c.p_acquiescence),
                ("p_revolution", c.p_revolution),
            ] {
                assert!(unit(v), "{} {name} {v}", node.id);
            }
        }
        if let Some(t) = node.data.as_territory() {
            assert!(unit(t.heat), "{} heat {}", node.id, t.heat);
            assert!(t.population >= 0.0, "{} population {}", node.id, t.population);
            assert!(
                t.biocapacity >= 0.0 && t.biocapacity <= t.max_biocapacity + 1e-9,
                "{} biocapacity {} of {}",
                node.id,
                t.biocapacity,
                t.max_biocapacity
            );
        }
    }
    for (_, edge) in graph.edges() {
        assert!(unit(edge.attrs.tension), "tension {}", edge.attrs.tension);
        assert!(unit(edge.attrs.solidarity_strength));
        assert!(edge.attrs.value_flow >= 0.0);
    }
    if let Some(econ) = graph.metadata.economy {
        assert!(econ.imperial_rent_pool >= 0.0, "pool {}", econ.imperial_rent_pool);
    }
}

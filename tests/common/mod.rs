#![allow(dead_code)]

use imperial_circuit::templates::EventTemplate;
use imperial_circuit::{Scenario, Simulation, SimulationConfig, WorldGraph};

pub fn circuit_world() -> WorldGraph {
    Scenario::imperial_circuit().build()
}

pub fn seeded(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed,
        ..SimulationConfig::default()
    }
}

pub fn circuit_sim(seed: u64) -> Simulation {
    Simulation::new(circuit_world(), seeded(seed)).unwrap()
}

pub fn templated_sim(seed: u64, templates: Vec<EventTemplate>) -> Simulation {
    Simulation::with_templates(circuit_world(), seeded(seed), templates).unwrap()
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

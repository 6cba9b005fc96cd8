use std::collections::BTreeMap;
use std::path::PathBuf;

use imperial_circuit::model::{EventType, NodeData};
use imperial_circuit::{Scenario, Simulation, SimulationConfig, load_templates};

const TEMPLATES: &str = r#"[
    {
        "id": "general_strike",
        "description": "Agitated, organized workers down tools",
        "preconditions": {
            "node_conditions": [{
                "path": "ideology.agitation",
                "operator": ">=",
                "threshold": 0.6,
                "filter": {"role": "INTERNAL_PROLETARIAT"},
                "aggregation": "ANY"
            }]
        },
        "resolutions": [{
            "id": "strike_wave",
            "effects": [
                {"target": "role:INTERNAL_PROLETARIAT", "attribute": "organization", "operation": "INCREASE", "magnitude": 0.05},
                {"target": "role:INTERNAL_PROLETARIAT", "attribute": "repression_faced", "operation": "INCREASE", "magnitude": 0.02}
            ]
        }],
        "cooldown_ticks": 5
    }
]"#;

fn main() {
    let ticks: u64 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(52);
    let config = SimulationConfig {
        seed: 42,
        ..SimulationConfig::default()
    };
    let templates = match load_templates(TEMPLATES) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("bad templates: {e}");
            return;
        }
    };
    let graph = Scenario::imperial_circuit().build();
    let mut sim = match Simulation::with_templates(graph, config, templates) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("cannot start: {e}");
            return;
        }
    };

    sim.subscribe(|e| {
        if matches!(
            e.event_type,
            EventType::TerminalDecision | EventType::MassAwakening | EventType::ClassDecomposition
        ) {
            eprintln!("tick {:>3} {} {}", e.tick, e.event_type, e.payload);
        }
    });
    sim.run(ticks);

    // Event counts by type
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for e in sim.events() {
        *counts.entry(e.event_type.to_string()).or_default() += 1;
    }
    for (kind, n) in &counts {
        eprintln!("{kind:<28} {n}");
    }

    // Final class standings
    for (_, node) in sim.graph().nodes() {
        match &node.data {
            NodeData::SocialClass(c) => eprintln!(
                "{:<22} wealth={:>9.2} cons={:.3} org={:.3} agit={:.3} active={}",
                node.id,
                c.wealth,
                c.ideology.class_consciousness,
                c.organization,
                c.ideology.agitation,
                c.active
            ),
            NodeData::Territory(t) => eprintln!(
                "{:<22} heat={:.3} pop={:>8.1} bio={:>7.2} evict={}",
                node.id, t.heat, t.population, t.biocapacity, t.under_eviction
            ),
        }
    }
    if let Some(econ) = sim.graph().metadata.economy {
        eprintln!(
            "pool={:.2} wage_rate={:.3} repression={:.3}",
            econ.imperial_rent_pool, econ.current_super_wage_rate, econ.current_repression_level
        );
    }

    if let Ok(dir) = std::env::var("CIRCUIT_OUT") {
        let dir = PathBuf::from(dir);
        match sim.flush(&dir) {
            Ok(()) => eprintln!("wrote {}", dir.display()),
            Err(e) => eprintln!("flush failed: {e}"),
        }
    }
}

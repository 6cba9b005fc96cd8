mod common;

use imperial_circuit::model::WorldState;
use imperial_circuit::{ConfigError, GraphError, Simulation, SimulationConfig, WorldGraph};

const BOUNDS: &str =
    r#""min_wage_rate": 0.05, "max_wage_rate": 0.5, "min_repression": 0.1, "max_repression": 0.9"#;

#[test]
fn snapshot_rebuilds_identical_graph() {
    let mut sim = common::circuit_sim(13);
    sim.run(15);
    let state = sim.snapshot();

    let rebuilt = WorldGraph::from_state(&state).unwrap();

    assert_eq!(rebuilt.to_state(state.tick), state);
    assert_eq!(state.tick, 15);
}

#[test]
fn snapshot_survives_json() {
    let mut sim = common::circuit_sim(13);
    sim.run(15);
    let state = sim.snapshot();

    let json = serde_json::to_string(&state).unwrap();
    let read = WorldState::from_json_str(&json).unwrap();
    let rebuilt = WorldGraph::from_state(&read).unwrap();

    assert_eq!(read.tick, state.tick);
    assert_eq!(read.metadata.terminal_outcome, state.metadata.terminal_outcome);
    assert_eq!(rebuilt.node_count(), sim.graph().node_count());
    assert_eq!(rebuilt.edge_count(), sim.graph().edge_count());
    for (_, node) in sim.graph().nodes() {
        let other = rebuilt.get(&node.id).unwrap();
        assert_eq!(other.kind(), node.kind());
        for path in ["wealth", "organization", "ideology.agitation", "heat", "population"] {
            match (node.attr(path), other.attr(path)) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{} {path}", node.id),
                (None, None) => {}
                _ => panic!("{} {path} present on one side only", node.id),
            }
        }
    }
}

#[test]
fn restored_world_keeps_running() {
    let mut sim = common::circuit_sim(2);
    sim.run(5);
    let graph = WorldGraph::from_state(&sim.snapshot()).unwrap();

    let mut resumed = Simulation::new(graph, common::seeded(2)).unwrap();
    let states = resumed.run(5);

    assert_eq!(states.len(), 5);
    imperial_circuit::testutil::assert_in_range(resumed.graph());
}

#[test]
fn malformed_snapshots_are_rejected() {
    let dangling = r#"{"tick": 0, "nodes": [], "edges": [
        {"source": "a", "target": "b", "edge_type": "SOLIDARITY"}
    ]}"#;
    let state = WorldState::from_json_str(dangling).unwrap();
    assert!(matches!(
        WorldGraph::from_state(&state),
        Err(GraphError::UnknownNode(id)) if id == "a"
    ));

    let bad_role = r#"{"tick": 0, "nodes": [
        {"id": "x", "node_type": "SOCIAL_CLASS", "role": "KNIGHTS"}
    ], "edges": []}"#;
    assert!(matches!(WorldState::from_json_str(bad_role), Err(GraphError::Parse(_))));
}

#[test]
fn config_file_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let json = format!(
        r#"{{
            "seed": 77,
            "economy": {{{BOUNDS}, "comprador_cut": 0.3}},
            "territory": {{"displacement_mode": "CONTAINMENT"}}
        }}"#
    );
    std::fs::write(&path, json).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let config = SimulationConfig::from_json_str(&text).unwrap();
    assert_eq!(config.seed, 77);
    assert!((config.economy.comprador_cut - 0.3).abs() < f64::EPSILON);
    assert!((config.economy.extraction_efficiency - 0.8).abs() < f64::EPSILON);

    let mut sim = Simulation::new(common::circuit_world(), config).unwrap();
    sim.run(3);
    assert_eq!(sim.tick(), 3);
}

#[test]
fn config_errors_name_the_field() {
    let missing =
        r#"{"economy": {"min_wage_rate": 0.05, "max_wage_rate": 0.5, "min_repression": 0.1}}"#;
    let err = SimulationConfig::from_json_str(missing).unwrap_err();
    assert!(err.to_string().contains("economy.max_repression"));

    let out_of_range = format!(r#"{{"economy": {{{BOUNDS}, "comprador_cut": 1.5}}}}"#);
    assert!(matches!(
        SimulationConfig::from_json_str(&out_of_range),
        Err(ConfigError::OutOfRange { field: "economy.comprador_cut", .. })
    ));
}

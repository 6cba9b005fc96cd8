mod common;

use imperial_circuit::flush::flush_to_jsonl;
use imperial_circuit::model::{GraphMetadata, Node, SimEvent};

#[test]
fn flush_produces_valid_jsonl_files() {
    let mut sim = common::circuit_sim(21);
    sim.run(5);
    let dir = tempfile::tempdir().unwrap();

    sim.flush(dir.path()).unwrap();

    // All 4 files exist
    let nodes_path = dir.path().join("nodes.jsonl");
    let edges_path = dir.path().join("edges.jsonl");
    let events_path = dir.path().join("events.jsonl");
    let metadata_path = dir.path().join("metadata.jsonl");
    assert!(nodes_path.exists());
    assert!(edges_path.exists());
    assert!(events_path.exists());
    assert!(metadata_path.exists());

    // One line per record
    let nodes = common::read_lines(&nodes_path);
    let edges = common::read_lines(&edges_path);
    let events = common::read_lines(&events_path);
    assert_eq!(nodes.len(), sim.graph().node_count());
    assert_eq!(edges.len(), sim.graph().edge_count());
    assert_eq!(events.len(), sim.events().len());

    // Every line parses back into its record type
    for line in &nodes {
        let node: Node = serde_json::from_str(line).unwrap();
        assert!(sim.graph().get(&node.id).is_some());
    }
    for line in &edges {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["edge_type"].is_string());
        assert!(v["source"].is_string());
        assert!(v["target"].is_string());
    }
    let parsed: Vec<SimEvent> = events
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(parsed.len(), sim.events().len());
    for (read, original) in parsed.iter().zip(sim.events()) {
        assert_eq!(read.seq, original.seq);
        assert_eq!(read.event_type, original.event_type);
        assert_eq!(read.tick, original.tick);
    }
}

#[test]
fn metadata_line_keeps_the_economy() {
    let mut sim = common::circuit_sim(21);
    sim.run(4);
    let dir = tempfile::tempdir().unwrap();

    sim.flush(dir.path()).unwrap();

    let lines = common::read_lines(&dir.path().join("metadata.jsonl"));
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["tick"], sim.snapshot().tick);
    let metadata: GraphMetadata = serde_json::from_value(record["metadata"].clone()).unwrap();
    let original = &sim.graph().metadata;
    assert_eq!(metadata.terminal_outcome, original.terminal_outcome);
    assert_eq!(metadata.control_crisis_ticks, original.control_crisis_ticks);
    let (read, econ) = (metadata.economy.unwrap(), original.economy.unwrap());
    assert!((read.imperial_rent_pool - econ.imperial_rent_pool).abs() < 1e-9);
    assert!((read.current_super_wage_rate - econ.current_super_wage_rate).abs() < 1e-12);
}

#[test]
fn node_lines_carry_type_tags() {
    let sim = common::circuit_sim(1);
    let dir = tempfile::tempdir().unwrap();

    flush_to_jsonl(&sim.snapshot(), sim.events(), dir.path()).unwrap();

    let nodes = common::read_lines(&dir.path().join("nodes.jsonl"));
    let first: serde_json::Value = serde_json::from_str(&nodes[0]).unwrap();
    assert_eq!(first["id"], "periphery_workers");
    assert_eq!(first["node_type"], "SOCIAL_CLASS");
    assert_eq!(first["role"], "PERIPHERY_PROLETARIAT");
    let territories = nodes
        .iter()
        .filter(|l| l.contains("\"node_type\":\"TERRITORY\""))
        .count();
    assert_eq!(territories, 6);
    // No events yet, file still written
    assert!(common::read_lines(&dir.path().join("events.jsonl")).is_empty());
}

#[test]
fn flush_creates_missing_directories() {
    let sim = common::circuit_sim(1);
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("runs").join("first");

    sim.flush(&nested).unwrap();

    assert!(nested.join("nodes.jsonl").exists());
}

mod common;

use imperial_circuit::model::{DisplacementMode, EdgeType, SocialRole};
use imperial_circuit::testutil::assert_in_range;
use imperial_circuit::{EventType, Scenario, Simulation};

#[test]
fn values_stay_in_range_over_a_long_run() {
    for seed in [1, 17, 404] {
        let mut sim = common::circuit_sim(seed);
        for _ in 0..120 {
            sim.step();
            assert_in_range(sim.graph());
        }
    }
}

#[test]
fn wage_rate_and_repression_respect_bounds() {
    let mut sim = common::circuit_sim(8);
    let cfg = sim.config().economy.clone();
    for _ in 0..80 {
        sim.step();
        let econ = sim.graph().metadata.economy.unwrap();
        assert!(econ.current_super_wage_rate >= cfg.min_wage_rate - 1e-12);
        assert!(econ.current_super_wage_rate <= cfg.max_wage_rate + 1e-12);
        assert!(econ.current_repression_level >= cfg.min_repression - 1e-12);
        assert!(econ.current_repression_level <= cfg.max_repression + 1e-12);
    }
}

#[test]
fn deactivated_classes_stay_out_of_the_circuit() {
    let mut s = Scenario::imperial_circuit();
    s.class_mut("periphery_workers").active(false);
    let mut sim = Simulation::new(s.build(), common::seeded(2)).unwrap();

    sim.run(10);

    let extracted_from_periphery = sim.events().iter().any(|e| {
        e.event_type == EventType::SurplusExtraction
            && e.text("source") == Some("periphery_workers")
    });
    assert!(!extracted_from_periphery);
    let exploitation = sim.graph().edges_of_type(EdgeType::Exploitation);
    assert!(
        exploitation
            .iter()
            .all(|&idx| sim.graph().edge(idx).attrs.value_flow == 0.0)
    );
}

#[test]
fn displacement_never_empties_a_sink() {
    let mut s = Scenario::imperial_circuit();
    s.territory_mut("downtown").heat(1.0).under_eviction(true);
    s.displacement_override(DisplacementMode::Containment);
    let mut sim = Simulation::new(s.build(), common::seeded(4)).unwrap();

    let before = sim.graph().territory_by_id("reservation").unwrap().population;
    sim.run(5);

    let reservation = sim.graph().territory_by_id("reservation").unwrap();
    assert!(reservation.population > before);
}

#[test]
fn enforcer_collapse_leads_to_one_terminal_decision() {
    let mut s = Scenario::imperial_circuit();
    s.class_mut("police").population(1.0);
    let mut sim = Simulation::new(s.build(), common::seeded(6)).unwrap();

    sim.run(40);

    let decisions: Vec<_> = sim
        .events()
        .iter()
        .filter(|e| e.event_type == EventType::TerminalDecision)
        .collect();
    assert_eq!(decisions.len(), 1);
    assert!(sim.graph().metadata.terminal_outcome.is_some());
    assert!(!sim.graph().active_classes_with_role(SocialRole::CarceralEnforcer).is_empty());
}

mod common;

use imperial_circuit::templates::{
    ComparisonOp, EffectOperation, EventTemplate, GraphCondition, GraphMetric, PreconditionSet,
    Resolution, TemplateEffect,
};
use imperial_circuit::{EventType, TemplateError, load_templates};

const TEMPLATES: &str = r#"[
    {
        "id": "petty_windfall",
        "description": "Shopkeepers profit whenever there is money in the world",
        "preconditions": {
            "graph_conditions": [{"metric": "TOTAL_WEALTH", "operator": ">", "threshold": 0}]
        },
        "resolutions": [{
            "id": "windfall",
            "effects": [{"target": "shopkeepers", "attribute": "wealth", "operation": "INCREASE", "magnitude": 1.0}]
        }],
        "cooldown_ticks": 3
    },
    {
        "id": "never",
        "preconditions": {
            "node_conditions": [{
                "path": "wealth",
                "operator": ">",
                "threshold": 1000000,
                "aggregation": "ANY"
            }]
        },
        "resolutions": [{"id": "nothing", "effects": []}]
    }
]"#;

#[test]
fn templates_fire_on_cooldown_inside_the_pipeline() {
    let templates = load_templates(TEMPLATES).unwrap();
    let mut sim = common::templated_sim(11, templates);

    sim.run(10);

    let fired: Vec<(u64, &str)> = sim
        .events()
        .iter()
        .filter(|e| e.event_type == EventType::TemplateResolved)
        .map(|e| (e.tick, e.text("template").unwrap()))
        .collect();
    assert_eq!(
        fired,
        vec![
            (0, "petty_windfall"),
            (3, "petty_windfall"),
            (6, "petty_windfall"),
            (9, "petty_windfall"),
        ]
    );
    let shopkeepers = sim.graph().class_by_id("shopkeepers").unwrap();
    assert!((shopkeepers.wealth - 29.0).abs() < 1e-9);
}

#[test]
fn template_resolution_is_the_last_event_of_its_tick() {
    let templates = load_templates(TEMPLATES).unwrap();
    let mut sim = common::templated_sim(11, templates);

    sim.step();

    let last = sim.events().last().unwrap();
    assert_eq!(last.event_type, EventType::TemplateResolved);
    assert_eq!(last.tick, 0);
}

#[test]
fn effect_on_missing_node_still_counts_as_fired() {
    let template = EventTemplate::new(
        "ghost_raid",
        PreconditionSet {
            graph_conditions: vec![GraphCondition::new(
                GraphMetric::TotalWealth,
                ComparisonOp::Ge,
                0.0,
            )],
            ..Default::default()
        },
    )
    .resolution(Resolution::new("raid").effect(TemplateEffect::new(
        "nobody_here",
        "wealth",
        EffectOperation::Decrease,
        5.0,
    )))
    .cooldown(100);
    let mut sim = common::templated_sim(1, vec![template]);

    sim.run(3);

    assert_eq!(
        sim.events()
            .iter()
            .filter(|e| e.event_type == EventType::TemplateResolved)
            .count(),
        1
    );
}

#[test]
fn malformed_templates_are_rejected_before_the_run() {
    let no_resolutions = r#"[{"id": "hollow", "preconditions": {}, "resolutions": []}]"#;
    assert!(matches!(
        load_templates(no_resolutions),
        Err(TemplateError::EmptyResolutions(id)) if id == "hollow"
    ));

    let bad_operator = TEMPLATES.replace("\">\"", "\"=>\"");
    assert!(matches!(load_templates(&bad_operator), Err(TemplateError::Parse(_))));
}

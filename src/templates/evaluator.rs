use super::template::{EventTemplate, Resolution, TemplateEffect};
use crate::error::GraphError;
use crate::model::{NodeIdx, NodeKind, SocialRole, WorldGraph};

/// Pick the resolution a template produces against `graph` at `tick`.
///
/// Returns `None` while the template cools down or when its preconditions
/// fail. Otherwise the first resolution in declared order whose own
/// condition holds is returned, even if later ones also match.
pub fn evaluate<'t>(
    template: &'t EventTemplate,
    graph: &WorldGraph,
    tick: u64,
) -> Option<&'t Resolution> {
    if template.cooling_down(tick) {
        return None;
    }
    if !template.preconditions.holds(graph) {
        return None;
    }
    template
        .resolutions
        .iter()
        .find(|r| r.condition.as_ref().is_none_or(|c| c.holds(graph)))
}

/// Resolve an effect target into node indices, in arena order.
pub fn resolve_target(graph: &WorldGraph, target: &str) -> Result<Vec<NodeIdx>, GraphError> {
    if let Some(role) = target.strip_prefix("role:") {
        let role: SocialRole = role
            .parse()
            .map_err(|_| GraphError::UnknownNode(target.to_string()))?;
        return Ok(graph
            .nodes()
            .filter(|(_, n)| n.role() == Some(role))
            .map(|(idx, _)| idx)
            .collect());
    }
    if let Some(kind) = target.strip_prefix("type:") {
        let kind: NodeKind = kind
            .parse()
            .map_err(|_| GraphError::UnknownNode(target.to_string()))?;
        return Ok(graph.indices_of_kind(kind));
    }
    graph
        .index_of(target)
        .map(|idx| vec![idx])
        .ok_or_else(|| GraphError::UnknownNode(target.to_string()))
}

/// Apply a resolution's effects to the graph. Bounded attributes clamp.
///
/// Effects apply in order and stop at the first that names an unknown node
/// or attribute. Returns how many node attributes were written.
pub fn apply_effects(
    graph: &mut WorldGraph,
    effects: &[TemplateEffect],
) -> Result<usize, GraphError> {
    let mut written = 0;
    for effect in effects {
        for idx in resolve_target(graph, &effect.target)? {
            let node = graph.node_mut(idx);
            let current = node.attr(&effect.attribute).ok_or_else(|| GraphError::UnknownAttribute {
                node: node.id.clone(),
                path: effect.attribute.clone(),
            })?;
            node.set_attr(&effect.attribute, effect.apply_to(current))?;
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeType, TerritoryType};
    use crate::scenario::Scenario;
    use crate::templates::condition::{
        Aggregation, ComparisonOp, EdgeCondition, EdgeMetric, GraphCondition, GraphMetric,
        NodeCondition, PreconditionSet,
    };
    use crate::templates::template::EffectOperation;

    fn graph() -> WorldGraph {
        let mut s = Scenario::new();
        s.class("w1", SocialRole::InternalProletariat)
            .agitation(0.8)
            .organization(0.4);
        s.class("w2", SocialRole::InternalProletariat)
            .agitation(0.9)
            .organization(0.4);
        s.class("boss", SocialRole::CoreBourgeoisie).wealth(50.0);
        s.territory("city", TerritoryType::Core);
        s.edge("w1", "w2", EdgeType::Solidarity).solidarity_strength(0.5);
        s.build()
    }

    fn agitated_workers() -> PreconditionSet {
        let agitated = NodeCondition::new("ideology.agitation", ComparisonOp::Gt, 0.7);
        PreconditionSet {
            node_conditions: vec![agitated.with_aggregation(Aggregation::Count)],
            ..Default::default()
        }
    }

    fn organized() -> PreconditionSet {
        PreconditionSet {
            edge_conditions: vec![EdgeCondition::new(
                EdgeType::Solidarity,
                EdgeMetric::SumStrength,
                ComparisonOp::Ge,
                0.5,
            )],
            ..Default::default()
        }
    }

    fn strike() -> EventTemplate {
        EventTemplate::new("strike", agitated_workers())
            .resolution(Resolution::new("organized_strike").when(organized()))
            .resolution(Resolution::new("wildcat"))
            .cooldown(3)
    }

    #[test]
    fn first_matching_resolution_wins() {
        let g = graph();
        let t = strike();
        assert_eq!(evaluate(&t, &g, 0).map(|r| r.id.as_str()), Some("organized_strike"));
    }

    #[test]
    fn falls_through_to_unconditional_resolution() {
        let mut g = graph();
        g.edge_mut(crate::model::EdgeIdx(0)).attrs.solidarity_strength = 0.1;
        let t = strike();
        assert_eq!(evaluate(&t, &g, 0).map(|r| r.id.as_str()), Some("wildcat"));
    }

    #[test]
    fn later_match_never_preferred() {
        let g = graph();
        let t = EventTemplate::new("t", PreconditionSet::default())
            .resolution(Resolution::new("first"))
            .resolution(Resolution::new("second").when(organized()));
        assert_eq!(evaluate(&t, &g, 0).map(|r| r.id.as_str()), Some("first"));
    }

    #[test]
    fn failed_preconditions_yield_nothing() {
        let g = graph();
        let t = EventTemplate::new(
            "rich",
            PreconditionSet {
                graph_conditions: vec![GraphCondition::new(
                    GraphMetric::TotalWealth,
                    ComparisonOp::Gt,
                    1e6,
                )],
                ..Default::default()
            },
        )
        .resolution(Resolution::new("r"));
        assert!(evaluate(&t, &g, 0).is_none());
    }

    #[test]
    fn cooldown_blocks_evaluation() {
        let g = graph();
        let mut t = strike();
        t.last_triggered = Some(4);
        assert!(evaluate(&t, &g, 5).is_none());
        assert!(evaluate(&t, &g, 6).is_none());
    }

    #[test]
    fn cooldown_ends_when_elapsed_equals_cooldown() {
        let g = graph();
        let mut t = strike();
        t.last_triggered = Some(4);
        // 4 + 3 == 7: the full cooldown has elapsed.
        assert_eq!(evaluate(&t, &g, 7).map(|r| r.id.as_str()), Some("organized_strike"));
    }

    #[test]
    fn no_resolution_matches() {
        let g = graph();
        let t = EventTemplate::new("t", PreconditionSet::default())
            .resolution(Resolution::new("never").when(PreconditionSet {
                graph_conditions: vec![GraphCondition::new(
                    GraphMetric::TotalWealth,
                    ComparisonOp::Lt,
                    0.0,
                )],
                ..Default::default()
            }));
        assert!(evaluate(&t, &g, 0).is_none());
    }

    #[test]
    fn effects_by_id_role_and_type() {
        let mut g = graph();
        let effects = vec![
            TemplateEffect::new("boss", "wealth", EffectOperation::Decrease, 20.0),
            TemplateEffect::new(
                "role:INTERNAL_PROLETARIAT",
                "organization",
                EffectOperation::Increase,
                0.8,
            ),
            TemplateEffect::new("type:TERRITORY", "heat", EffectOperation::Set, 0.3),
        ];
        let written = apply_effects(&mut g, &effects).unwrap();

        assert_eq!(written, 4);
        assert!((g.class_by_id("boss").unwrap().wealth - 30.0).abs() < 1e-9);
        // clamped into [0, 1]
        assert!((g.class_by_id("w1").unwrap().organization - 1.0).abs() < 1e-12);
        assert!((g.territory_by_id("city").unwrap().heat - 0.3).abs() < 1e-12);
    }

    #[test]
    fn unknown_targets_and_attributes_error() {
        let mut g = graph();
        let missing = [TemplateEffect::new("nobody", "wealth", EffectOperation::Set, 1.0)];
        assert!(matches!(apply_effects(&mut g, &missing), Err(GraphError::UnknownNode(_))));

        let bad_role = [TemplateEffect::new("role:KING", "wealth", EffectOperation::Set, 1.0)];
        assert!(apply_effects(&mut g, &bad_role).is_err());

        let bad_attr = [TemplateEffect::new("boss", "heat", EffectOperation::Set, 1.0)];
        assert!(matches!(
            apply_effects(&mut g, &bad_attr),
            Err(GraphError::UnknownAttribute { .. })
        ));
    }
}

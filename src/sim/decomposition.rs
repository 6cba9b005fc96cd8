use tracing::{info, warn};

use super::context::TickContext;
use super::system::SimSystem;
use crate::model::{EventType, NodeIdx, SocialRole};

/// When super-wages fail, a labor aristocracy that has fallen below
/// subsistence splits into enforcers and internal proletarians.
pub struct DecompositionSystem;

impl SimSystem for DecompositionSystem {
    fn name(&self) -> &str {
        "decomposition"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        if !ctx.bus.published_at(EventType::SuperwageCrisis, ctx.tick) {
            return;
        }
        let fraction = ctx.config.decomposition.enforcer_fraction;
        let enforcers = ctx
            .graph
            .active_classes_with_role(SocialRole::CarceralEnforcer)
            .first()
            .copied();
        let proletariat = ctx
            .graph
            .active_classes_with_role(SocialRole::InternalProletariat)
            .first()
            .copied();
        if enforcers.is_none() && proletariat.is_none() {
            warn!(
                tick = ctx.tick,
                "no enforcer or internal proletariat to absorb decomposition"
            );
            return;
        }

        for idx in ctx.graph.active_classes_with_role(SocialRole::LaborAristocracy) {
            let Some(la) = ctx.graph.class_mut(idx) else {
                continue;
            };
            if la.wealth >= la.subsistence_threshold {
                continue;
            }
            let population = la.population;
            let wealth = la.wealth;
            la.active = false;
            la.population = 0.0;
            la.wealth = 0.0;

            // A missing recipient's share goes to the other one.
            let to_enforcers = match (enforcers, proletariat) {
                (Some(_), Some(_)) => fraction,
                (Some(_), None) => 1.0,
                _ => 0.0,
            };
            let moved_enforcers = absorb(ctx, enforcers, population, wealth, to_enforcers);
            let moved_proletariat =
                absorb(ctx, proletariat, population, wealth, 1.0 - to_enforcers);

            info!(
                tick = ctx.tick,
                class = ctx.graph.node_id(idx),
                population,
                "labor aristocracy decomposed"
            );
            let payload = serde_json::json!({
                "source": ctx.graph.node_id(idx),
                "population": population,
                "wealth": wealth,
                "to_enforcers": moved_enforcers,
                "to_internal_proletariat": moved_proletariat,
                "enforcer_target": enforcers.map(|e| ctx.graph.node_id(e)),
                "proletariat_target": proletariat.map(|p| ctx.graph.node_id(p)),
            });
            ctx.publish(EventType::ClassDecomposition, payload);
        }
    }
}

/// Add `share` of the population and wealth to `target`; returns the
/// population moved.
fn absorb(
    ctx: &mut TickContext,
    target: Option<NodeIdx>,
    population: f64,
    wealth: f64,
    share: f64,
) -> f64 {
    let Some(class) = target.and_then(|t| ctx.graph.class_mut(t)) else {
        return 0.0;
    };
    class.population += population * share;
    class.wealth += wealth * share;
    population * share
}

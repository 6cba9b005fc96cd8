use super::RentContext;
use crate::formulas::{self, clamp_unit};
use crate::model::{EdgeType, EventType};
use crate::sim::context::TickContext;
use crate::sim::helpers::both_active_classes;

/// Phase 4: when a client state leans toward revolt, the core converts part
/// of the pool into repression capacity for its comprador regime.
pub(super) fn fund_client_states(ctx: &mut TickContext, rc: &mut RentContext) {
    let econ = &ctx.config.economy;
    let trigger = econ.subsidy_trigger_threshold;
    let conversion = econ.subsidy_conversion_rate;
    let steepness = ctx.config.survival.steepness;

    for edge_idx in ctx.graph.edges_of_type(EdgeType::ClientState) {
        let (source, target, cap) = {
            let e = ctx.graph.edge(edge_idx);
            (e.source, e.target, e.attrs.subsidy_cap)
        };
        if !both_active_classes(ctx.graph, source, target) {
            continue;
        }
        let (Some(payer), Some(client)) = (ctx.graph.class(source), ctx.graph.class(target))
        else {
            continue;
        };
        let payer_wealth = payer.wealth;
        let p_acq = formulas::acquiescence_probability(
            client.wealth,
            client.subsistence_threshold,
            steepness,
        );
        let p_rev = formulas::revolution_probability(client.organization, client.repression_faced);
        let ratio = formulas::stability_ratio(p_rev, p_acq);

        if ratio <= trigger {
            ctx.graph.edge_mut(edge_idx).attrs.value_flow = 0.0;
            continue;
        }

        let amount = cap.min(payer_wealth).min(rc.economy.imperial_rent_pool).max(0.0);
        if amount <= 0.0 {
            continue;
        }
        rc.economy.imperial_rent_pool -= amount;
        if let Some(payer) = ctx.graph.class_mut(source) {
            payer.wealth -= amount;
        }
        let mut repression = 0.0;
        if let Some(client) = ctx.graph.class_mut(target) {
            client.repression_faced = clamp_unit(client.repression_faced + amount * conversion);
            repression = client.repression_faced;
        }
        ctx.graph.edge_mut(edge_idx).attrs.value_flow = amount;

        let payload = serde_json::json!({
            "source": ctx.graph.node_id(source),
            "target": ctx.graph.node_id(target),
            "amount": amount,
            "stability_ratio": ratio,
            "repression": repression,
        });
        ctx.publish(EventType::ImperialSubsidy, payload);
    }
}

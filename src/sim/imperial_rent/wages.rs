use tracing::warn;

use super::RentContext;
use crate::model::{EdgeType, EventType, NodeIdx};
use crate::sim::context::TickContext;
use crate::sim::helpers::{both_active_classes, transfer_wealth};

/// Phase 3: the core pays super-wages along WAGES edges out of this tick's
/// inflow, split evenly across the active wage edges and capped by the pool
/// and the payer's wealth. An exhausted pool pays nothing and raises
/// SUPERWAGE_CRISIS instead.
pub(super) fn pay_super_wages(ctx: &mut TickContext, rc: &mut RentContext) {
    let econ = &ctx.config.economy;
    let negligible = econ.negligible_pool;
    let ppp = econ.ppp_multiplier;

    let wage_edges: Vec<_> = ctx
        .graph
        .edges_of_type(EdgeType::Wages)
        .into_iter()
        .filter(|&idx| {
            let e = ctx.graph.edge(idx);
            both_active_classes(ctx.graph, e.source, e.target)
        })
        .collect();
    if wage_edges.is_empty() {
        return;
    }
    let per_edge_inflow = rc.tick_inflow / wage_edges.len() as f64;

    // A recipient's purchasing-power bonus sums over all of its payers.
    let mut recipients: Vec<NodeIdx> = wage_edges
        .iter()
        .map(|&idx| ctx.graph.edge(idx).target)
        .collect();
    recipients.sort();
    recipients.dedup();
    for &target in &recipients {
        if let Some(recipient) = ctx.graph.class_mut(target) {
            recipient.unearned_increment = 0.0;
        }
    }

    for &edge_idx in &wage_edges {
        let (source, target) = {
            let e = ctx.graph.edge(edge_idx);
            (e.source, e.target)
        };
        let desired = rc.economy.current_super_wage_rate * per_edge_inflow;

        if rc.economy.imperial_rent_pool <= negligible {
            ctx.graph.edge_mut(edge_idx).attrs.value_flow = 0.0;
            warn!(
                tick = ctx.tick,
                payer = ctx.graph.node_id(source),
                pool = rc.economy.imperial_rent_pool,
                "super-wages cannot be funded"
            );
            let payload = serde_json::json!({
                "source": ctx.graph.node_id(source),
                "target": ctx.graph.node_id(target),
                "desired_wages": desired,
                "pool": rc.economy.imperial_rent_pool,
            });
            ctx.publish(EventType::SuperwageCrisis, payload);
            continue;
        }

        let capped = desired.min(rc.economy.imperial_rent_pool);
        let paid = transfer_wealth(ctx.graph, source, target, capped);
        rc.economy.imperial_rent_pool = (rc.economy.imperial_rent_pool - paid).max(0.0);
        ctx.graph.edge_mut(edge_idx).attrs.value_flow = paid;

        // Purchasing power of super-wages is a separate channel from
        // nominal wealth.
        if let Some(recipient) = ctx.graph.class_mut(target) {
            recipient.unearned_increment += paid * (ppp - 1.0);
        }
    }

    for target in recipients {
        if let Some(recipient) = ctx.graph.class_mut(target) {
            recipient.effective_wealth = recipient.wealth + recipient.unearned_increment;
        }
    }
}

//! The imperial circuit: extraction, tribute, super-wages, client-state
//! subsidy, and the core bourgeoisie's policy decision.
//!
//! Phases run in that order every tick and share a [`RentContext`]. The
//! economy singleton is loaded into the context once and saved back to the
//! graph at every phase boundary, so wages see this tick's tribute inflow
//! and the decision sees the pool after wages and subsidies.

mod extraction;
mod subsidy;
mod wages;

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::context::TickContext;
use super::helpers::mean_edge_tension;
use super::system::SimSystem;
use crate::formulas::{self, PolicyDecision};
use crate::model::{EconomyState, EventType, NodeIdx};

/// Per-tick state threaded through the five phases.
#[derive(Debug, Clone)]
pub struct RentContext {
    pub economy: EconomyState,
    /// Tribute that reached the core this tick.
    pub tick_inflow: f64,
    /// Rent received by each extractor this tick.
    pub received_rent: BTreeMap<NodeIdx, f64>,
}

impl RentContext {
    fn new(economy: EconomyState) -> Self {
        Self {
            economy,
            tick_inflow: 0.0,
            received_rent: BTreeMap::new(),
        }
    }
}

pub struct ImperialRentSystem;

impl SimSystem for ImperialRentSystem {
    fn name(&self) -> &str {
        "imperial_rent"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let economy = ctx.graph.load_economy(&ctx.config.economy);
        let mut rc = RentContext::new(economy);

        extraction::extract_rent(ctx, &mut rc);
        ctx.graph.save_economy(rc.economy);

        extraction::collect_tribute(ctx, &mut rc);
        ctx.graph.save_economy(rc.economy);

        wages::pay_super_wages(ctx, &mut rc);
        ctx.graph.save_economy(rc.economy);

        subsidy::fund_client_states(ctx, &mut rc);
        ctx.graph.save_economy(rc.economy);

        decide_policy(ctx, &mut rc);

        // Profit-rate erosion of the accumulated pool.
        let decay = ctx.config.economy.pool_decay_rate;
        rc.economy.imperial_rent_pool = (rc.economy.imperial_rent_pool * (1.0 - decay)).max(0.0);
        ctx.graph.save_economy(rc.economy);

        debug!(
            tick = ctx.tick,
            pool = rc.economy.imperial_rent_pool,
            inflow = rc.tick_inflow,
            wage_rate = rc.economy.current_super_wage_rate,
            repression = rc.economy.current_repression_level,
            "imperial circuit settled"
        );
    }
}

/// Phase 5: pick a policy from the pool ratio and mean tension and apply
/// its adjustments within the configured bounds.
fn decide_policy(ctx: &mut TickContext, rc: &mut RentContext) {
    let econ = &ctx.config.economy;
    let tension = mean_edge_tension(ctx.graph);
    let pool_ratio = rc.economy.imperial_rent_pool / econ.initial_rent_pool;

    let decision = formulas::bourgeoisie_decision(pool_ratio, tension, &econ.decision_thresholds());
    let (wage_delta, repression_delta) = formulas::policy_deltas(decision, &econ.policy_deltas());

    let state = &mut rc.economy;
    state.current_super_wage_rate = (state.current_super_wage_rate + wage_delta)
        .clamp(econ.min_wage_rate, econ.max_wage_rate);
    state.current_repression_level = (state.current_repression_level + repression_delta)
        .clamp(econ.min_repression, econ.max_repression);
    let wage_rate = state.current_super_wage_rate;
    let repression = state.current_repression_level;

    if decision != PolicyDecision::NoChange {
        info!(
            tick = ctx.tick,
            decision = decision.as_str(),
            pool_ratio,
            tension,
            "bourgeoisie policy"
        );
    }

    if decision == PolicyDecision::Crisis {
        ctx.publish(
            EventType::EconomicCrisis,
            serde_json::json!({
                "decision": decision.as_str(),
                "pool_ratio": pool_ratio,
                "tension": tension,
                "wage_rate": wage_rate,
                "repression_level": repression,
            }),
        );
    }
}

use std::collections::BTreeMap;

use tracing::debug;

use super::RentContext;
use crate::formulas::{self, clamp_unit};
use crate::model::{EdgeType, EventType, NodeIdx, SocialRole};
use crate::sim::context::TickContext;
use crate::sim::helpers::{both_active_classes, transfer_wealth};

/// Phase 1: rent flows along EXPLOITATION edges from the exploited class
/// (source) to the extractor (target).
pub(super) fn extract_rent(ctx: &mut TickContext, rc: &mut RentContext) {
    let econ = &ctx.config.economy;
    let efficiency = formulas::extraction_efficiency(
        econ.extraction_efficiency,
        econ.trpf_coefficient,
        econ.trpf_efficiency_floor,
        ctx.tick,
    );
    let tension_rate = econ.tension_accumulation_rate;

    for edge_idx in ctx.graph.edges_of_type(EdgeType::Exploitation) {
        let (source, target) = {
            let e = ctx.graph.edge(edge_idx);
            (e.source, e.target)
        };
        if !both_active_classes(ctx.graph, source, target) {
            continue;
        }
        let Some(src) = ctx.graph.class(source) else {
            continue;
        };
        let wealth = src.wealth;
        let rent = formulas::imperial_rent(efficiency, wealth, src.consciousness()).min(wealth);
        let moved = transfer_wealth(ctx.graph, source, target, rent);

        let edge = ctx.graph.edge_mut(edge_idx);
        edge.attrs.value_flow = moved;
        if wealth > 0.0 {
            edge.attrs.tension = clamp_unit(edge.attrs.tension + tension_rate * moved / wealth);
        }

        *rc.received_rent.entry(target).or_insert(0.0) += moved;
        // Rent taken straight by the core needs no comprador to reach the pool.
        if ctx.graph.class(target).is_some_and(|c| c.role == SocialRole::CoreBourgeoisie) {
            rc.economy.imperial_rent_pool += moved;
            rc.tick_inflow += moved;
        }

        if moved > 0.0 {
            let payload = serde_json::json!({
                "source": ctx.graph.node_id(source),
                "target": ctx.graph.node_id(target),
                "amount": moved,
                "efficiency": efficiency,
            });
            ctx.publish(EventType::SurplusExtraction, payload);
        }
    }
}

/// Phase 2: each comprador keeps its cut of the rent it received this tick
/// and forwards the rest along its TRIBUTE edges to the core, where it
/// joins the pool.
pub(super) fn collect_tribute(ctx: &mut TickContext, rc: &mut RentContext) {
    let cut = ctx.config.economy.comprador_cut;
    let tribute_edges = ctx.graph.edges_of_type(EdgeType::Tribute);

    let mut out_degree: BTreeMap<NodeIdx, usize> = BTreeMap::new();
    for &edge_idx in &tribute_edges {
        let e = ctx.graph.edge(edge_idx);
        if both_active_classes(ctx.graph, e.source, e.target) {
            *out_degree.entry(e.source).or_insert(0) += 1;
        }
    }

    for edge_idx in tribute_edges {
        let (source, target) = {
            let e = ctx.graph.edge(edge_idx);
            (e.source, e.target)
        };
        let Some(&degree) = out_degree.get(&source) else {
            continue;
        };
        if !both_active_classes(ctx.graph, source, target) {
            continue;
        }
        let received = rc.received_rent.get(&source).copied().unwrap_or(0.0);
        let owed = received * (1.0 - cut) / degree as f64;
        let paid = transfer_wealth(ctx.graph, source, target, owed);
        ctx.graph.edge_mut(edge_idx).attrs.value_flow = paid;

        rc.economy.imperial_rent_pool += paid;
        rc.tick_inflow += paid;
    }

    debug!(tick = ctx.tick, inflow = rc.tick_inflow, "rent extracted");
}

#[cfg(test)]
mod tests {
    use crate::config::SimulationConfig;
    use crate::model::{EdgeIdx, EventType, SocialRole};
    use crate::scenario::Scenario;
    use crate::sim::imperial_rent::ImperialRentSystem;
    use crate::testutil::tick_system;

    fn config() -> SimulationConfig {
        let mut c = SimulationConfig::default();
        c.economy.extraction_efficiency = 0.5;
        c.economy.trpf_coefficient = 0.0;
        c.economy.comprador_cut = 0.2;
        c.economy.pool_decay_rate = 0.0;
        c
    }

    fn circuit(consciousness: f64) -> Scenario {
        let mut s = Scenario::new();
        s.class("periphery", SocialRole::PeripheryProletariat)
            .wealth(100.0)
            .consciousness(consciousness);
        s.class("comprador", SocialRole::CompradorBourgeoisie).wealth(10.0);
        s.class("core", SocialRole::CoreBourgeoisie).wealth(50.0);
        s.edge("periphery", "comprador", crate::model::EdgeType::Exploitation);
        s.edge("comprador", "core", crate::model::EdgeType::Tribute);
        s
    }

    #[test]
    fn rent_moves_from_periphery_and_publishes() {
        let config = config();
        let mut g = circuit(0.0).build();
        let events = tick_system(&mut g, &config, &mut ImperialRentSystem, 0, 1);

        // 0.5 * 100 * (1 - 0) = 50
        assert!((g.class_by_id("periphery").unwrap().wealth - 50.0).abs() < 1e-9);
        let extraction: Vec<_> = events
            .iter()
            .filter(|e| e.event_type == EventType::SurplusExtraction)
            .collect();
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction[0].number("amount"), Some(50.0));
        assert_eq!(extraction[0].text("source"), Some("periphery"));
        assert!((g.edge(EdgeIdx(0)).attrs.value_flow - 50.0).abs() < 1e-9);
        assert!(g.edge(EdgeIdx(0)).attrs.tension > 0.0);
    }

    #[test]
    fn consciousness_reduces_rent() {
        let config = config();
        let mut g = circuit(0.5).build();
        tick_system(&mut g, &config, &mut ImperialRentSystem, 0, 1);
        assert!((g.class_by_id("periphery").unwrap().wealth - 75.0).abs() < 1e-9);
    }

    #[test]
    fn comprador_keeps_cut_and_core_feeds_pool() {
        let config = config();
        let mut g = circuit(0.0).build();
        let pool_before = g.load_economy(&config.economy).imperial_rent_pool;
        tick_system(&mut g, &config, &mut ImperialRentSystem, 0, 1);

        // comprador: 10 + 50 - 40
        assert!((g.class_by_id("comprador").unwrap().wealth - 20.0).abs() < 1e-9);
        assert!((g.class_by_id("core").unwrap().wealth - 90.0).abs() < 1e-9);
        let pool = g.metadata.economy.unwrap().imperial_rent_pool;
        assert!((pool - (pool_before + 40.0)).abs() < 1e-9);
    }

    #[test]
    fn inactive_source_is_not_extracted() {
        let config = config();
        let mut s = circuit(0.0);
        s.class_mut("periphery").active(false);
        let mut g = s.build();
        let events = tick_system(&mut g, &config, &mut ImperialRentSystem, 0, 1);
        assert!(events.iter().all(|e| e.event_type != EventType::SurplusExtraction));
        assert!((g.class_by_id("periphery").unwrap().wealth - 100.0).abs() < 1e-9);
    }

    #[test]
    fn trpf_erodes_extraction_over_time() {
        let mut config = config();
        config.economy.trpf_coefficient = 0.01;
        let mut early = circuit(0.0).build();
        let mut late = circuit(0.0).build();
        tick_system(&mut early, &config, &mut ImperialRentSystem, 0, 1);
        tick_system(&mut late, &config, &mut ImperialRentSystem, 50, 1);
        let early_left = early.class_by_id("periphery").unwrap().wealth;
        let late_left = late.class_by_id("periphery").unwrap().wealth;
        assert!(late_left > early_left);
    }
}

//! Territorial dynamics: heat, eviction pipelines, and the sinks that
//! receive displaced populations.
//!
//! All heat updates read the heat values from the start of the tick, so the
//! order in which territories are visited does not matter for spillover.

use tracing::{debug, warn};

use super::context::TickContext;
use super::system::SimSystem;
use crate::formulas::clamp_unit;
use crate::model::{DisplacementMode, EdgeType, NodeIdx, NodeKind, Profile, TerritoryType};

/// Fixed order in which sinks are tried after the mode's preferred one.
const SINK_ORDER: [TerritoryType; 3] = [
    TerritoryType::PenalColony,
    TerritoryType::Reservation,
    TerritoryType::ConcentrationCamp,
];

pub struct TerritorySystem;

impl SimSystem for TerritorySystem {
    fn name(&self) -> &str {
        "territory"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        update_heat(ctx);
        run_evictions(ctx);
        necropolitics(ctx);
    }
}

fn update_heat(ctx: &mut TickContext) {
    let cfg = &ctx.config.territory;
    let territories = ctx.graph.indices_of_kind(NodeKind::Territory);

    let old_heat = |graph: &crate::model::WorldGraph, idx: NodeIdx| {
        graph.territory(idx).map(|t| t.heat).unwrap_or(0.0)
    };

    let mut new_heat = Vec::with_capacity(territories.len());
    for &idx in &territories {
        let Some(t) = ctx.graph.territory(idx) else {
            continue;
        };
        let base = match t.profile {
            Profile::HighProfile => t.heat + cfg.heat_gain_rate,
            Profile::LowProfile => t.heat * (1.0 - cfg.heat_decay_rate),
        };
        let spillover: f64 = ctx
            .graph
            .edges()
            .filter(|(_, e)| e.kind == EdgeType::Adjacency && e.target == idx)
            .map(|(_, e)| old_heat(ctx.graph, e.source) * cfg.spillover_rate)
            .sum();
        new_heat.push((idx, clamp_unit(base + spillover)));
    }

    for (idx, heat) in new_heat {
        if let Some(t) = ctx.graph.territory_mut(idx) {
            t.heat = heat;
        }
    }
}

fn run_evictions(ctx: &mut TickContext) {
    let cfg = &ctx.config.territory;
    let mode = ctx
        .graph
        .metadata
        .displacement_override
        .unwrap_or(cfg.displacement_mode);

    for idx in ctx.graph.indices_of_kind(NodeKind::Territory) {
        let Some(t) = ctx.graph.territory_mut(idx) else {
            continue;
        };

        if !t.under_eviction {
            if t.heat >= cfg.eviction_heat_threshold {
                t.under_eviction = true;
                let heat = t.heat;
                debug!(
                    tick = ctx.tick,
                    territory = ctx.graph.node_id(idx),
                    heat,
                    "eviction started"
                );
            }
            continue;
        }
        if t.heat < cfg.eviction_heat_threshold {
            t.under_eviction = false;
            continue;
        }

        t.rent_level *= cfg.rent_spike_multiplier;
        let displaced = t.population * cfg.displacement_rate;
        let Some(dest) = displacement_target(ctx.graph, idx, mode) else {
            warn!(
                tick = ctx.tick,
                territory = ctx.graph.node_id(idx),
                "eviction with nowhere to displace"
            );
            continue;
        };
        if let Some(t) = ctx.graph.territory_mut(idx) {
            t.population -= displaced;
        }
        if let Some(d) = ctx.graph.territory_mut(dest) {
            d.population += displaced;
        }
    }
}

/// Pick the adjacent territory that receives displaced population.
fn displacement_target(
    graph: &crate::model::WorldGraph,
    from: NodeIdx,
    mode: DisplacementMode,
) -> Option<NodeIdx> {
    let adjacent: Vec<NodeIdx> = graph
        .neighbors(from, EdgeType::Adjacency)
        .into_iter()
        .filter(|&n| graph.territory(n).is_some())
        .collect();
    let of_type = |tt: TerritoryType| {
        adjacent
            .iter()
            .copied()
            .find(|&n| graph.territory(n).is_some_and(|t| t.territory_type == tt))
    };

    let preferred = match mode {
        DisplacementMode::Extraction => TerritoryType::PenalColony,
        DisplacementMode::Containment => TerritoryType::Reservation,
        DisplacementMode::Elimination => TerritoryType::ConcentrationCamp,
    };
    of_type(preferred)
        .or_else(|| SINK_ORDER.iter().find_map(|&tt| of_type(tt)))
        .or_else(|| {
            adjacent
                .iter()
                .copied()
                .find(|&n| graph.territory(n).is_some_and(|t| !t.territory_type.is_sink()))
        })
}

fn necropolitics(ctx: &mut TickContext) {
    let decay = ctx.config.territory.camp_decay_rate;
    for idx in ctx.graph.indices_of_kind(NodeKind::Territory) {
        if let Some(t) = ctx.graph.territory_mut(idx)
            && t.territory_type == TerritoryType::ConcentrationCamp
        {
            t.population *= 1.0 - decay;
        }
    }

    // Tenants of a penal colony cannot organize.
    for edge_idx in ctx.graph.edges_of_type(EdgeType::Tenancy) {
        let (source, target) = {
            let e = ctx.graph.edge(edge_idx);
            (e.source, e.target)
        };
        let is_colony = ctx
            .graph
            .territory(target)
            .is_some_and(|t| t.territory_type == TerritoryType::PenalColony);
        if is_colony && let Some(c) = ctx.graph.class_mut(source) {
            c.organization = 0.0;
        }
    }
}

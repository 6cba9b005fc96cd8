use tracing::info;

use super::context::TickContext;
use super::system::SimSystem;
use crate::formulas::clamp_unit;
use crate::model::{EdgeType, EventType};

/// Consciousness spreads along SOLIDARITY edges from sufficiently conscious
/// sources. Edges are visited in insertion order and each transmission sees
/// the effects of the ones before it.
pub struct SolidaritySystem;

impl SimSystem for SolidaritySystem {
    fn name(&self) -> &str {
        "solidarity"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let cfg = &ctx.config.solidarity;
        let activation = cfg.activation_threshold;
        let awakening = cfg.mass_awakening_threshold;
        let negligible = cfg.negligible_delta;

        for edge_idx in ctx.graph.edges_of_type(EdgeType::Solidarity) {
            let (source, target, strength) = {
                let e = ctx.graph.edge(edge_idx);
                (e.source, e.target, e.attrs.solidarity_strength)
            };
            let (Some(src), Some(tgt)) = (ctx.graph.class(source), ctx.graph.class(target)) else {
                continue;
            };
            let src_psi = src.consciousness();
            if src_psi < activation {
                continue;
            }
            let old_psi = tgt.consciousness();
            let delta = strength * (src_psi - old_psi);
            let new_psi = clamp_unit(old_psi + delta);
            if let Some(tgt) = ctx.graph.class_mut(target) {
                tgt.ideology.class_consciousness = new_psi;
            }

            if delta.abs() > negligible {
                let payload = serde_json::json!({
                    "source": ctx.graph.node_id(source),
                    "target": ctx.graph.node_id(target),
                    "delta": delta,
                    "solidarity_strength": strength,
                });
                ctx.publish(EventType::ConsciousnessTransmission, payload);
            }

            if old_psi < awakening && new_psi >= awakening {
                info!(
                    tick = ctx.tick,
                    target = ctx.graph.node_id(target),
                    consciousness = new_psi,
                    "mass awakening"
                );
                let payload = serde_json::json!({
                    "target": ctx.graph.node_id(target),
                    "old_consciousness": old_psi,
                    "new_consciousness": new_psi,
                    "triggering_source": ctx.graph.node_id(source),
                });
                ctx.publish(EventType::MassAwakening, payload);
            }
        }
    }
}

use tracing::debug;

use super::context::TickContext;
use super::system::SimSystem;
use crate::formulas;
use crate::model::{EventType, NodeKind};

/// Ecological metabolic rift: territories regenerate and are drawn down,
/// then aggregate consumption is weighed against what is left.
pub struct MetabolismSystem;

impl SimSystem for MetabolismSystem {
    fn name(&self) -> &str {
        "metabolism"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let entropy = ctx.config.metabolism.entropy_factor;

        for idx in ctx.graph.indices_of_kind(NodeKind::Territory) {
            let Some(t) = ctx.graph.territory_mut(idx) else {
                continue;
            };
            // Regeneration only below the cap.
            let regen = if t.biocapacity < t.max_biocapacity {
                t.regeneration_rate * t.max_biocapacity
            } else {
                0.0
            };
            let extraction = t.extraction_intensity * t.biocapacity;
            let delta = formulas::biocapacity_delta(regen, extraction, entropy);
            t.biocapacity = (t.biocapacity + delta).clamp(0.0, t.max_biocapacity.max(0.0));
        }

        let biocapacity: f64 = ctx
            .graph
            .nodes()
            .filter_map(|(_, n)| n.data.as_territory())
            .map(|t| t.biocapacity)
            .sum();
        let consumption: f64 = ctx
            .graph
            .nodes()
            .filter_map(|(_, n)| n.data.as_class())
            .filter(|c| c.active)
            .map(|c| c.consumption())
            .sum();

        let ratio = formulas::overshoot_ratio(consumption, biocapacity);
        debug!(tick = ctx.tick, biocapacity, consumption, "metabolism");

        if ratio > 1.0 {
            let payload = serde_json::json!({
                "total_biocapacity": biocapacity,
                "total_consumption": consumption,
                // Infinite overshoot serializes as null.
                "overshoot_ratio": ratio,
            });
            ctx.publish(EventType::EcologicalOvershoot, payload);
        }
    }
}

use rand::Rng;
use tracing::info;

use super::context::TickContext;
use super::system::SimSystem;
use crate::formulas::clamp_unit;
use crate::model::{EdgeType, EventType, NodeIdx, NodeKind};

/// Sparks of state violence and the uprisings they set off among the
/// exploited classes.
pub struct StruggleSystem;

impl SimSystem for StruggleSystem {
    fn name(&self) -> &str {
        "struggle"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let config = ctx.config;
        let cfg = &config.struggle;

        for idx in ctx.graph.indices_of_kind(NodeKind::SocialClass) {
            let Some(class) = ctx.graph.class(idx) else {
                continue;
            };
            if !class.active || !class.role.is_exploited() {
                continue;
            }
            let repression = class.repression_faced;
            let agitation = class.ideology.agitation;
            let revolt_favoured = class.p_revolution > class.p_acquiescence;

            // One draw per eligible class per tick keeps the stream aligned.
            let roll: f64 = ctx.rng.random();
            let spark = roll < clamp_unit(repression * cfg.spark_probability_scale);
            if spark {
                let payload = serde_json::json!({
                    "target": ctx.graph.node_id(idx),
                    "repression": repression,
                });
                ctx.publish(EventType::ExcessiveForce, payload);
            }

            if (spark || revolt_favoured) && agitation >= cfg.uprising_agitation_threshold {
                uprising(ctx, idx, spark);
            }
        }
    }
}

fn uprising(ctx: &mut TickContext, idx: NodeIdx, spark: bool) {
    let config = ctx.config;
    let cfg = &config.struggle;

    let Some(class) = ctx.graph.class_mut(idx) else {
        return;
    };
    let destroyed = class.wealth * cfg.uprising_wealth_destruction;
    class.wealth -= destroyed;
    class.ideology.class_consciousness =
        clamp_unit(class.ideology.class_consciousness + cfg.consciousness_boost);
    class.organization = clamp_unit(class.organization + cfg.organization_gain);
    class.repression_faced = clamp_unit(class.repression_faced + cfg.repression_backlash);
    class.ideology.agitation = clamp_unit(class.ideology.agitation * (1.0 - cfg.agitation_release));

    let class_id = ctx.graph.node_id(idx);
    info!(tick = ctx.tick, class = class_id, spark, "uprising");
    let payload = serde_json::json!({
        "target": ctx.graph.node_id(idx),
        "triggered_by_spark": spark,
        "wealth_destroyed": destroyed,
    });
    ctx.publish(EventType::Uprising, payload);

    let mut total_gain = 0.0;
    let mut edges_strengthened = 0;
    for edge_idx in ctx.graph.edges_of_type(EdgeType::Solidarity) {
        let edge = ctx.graph.edge_mut(edge_idx);
        if edge.source != idx && edge.target != idx {
            continue;
        }
        let before = edge.attrs.solidarity_strength;
        edge.attrs.solidarity_strength = clamp_unit(before + cfg.solidarity_gain);
        let gain = edge.attrs.solidarity_strength - before;
        if gain > 0.0 {
            total_gain += gain;
            edges_strengthened += 1;
        }
    }
    if total_gain > 0.0 {
        let payload = serde_json::json!({
            "source": ctx.graph.node_id(idx),
            "total_gain": total_gain,
            "edges": edges_strengthened,
        });
        ctx.publish(EventType::SolidaritySpike, payload);
    }
}

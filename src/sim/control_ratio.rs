use tracing::{info, warn};

use super::context::TickContext;
use super::system::SimSystem;
use crate::model::{DisplacementMode, EventType, SocialRole, TerminalOutcome, WorldGraph};

/// Compares the controlled population against enforcement capacity and,
/// once a control crisis has persisted, takes the terminal decision.
pub struct ControlRatioSystem;

struct ControlTally {
    controlled: f64,
    enforcers: f64,
    enforcer_classes: usize,
    /// Population-weighted organization of the controlled classes.
    organization: f64,
}

fn tally(graph: &WorldGraph) -> ControlTally {
    let mut t = ControlTally {
        controlled: 0.0,
        enforcers: 0.0,
        enforcer_classes: 0,
        organization: 0.0,
    };
    let mut weighted_org = 0.0;
    for (_, node) in graph.nodes() {
        let Some(c) = node.data.as_class() else {
            continue;
        };
        if !c.active {
            continue;
        }
        if c.role.is_controlled() {
            t.controlled += c.population;
            weighted_org += c.population * c.organization;
        } else if c.role == SocialRole::CarceralEnforcer {
            t.enforcers += c.population;
            t.enforcer_classes += 1;
        }
    }
    if t.controlled > 0.0 {
        t.organization = weighted_org / t.controlled;
    }
    t
}

impl SimSystem for ControlRatioSystem {
    fn name(&self) -> &str {
        "control_ratio"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let config = ctx.config;
        let cfg = &config.control;
        let t = tally(ctx.graph);
        if t.enforcer_classes == 0 {
            return;
        }

        let in_crisis = t.controlled > t.enforcers * cfg.control_capacity;
        let meta = &mut ctx.graph.metadata;
        if !in_crisis {
            if meta.control_crisis_active {
                info!(tick = ctx.tick, "control restored");
            }
            meta.control_crisis_active = false;
            meta.control_crisis_ticks = 0;
            return;
        }

        let entering = !meta.control_crisis_active;
        meta.control_crisis_active = true;
        meta.control_crisis_ticks += 1;
        let crisis_ticks = meta.control_crisis_ticks;
        let decided = meta.terminal_outcome.is_some();

        if entering {
            warn!(
                tick = ctx.tick,
                controlled = t.controlled,
                enforcers = t.enforcers,
                "control ratio crisis"
            );
            ctx.publish(
                EventType::ControlRatioCrisis,
                serde_json::json!({
                    "controlled_population": t.controlled,
                    "enforcer_population": t.enforcers,
                    "capacity": t.enforcers * cfg.control_capacity,
                }),
            );
        }

        if decided || crisis_ticks < cfg.terminal_decision_delay {
            return;
        }

        let outcome = if t.organization >= cfg.revolutionary_organization_threshold {
            TerminalOutcome::Revolution
        } else {
            TerminalOutcome::Genocide
        };
        ctx.graph.metadata.terminal_outcome = Some(outcome);
        if outcome == TerminalOutcome::Genocide {
            ctx.graph.metadata.displacement_override = Some(DisplacementMode::Elimination);
        }
        warn!(tick = ctx.tick, ?outcome, "terminal decision");
        ctx.publish(
            EventType::TerminalDecision,
            serde_json::json!({
                "outcome": outcome.as_str(),
                "organization": t.organization,
                "crisis_ticks": crisis_ticks,
            }),
        );
    }
}

use super::context::TickContext;
use super::system::SimSystem;
use crate::formulas::{self, clamp_unit};
use crate::model::NodeKind;

/// Survival calculus: refresh P(S|A) and P(S|R) on every active class and
/// let agitation drift toward material desperation.
pub struct SurvivalSystem;

impl SimSystem for SurvivalSystem {
    fn name(&self) -> &str {
        "survival"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let steepness = ctx.config.survival.steepness;
        let rate = ctx.config.survival.agitation_rate;

        for idx in ctx.graph.indices_of_kind(NodeKind::SocialClass) {
            let Some(class) = ctx.graph.class_mut(idx) else {
                continue;
            };
            if !class.active {
                continue;
            }
            class.p_acquiescence = formulas::acquiescence_probability(
                class.wealth,
                class.subsistence_threshold,
                steepness,
            );
            class.p_revolution =
                formulas::revolution_probability(class.organization, class.repression_faced);

            let desperation = 1.0 - class.p_acquiescence;
            let agitation = &mut class.ideology.agitation;
            *agitation = clamp_unit(*agitation + rate * (desperation - *agitation));
        }
    }
}

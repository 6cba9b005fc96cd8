use tracing::{debug, warn};

use super::context::TickContext;
use super::system::SimSystem;
use crate::error::TemplateError;
use crate::model::EventType;
use crate::templates::{self, EventTemplate};

/// Runs the template pass: every template is evaluated in order against the
/// graph as the other systems left it, and the winning resolution's effects
/// are applied immediately.
#[derive(Default)]
pub struct EventTemplateSystem {
    templates: Vec<EventTemplate>,
}

impl EventTemplateSystem {
    pub fn new(mut templates: Vec<EventTemplate>) -> Result<Self, TemplateError> {
        templates::validate_templates(&mut templates)?;
        Ok(Self { templates })
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }
}

impl SimSystem for EventTemplateSystem {
    fn name(&self) -> &str {
        "event_templates"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        for template in &mut self.templates {
            let Some(resolution) = templates::evaluate(template, ctx.graph, ctx.tick) else {
                continue;
            };
            let resolution_id = resolution.id.clone();
            match templates::apply_effects(ctx.graph, &resolution.effects) {
                Ok(written) => debug!(
                    tick = ctx.tick,
                    template = %template.id,
                    resolution = %resolution_id,
                    written,
                    "template resolved"
                ),
                Err(e) => warn!(
                    tick = ctx.tick,
                    template = %template.id,
                    error = %e,
                    "template effects partially applied"
                ),
            }
            template.last_triggered = Some(ctx.tick);

            let payload = serde_json::json!({
                "template": template.id,
                "resolution": resolution_id,
            });
            ctx.publish(EventType::TemplateResolved, payload);
        }
    }
}

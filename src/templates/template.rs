use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::condition::PreconditionSet;
use crate::error::TemplateError;
use crate::model::is_node_attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EffectOperation {
    Increase,
    Decrease,
    Set,
}

string_enum!(EffectOperation, "effect operation", {
    Increase => "INCREASE",
    Decrease => "DECREASE",
    Set => "SET",
});

/// One attribute change applied when a resolution fires.
///
/// `target` is a node id, `role:<ROLE>` for every class of that role, or
/// `type:<SOCIAL_CLASS|TERRITORY>` for every node of that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEffect {
    pub target: String,
    pub attribute: String,
    pub operation: EffectOperation,
    pub magnitude: f64,
}

impl TemplateEffect {
    pub fn new(target: &str, attribute: &str, operation: EffectOperation, magnitude: f64) -> Self {
        Self {
            target: target.to_string(),
            attribute: attribute.to_string(),
            operation,
            magnitude,
        }
    }

    /// The new value for an attribute currently at `current`.
    pub fn apply_to(&self, current: f64) -> f64 {
        match self.operation {
            EffectOperation::Increase => current + self.magnitude,
            EffectOperation::Decrease => current - self.magnitude,
            EffectOperation::Set => self.magnitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub id: String,
    /// Extra guard on top of the template's preconditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PreconditionSet>,
    #[serde(default)]
    pub effects: Vec<TemplateEffect>,
}

impl Resolution {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            condition: None,
            effects: Vec::new(),
        }
    }

    pub fn when(mut self, condition: PreconditionSet) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn effect(mut self, effect: TemplateEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A narrative event keyed on graph state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTemplate {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub preconditions: PreconditionSet,
    /// Checked in declared order; the first whose condition holds wins.
    pub resolutions: Vec<Resolution>,
    #[serde(default)]
    pub cooldown_ticks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<u64>,
}

impl EventTemplate {
    pub fn new(id: &str, preconditions: PreconditionSet) -> Self {
        Self {
            id: id.to_string(),
            description: String::new(),
            preconditions,
            resolutions: Vec::new(),
            cooldown_ticks: 0,
            last_triggered: None,
        }
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolutions.push(resolution);
        self
    }

    pub fn cooldown(mut self, ticks: u64) -> Self {
        self.cooldown_ticks = ticks;
        self
    }

    /// Whether the template is still cooling down at `tick`.
    pub fn cooling_down(&self, tick: u64) -> bool {
        self.last_triggered
            .is_some_and(|last| tick.saturating_sub(last) < self.cooldown_ticks)
    }

    /// Check the template can be evaluated: compile its id patterns and
    /// reject attribute names that no node or edge carries.
    pub fn validate(&mut self) -> Result<(), TemplateError> {
        if self.resolutions.is_empty() {
            return Err(TemplateError::EmptyResolutions(self.id.clone()));
        }
        self.preconditions.compile(&self.id)?;
        for resolution in &mut self.resolutions {
            if let Some(condition) = &mut resolution.condition {
                condition.compile(&self.id)?;
            }
            if let Some(effect) = resolution
                .effects
                .iter()
                .find(|e| !is_node_attribute(&e.attribute))
            {
                return Err(TemplateError::UnknownAttribute {
                    template: self.id.clone(),
                    attribute: effect.attribute.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validate a batch of templates, rejecting duplicate ids.
pub fn validate_templates(templates: &mut [EventTemplate]) -> Result<(), TemplateError> {
    let mut seen = HashSet::new();
    for template in templates.iter_mut() {
        if !seen.insert(template.id.clone()) {
            return Err(TemplateError::DuplicateTemplate(template.id.clone()));
        }
        template.validate()?;
    }
    Ok(())
}

/// Parse a JSON array of templates and validate it.
pub fn load_templates(json: &str) -> Result<Vec<EventTemplate>, TemplateError> {
    let mut templates: Vec<EventTemplate> = serde_json::from_str(json)?;
    validate_templates(&mut templates)?;
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::condition::{ComparisonOp, GraphCondition, GraphMetric};

    const TEMPLATES: &str = r#"[
        {
            "id": "general_strike",
            "description": "Workers down tools across the periphery.",
            "preconditions": {
                "node_conditions": [{
                    "path": "ideology.agitation",
                    "operator": ">=",
                    "threshold": 0.7,
                    "filter": {"role": "PERIPHERY_PROLETARIAT", "id_pattern": "^periphery"},
                    "aggregation": "COUNT",
                    "min_count": 2
                }],
                "logic": "ALL"
            },
            "resolutions": [
                {
                    "id": "crushed",
                    "condition": {
                        "graph_conditions": [{"metric": "AVERAGE_CONSCIOUSNESS", "operator": "<", "threshold": 0.4}]
                    },
                    "effects": [{"target": "role:PERIPHERY_PROLETARIAT", "attribute": "organization", "operation": "DECREASE", "magnitude": 0.1}]
                },
                {
                    "id": "victory",
                    "effects": [{"target": "type:SOCIAL_CLASS", "attribute": "ideology.class_consciousness", "operation": "INCREASE", "magnitude": 0.05}]
                }
            ],
            "cooldown_ticks": 5
        }
    ]"#;

    #[test]
    fn loads_and_validates_json() {
        let templates = load_templates(TEMPLATES).unwrap();
        assert_eq!(templates.len(), 1);
        let t = &templates[0];
        assert_eq!(t.cooldown_ticks, 5);
        assert_eq!(t.resolutions.len(), 2);
        assert_eq!(t.resolutions[1].effects[0].operation, EffectOperation::Increase);
        assert!(t.last_triggered.is_none());
    }

    #[test]
    fn empty_resolutions_rejected() {
        let mut t = EventTemplate::new("empty", PreconditionSet::default());
        assert!(matches!(t.validate(), Err(TemplateError::EmptyResolutions(id)) if id == "empty"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let t = EventTemplate::new("dup", PreconditionSet::default())
            .resolution(Resolution::new("r"));
        let mut batch = vec![t.clone(), t];
        assert!(matches!(
            validate_templates(&mut batch),
            Err(TemplateError::DuplicateTemplate(id)) if id == "dup"
        ));
    }

    #[test]
    fn bad_pattern_rejected() {
        let json = TEMPLATES.replace("^periphery", "[unterminated");
        assert!(matches!(load_templates(&json), Err(TemplateError::InvalidPattern { .. })));
    }

    #[test]
    fn misspelled_attributes_rejected_at_load() {
        let node_path = TEMPLATES.replace("\"ideology.agitation\"", "\"ideology.agitaton\"");
        assert!(matches!(
            load_templates(&node_path),
            Err(TemplateError::UnknownAttribute { attribute: a, .. }) if a == "ideology.agitaton"
        ));

        let effect = TEMPLATES.replace("\"organization\"", "\"organisation\"");
        assert!(matches!(
            load_templates(&effect),
            Err(TemplateError::UnknownAttribute { attribute, .. }) if attribute == "organisation"
        ));

        let edge = r#"[{
            "id": "networks",
            "preconditions": {
                "edge_conditions": [{
                    "edge_type": "SOLIDARITY",
                    "metric": "SUM_STRENGTH",
                    "attribute": "strength",
                    "operator": ">",
                    "threshold": 1.0
                }]
            },
            "resolutions": [{"id": "r"}]
        }]"#;
        assert!(matches!(
            load_templates(edge),
            Err(TemplateError::UnknownAttribute { template, attribute })
                if template == "networks" && attribute == "strength"
        ));
    }

    #[test]
    fn unknown_operator_is_parse_error() {
        let json = TEMPLATES.replace("\">=\"", "\"=>\"");
        assert!(matches!(load_templates(&json), Err(TemplateError::Parse(_))));
    }

    #[test]
    fn cooldown_window() {
        let mut t = EventTemplate::new("t", PreconditionSet::default()).cooldown(3);
        assert!(!t.cooling_down(0));
        t.last_triggered = Some(10);
        assert!(t.cooling_down(10));
        assert!(t.cooling_down(12));
        assert!(!t.cooling_down(13));
    }

    #[test]
    fn effect_operations() {
        let up = TemplateEffect::new("x", "wealth", EffectOperation::Increase, 2.0);
        let down = TemplateEffect::new("x", "wealth", EffectOperation::Decrease, 2.0);
        let set = TemplateEffect::new("x", "wealth", EffectOperation::Set, 2.0);
        assert!((up.apply_to(5.0) - 7.0).abs() < f64::EPSILON);
        assert!((down.apply_to(5.0) - 3.0).abs() < f64::EPSILON);
        assert!((set.apply_to(5.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_round_trips_through_json() {
        let t = EventTemplate::new(
            "boom",
            PreconditionSet {
                graph_conditions: vec![GraphCondition::new(
                    GraphMetric::TotalWealth,
                    ComparisonOp::Gt,
                    1.0,
                )],
                ..Default::default()
            },
        )
        .resolution(Resolution::new("only"));
        let json = serde_json::to_string(&vec![t]).unwrap();
        let back = load_templates(&json).unwrap();
        assert_eq!(back[0].id, "boom");
        assert_eq!(back[0].preconditions.graph_conditions.len(), 1);
    }
}

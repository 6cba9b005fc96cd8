//! Declarative event templates: graph-state preconditions select a
//! resolution whose effects the caller applies.

pub mod condition;
pub mod evaluator;
pub mod template;

pub use condition::{
    Aggregation, ComparisonOp, ConditionLogic, EdgeCondition, EdgeMetric, GraphCondition,
    GraphMetric, NodeCondition, NodeFilter, PreconditionSet, graph_metric,
};
pub use evaluator::{apply_effects, evaluate, resolve_target};
pub use template::{
    EffectOperation, EventTemplate, Resolution, TemplateEffect, load_templates, validate_templates,
};

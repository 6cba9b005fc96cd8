//! Error types for graph construction, configuration, and templates.
//!
//! None of these are raised while a tick runs: systems clamp out-of-range
//! values and report economic extremes as events.

use thiserror::Error;

use crate::model::EdgeType;

/// A configuration constant is missing or outside its documented range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration constant `{0}`")]
    MissingField(String),

    #[error("configuration constant `{field}` = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("`{lower}` ({lower_value}) must not exceed `{upper}` ({upper_value})")]
    InvertedBounds {
        lower: &'static str,
        lower_value: f64,
        upper: &'static str,
        upper_value: f64,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The graph handed to the engine is structurally unusable.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("unknown node id `{0}`")]
    UnknownNode(String),

    #[error("{1} edge from `{0}` to itself")]
    SelfLoop(String, EdgeType),

    #[error("node `{node}` has no attribute `{path}`")]
    UnknownAttribute { node: String, path: String },

    #[error("invalid graph data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An event template cannot be evaluated as authored.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{template}`: invalid id pattern `{pattern}`: {source}")]
    InvalidPattern {
        template: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("template `{0}` declares no resolutions")]
    EmptyResolutions(String),

    #[error("duplicate template id `{0}`")]
    DuplicateTemplate(String),

    #[error("template `{template}`: unknown attribute `{attribute}`")]
    UnknownAttribute { template: String, attribute: String },

    #[error("invalid template data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

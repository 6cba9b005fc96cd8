//! Declarative predicates over the world graph.
//!
//! Conditions are plain serializable data; operators, aggregations and
//! metrics are closed enums dispatched by `match`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::model::{EdgeAttrs, EdgeType, Node, NodeKind, SocialRole, WorldGraph, is_node_attribute};

/// Tolerance used by `==` and `!=`.
const EQ_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ComparisonOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

string_enum!(ComparisonOp, "comparison operator", {
    Gt => ">",
    Ge => ">=",
    Lt => "<",
    Le => "<=",
    Eq => "==",
    Ne => "!=",
});

impl ComparisonOp {
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOp::Gt => value > threshold,
            ComparisonOp::Ge => value >= threshold,
            ComparisonOp::Lt => value < threshold,
            ComparisonOp::Le => value <= threshold,
            ComparisonOp::Eq => (value - threshold).abs() < EQ_EPSILON,
            ComparisonOp::Ne => (value - threshold).abs() >= EQ_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Aggregation {
    #[default]
    Any,
    All,
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

string_enum!(Aggregation, "aggregation", {
    Any => "ANY",
    All => "ALL",
    Count => "COUNT",
    Sum => "SUM",
    Avg => "AVG",
    Max => "MAX",
    Min => "MIN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EdgeMetric {
    Count,
    SumStrength,
    AvgStrength,
}

string_enum!(EdgeMetric, "edge metric", {
    Count => "COUNT",
    SumStrength => "SUM_STRENGTH",
    AvgStrength => "AVG_STRENGTH",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GraphMetric {
    SolidarityDensity,
    TotalWealth,
    AverageAgitation,
    AverageConsciousness,
    ImperialRentPool,
}

string_enum!(GraphMetric, "graph metric", {
    SolidarityDensity => "SOLIDARITY_DENSITY",
    TotalWealth => "TOTAL_WEALTH",
    AverageAgitation => "AVERAGE_AGITATION",
    AverageConsciousness => "AVERAGE_CONSCIOUSNESS",
    ImperialRentPool => "IMPERIAL_RENT_POOL",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConditionLogic {
    #[default]
    All,
    Any,
}

string_enum!(ConditionLogic, "condition logic", {
    All => "ALL",
    Any => "ANY",
});

// ---------------------------------------------------------------------------
// Node conditions
// ---------------------------------------------------------------------------

/// Selects the nodes a [`NodeCondition`] looks at. Empty filter selects all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<SocialRole>,
    /// Regex searched against the node id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_pattern: Option<String>,
    #[serde(skip)]
    compiled: Option<Regex>,
}

impl NodeFilter {
    pub(crate) fn compile(&mut self, template: &str) -> Result<(), TemplateError> {
        if let Some(pattern) = &self.id_pattern {
            let re = Regex::new(pattern).map_err(|source| TemplateError::InvalidPattern {
                template: template.to_string(),
                pattern: pattern.clone(),
                source,
            })?;
            self.compiled = Some(re);
        }
        Ok(())
    }

    pub fn matches(&self, node: &Node) -> bool {
        if self.node_type.is_some_and(|k| k != node.kind()) {
            return false;
        }
        if let Some(role) = self.role
            && node.role() != Some(role)
        {
            return false;
        }
        match (&self.compiled, &self.id_pattern) {
            (Some(re), _) => re.is_match(&node.id),
            // Uncompiled filters come from templates that skipped validation.
            (None, Some(pattern)) => Regex::new(pattern).is_ok_and(|re| re.is_match(&node.id)),
            (None, None) => true,
        }
    }
}

fn default_min_count() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCondition {
    /// Dotted attribute path, e.g. `ideology.agitation`.
    pub path: String,
    pub operator: ComparisonOp,
    pub threshold: f64,
    #[serde(default)]
    pub filter: NodeFilter,
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Passing nodes needed by COUNT.
    #[serde(default = "default_min_count")]
    pub min_count: usize,
}

impl NodeCondition {
    pub fn new(path: &str, operator: ComparisonOp, threshold: f64) -> Self {
        Self {
            path: path.to_string(),
            operator,
            threshold,
            filter: NodeFilter::default(),
            aggregation: Aggregation::Any,
            min_count: 1,
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_filter(mut self, filter: NodeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn holds(&self, graph: &WorldGraph) -> bool {
        // Nodes without the attribute are outside the selection.
        let values: Vec<f64> = graph
            .nodes()
            .filter(|(_, n)| self.filter.matches(n))
            .filter_map(|(_, n)| n.attr(&self.path))
            .collect();
        let pass = |v: &f64| self.operator.compare(*v, self.threshold);

        match self.aggregation {
            Aggregation::Any => values.iter().any(pass),
            Aggregation::All => !values.is_empty() && values.iter().all(pass),
            Aggregation::Count => values.iter().filter(|v| pass(*v)).count() >= self.min_count,
            Aggregation::Sum => pass(&values.iter().sum::<f64>()),
            Aggregation::Avg => {
                !values.is_empty() && pass(&(values.iter().sum::<f64>() / values.len() as f64))
            }
            Aggregation::Max => values.iter().copied().reduce(f64::max).is_some_and(|m| pass(&m)),
            Aggregation::Min => values.iter().copied().reduce(f64::min).is_some_and(|m| pass(&m)),
        }
    }
}

// ---------------------------------------------------------------------------
// Edge and graph conditions
// ---------------------------------------------------------------------------

fn default_edge_attribute() -> String {
    "solidarity_strength".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCondition {
    pub edge_type: EdgeType,
    pub metric: EdgeMetric,
    /// Edge attribute summed or averaged by the strength metrics.
    #[serde(default = "default_edge_attribute")]
    pub attribute: String,
    pub operator: ComparisonOp,
    pub threshold: f64,
}

impl EdgeCondition {
    pub fn new(
        edge_type: EdgeType,
        metric: EdgeMetric,
        operator: ComparisonOp,
        threshold: f64,
    ) -> Self {
        Self {
            edge_type,
            metric,
            attribute: default_edge_attribute(),
            operator,
            threshold,
        }
    }

    pub fn holds(&self, graph: &WorldGraph) -> bool {
        let edges: Vec<_> = graph
            .edges()
            .filter(|(_, e)| e.kind == self.edge_type)
            .collect();
        // Attribute names are checked when the template loads.
        let values: Vec<f64> = edges
            .iter()
            .filter_map(|(_, e)| e.attrs.attr(&self.attribute))
            .collect();
        let value = match self.metric {
            EdgeMetric::Count => Some(edges.len() as f64),
            EdgeMetric::SumStrength => Some(values.iter().sum()),
            EdgeMetric::AvgStrength if values.is_empty() => None,
            EdgeMetric::AvgStrength => Some(values.iter().sum::<f64>() / values.len() as f64),
        };
        value.is_some_and(|v| self.operator.compare(v, self.threshold))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCondition {
    pub metric: GraphMetric,
    pub operator: ComparisonOp,
    pub threshold: f64,
}

impl GraphCondition {
    pub fn new(metric: GraphMetric, operator: ComparisonOp, threshold: f64) -> Self {
        Self {
            metric,
            operator,
            threshold,
        }
    }

    pub fn holds(&self, graph: &WorldGraph) -> bool {
        self.operator.compare(graph_metric(graph, self.metric), self.threshold)
    }
}

/// Whole-graph derived metric. Averages and totals range over active classes.
pub fn graph_metric(graph: &WorldGraph, metric: GraphMetric) -> f64 {
    let active = || {
        graph
            .nodes()
            .filter_map(|(_, n)| n.data.as_class())
            .filter(|c| c.active)
    };
    let mean = |f: fn(&crate::model::SocialClass) -> f64| {
        let (sum, n) = active().fold((0.0, 0usize), |(s, n), c| (s + f(c), n + 1));
        if n == 0 { 0.0 } else { sum / n as f64 }
    };

    match metric {
        GraphMetric::SolidarityDensity => {
            // Share of possible directed class pairs joined by solidarity.
            let classes = graph.indices_of_kind(NodeKind::SocialClass).len();
            if classes < 2 {
                return 0.0;
            }
            let solidarity = graph.edges_of_type(EdgeType::Solidarity).len();
            solidarity as f64 / (classes * (classes - 1)) as f64
        }
        GraphMetric::TotalWealth => active().map(|c| c.wealth).sum(),
        GraphMetric::AverageAgitation => mean(|c| c.ideology.agitation),
        GraphMetric::AverageConsciousness => mean(|c| c.ideology.class_consciousness),
        GraphMetric::ImperialRentPool => graph
            .metadata
            .economy
            .map(|e| e.imperial_rent_pool)
            .unwrap_or(0.0),
    }
}

// ---------------------------------------------------------------------------
// Precondition sets
// ---------------------------------------------------------------------------

/// Conditions combined with ALL/ANY logic. An empty set always holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreconditionSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_conditions: Vec<NodeCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_conditions: Vec<EdgeCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graph_conditions: Vec<GraphCondition>,
    #[serde(default)]
    pub logic: ConditionLogic,
}

impl PreconditionSet {
    pub fn is_empty(&self) -> bool {
        self.node_conditions.is_empty()
            && self.edge_conditions.is_empty()
            && self.graph_conditions.is_empty()
    }

    pub fn holds(&self, graph: &WorldGraph) -> bool {
        if self.is_empty() {
            return true;
        }
        let mut results = self
            .node_conditions
            .iter()
            .map(|c| c.holds(graph))
            .chain(self.edge_conditions.iter().map(|c| c.holds(graph)))
            .chain(self.graph_conditions.iter().map(|c| c.holds(graph)));
        match self.logic {
            ConditionLogic::All => results.all(|r| r),
            ConditionLogic::Any => results.any(|r| r),
        }
    }

    /// Compile id patterns and reject attribute names no node or edge has.
    pub(crate) fn compile(&mut self, template: &str) -> Result<(), TemplateError> {
        let unknown = |attribute: &str| TemplateError::UnknownAttribute {
            template: template.to_string(),
            attribute: attribute.to_string(),
        };
        for cond in &mut self.node_conditions {
            if !is_node_attribute(&cond.path) {
                return Err(unknown(&cond.path));
            }
            cond.filter.compile(template)?;
        }
        for cond in &self.edge_conditions {
            if !EdgeAttrs::NAMES.contains(&cond.attribute.as_str()) {
                return Err(unknown(&cond.attribute));
            }
        }
        Ok(())
    }
}

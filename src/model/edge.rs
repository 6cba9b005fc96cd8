use serde::{Deserialize, Serialize};

use super::graph::NodeIdx;
use crate::formulas::clamp_unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EdgeType {
    Exploitation,
    Tribute,
    Wages,
    ClientState,
    Solidarity,
    Tenancy,
    Adjacency,
    Repression,
}

string_enum!(EdgeType, "edge type", {
    Exploitation => "EXPLOITATION",
    Tribute => "TRIBUTE",
    Wages => "WAGES",
    ClientState => "CLIENT_STATE",
    Solidarity => "SOLIDARITY",
    Tenancy => "TENANCY",
    Adjacency => "ADJACENCY",
    Repression => "REPRESSION",
});

/// Numeric attributes carried by every edge. Which ones matter depends on
/// the edge type; the rest stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    /// Amount that moved along the edge on the last tick it was active.
    #[serde(default)]
    pub value_flow: f64,
    #[serde(default)]
    pub tension: f64,
    /// Stored weight gating consciousness transmission. Never derived.
    #[serde(default)]
    pub solidarity_strength: f64,
    /// Upper bound on a single client-state subsidy.
    #[serde(default)]
    pub subsidy_cap: f64,
}

impl EdgeAttrs {
    pub const NAMES: [&str; 4] = ["value_flow", "tension", "solidarity_strength", "subsidy_cap"];

    pub fn attr(&self, name: &str) -> Option<f64> {
        match name {
            "value_flow" => Some(self.value_flow),
            "tension" => Some(self.tension),
            "solidarity_strength" => Some(self.solidarity_strength),
            "subsidy_cap" => Some(self.subsidy_cap),
            _ => None,
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.value_flow = self.value_flow.max(0.0);
        self.tension = clamp_unit(self.tension);
        self.solidarity_strength = clamp_unit(self.solidarity_strength);
        self.subsidy_cap = self.subsidy_cap.max(0.0);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: NodeIdx,
    pub target: NodeIdx,
    pub kind: EdgeType,
    pub attrs: EdgeAttrs,
}

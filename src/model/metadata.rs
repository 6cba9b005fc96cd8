use serde::{Deserialize, Serialize};

use crate::config::EconomyConfig;

/// The global economy singleton: one per graph, created from configured
/// initial values the first time a system asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    pub imperial_rent_pool: f64,
    pub current_super_wage_rate: f64,
    pub current_repression_level: f64,
}

impl EconomyState {
    pub fn from_config(config: &EconomyConfig) -> Self {
        Self {
            imperial_rent_pool: config.initial_rent_pool,
            current_super_wage_rate: config.initial_super_wage_rate,
            current_repression_level: config.initial_repression_level,
        }
    }
}

/// Where evicted population is sent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DisplacementMode {
    /// Penal labour: penal colonies first.
    Extraction,
    /// Reservations first.
    Containment,
    /// Concentration camps first.
    Elimination,
}

string_enum!(DisplacementMode, "displacement mode", {
    Extraction => "EXTRACTION",
    Containment => "CONTAINMENT",
    Elimination => "ELIMINATION",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TerminalOutcome {
    Revolution,
    Genocide,
}

string_enum!(TerminalOutcome, "terminal outcome", {
    Revolution => "REVOLUTION",
    Genocide => "GENOCIDE",
});

/// Graph-level state that survives across ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy: Option<EconomyState>,
    #[serde(default)]
    pub control_crisis_active: bool,
    #[serde(default)]
    pub control_crisis_ticks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_outcome: Option<TerminalOutcome>,
    /// Replaces the configured displacement mode once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement_override: Option<DisplacementMode>,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventType {
    SurplusExtraction,
    SuperwageCrisis,
    ImperialSubsidy,
    EconomicCrisis,
    EcologicalOvershoot,
    ConsciousnessTransmission,
    MassAwakening,
    ClassDecomposition,
    ControlRatioCrisis,
    TerminalDecision,
    Uprising,
    ExcessiveForce,
    SolidaritySpike,
    TemplateResolved,
}

string_enum!(EventType, "event type", {
    SurplusExtraction => "SURPLUS_EXTRACTION",
    SuperwageCrisis => "SUPERWAGE_CRISIS",
    ImperialSubsidy => "IMPERIAL_SUBSIDY",
    EconomicCrisis => "ECONOMIC_CRISIS",
    EcologicalOvershoot => "ECOLOGICAL_OVERSHOOT",
    ConsciousnessTransmission => "CONSCIOUSNESS_TRANSMISSION",
    MassAwakening => "MASS_AWAKENING",
    ClassDecomposition => "CLASS_DECOMPOSITION",
    ControlRatioCrisis => "CONTROL_RATIO_CRISIS",
    TerminalDecision => "TERMINAL_DECISION",
    Uprising => "UPRISING",
    ExcessiveForce => "EXCESSIVE_FORCE",
    SolidaritySpike => "SOLIDARITY_SPIKE",
    TemplateResolved => "TEMPLATE_RESOLVED",
});

/// One entry of the append-only event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimEvent {
    /// Position in the log, starting at 1.
    pub seq: u64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub tick: u64,
    /// Event-specific structured data.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl SimEvent {
    /// Read a numeric payload field.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(|v| v.as_f64())
    }

    /// Read a string payload field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

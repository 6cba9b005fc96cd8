//! Numeric constants for every system, loadable from JSON.
//!
//! Each section has working defaults except the wage and repression bounds,
//! which must be spelled out whenever a configuration is read from data.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::formulas::{DecisionThresholds, PolicyDeltas};
use crate::model::DisplacementMode;

/// Economy fields that have no default when read from JSON.
const REQUIRED_ECONOMY_FIELDS: [&str; 4] = [
    "min_wage_rate",
    "max_wage_rate",
    "min_repression",
    "max_repression",
];

/// The wage and repression bounds have no serde default: a document that
/// omits any of them does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Pool size at tick 0, also the denominator of `pool_ratio`.
    #[serde(default = "default_initial_rent_pool")]
    pub initial_rent_pool: f64,
    #[serde(default = "default_initial_super_wage_rate")]
    pub initial_super_wage_rate: f64,
    #[serde(default = "default_initial_repression_level")]
    pub initial_repression_level: f64,
    /// Base share of periphery wealth extracted per tick (alpha).
    #[serde(default = "default_extraction_efficiency")]
    pub extraction_efficiency: f64,
    /// Per-tick erosion of extraction efficiency.
    #[serde(default = "default_trpf_coefficient")]
    pub trpf_coefficient: f64,
    /// Fraction of `extraction_efficiency` that survives any amount of erosion.
    #[serde(default = "default_trpf_efficiency_floor")]
    pub trpf_efficiency_floor: f64,
    /// Share of received rent the comprador keeps before paying tribute.
    #[serde(default = "default_comprador_cut")]
    pub comprador_cut: f64,
    /// Purchasing-power multiplier applied to super-wages.
    #[serde(default = "default_ppp_multiplier")]
    pub ppp_multiplier: f64,
    /// A pool at or below this cannot fund super-wages.
    #[serde(default = "default_negligible_pool")]
    pub negligible_pool: f64,
    #[serde(default = "default_subsidy_trigger_threshold")]
    pub subsidy_trigger_threshold: f64,
    /// Repression gained per unit of subsidy.
    #[serde(default = "default_subsidy_conversion_rate")]
    pub subsidy_conversion_rate: f64,
    #[serde(default = "default_pool_high_threshold")]
    pub pool_high_threshold: f64,
    #[serde(default = "default_pool_low_threshold")]
    pub pool_low_threshold: f64,
    #[serde(default = "default_pool_critical_threshold")]
    pub pool_critical_threshold: f64,
    #[serde(default = "default_bribery_tension_threshold")]
    pub bribery_tension_threshold: f64,
    #[serde(default = "default_iron_fist_tension_threshold")]
    pub iron_fist_tension_threshold: f64,
    #[serde(default = "default_bribery_wage_delta")]
    pub bribery_wage_delta: f64,
    #[serde(default = "default_austerity_wage_delta")]
    pub austerity_wage_delta: f64,
    #[serde(default = "default_iron_fist_repression_delta")]
    pub iron_fist_repression_delta: f64,
    #[serde(default = "default_crisis_wage_delta")]
    pub crisis_wage_delta: f64,
    #[serde(default = "default_crisis_repression_delta")]
    pub crisis_repression_delta: f64,
    /// Multiplicative pool loss at the end of every tick.
    #[serde(default = "default_pool_decay_rate")]
    pub pool_decay_rate: f64,
    /// Tension gained on an exploitation edge per unit of relative extraction.
    #[serde(default = "default_tension_accumulation_rate")]
    pub tension_accumulation_rate: f64,
    pub min_wage_rate: f64,
    pub max_wage_rate: f64,
    pub min_repression: f64,
    pub max_repression: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_rent_pool: default_initial_rent_pool(),
            initial_super_wage_rate: default_initial_super_wage_rate(),
            initial_repression_level: default_initial_repression_level(),
            extraction_efficiency: default_extraction_efficiency(),
            trpf_coefficient: default_trpf_coefficient(),
            trpf_efficiency_floor: default_trpf_efficiency_floor(),
            comprador_cut: default_comprador_cut(),
            ppp_multiplier: default_ppp_multiplier(),
            negligible_pool: default_negligible_pool(),
            subsidy_trigger_threshold: default_subsidy_trigger_threshold(),
            subsidy_conversion_rate: default_subsidy_conversion_rate(),
            pool_high_threshold: default_pool_high_threshold(),
            pool_low_threshold: default_pool_low_threshold(),
            pool_critical_threshold: default_pool_critical_threshold(),
            bribery_tension_threshold: default_bribery_tension_threshold(),
            iron_fist_tension_threshold: default_iron_fist_tension_threshold(),
            bribery_wage_delta: default_bribery_wage_delta(),
            austerity_wage_delta: default_austerity_wage_delta(),
            iron_fist_repression_delta: default_iron_fist_repression_delta(),
            crisis_wage_delta: default_crisis_wage_delta(),
            crisis_repression_delta: default_crisis_repression_delta(),
            pool_decay_rate: default_pool_decay_rate(),
            tension_accumulation_rate: default_tension_accumulation_rate(),
            min_wage_rate: 0.05,
            max_wage_rate: 0.5,
            min_repression: 0.1,
            max_repression: 0.9,
        }
    }
}

fn default_initial_rent_pool() -> f64 {
    100.0
}

fn default_initial_super_wage_rate() -> f64 {
    0.2
}

fn default_initial_repression_level() -> f64 {
    0.5
}

fn default_extraction_efficiency() -> f64 {
    0.8
}

fn default_trpf_coefficient() -> f64 {
    0.0005
}

fn default_trpf_efficiency_floor() -> f64 {
    0.1
}

fn default_comprador_cut() -> f64 {
    0.15
}

fn default_ppp_multiplier() -> f64 {
    1.5
}

fn default_negligible_pool() -> f64 {
    0.01
}

fn default_subsidy_trigger_threshold() -> f64 {
    0.8
}

fn default_subsidy_conversion_rate() -> f64 {
    0.01
}

fn default_pool_high_threshold() -> f64 {
    0.7
}

fn default_pool_low_threshold() -> f64 {
    0.3
}

fn default_pool_critical_threshold() -> f64 {
    0.1
}

fn default_bribery_tension_threshold() -> f64 {
    0.3
}

fn default_iron_fist_tension_threshold() -> f64 {
    0.5
}

fn default_bribery_wage_delta() -> f64 {
    0.05
}

fn default_austerity_wage_delta() -> f64 {
    0.05
}

fn default_iron_fist_repression_delta() -> f64 {
    0.1
}

fn default_crisis_wage_delta() -> f64 {
    0.15
}

fn default_crisis_repression_delta() -> f64 {
    0.2
}

fn default_pool_decay_rate() -> f64 {
    0.02
}

fn default_tension_accumulation_rate() -> f64 {
    0.05
}

impl EconomyConfig {
    pub fn decision_thresholds(&self) -> DecisionThresholds {
        DecisionThresholds {
            high: self.pool_high_threshold,
            low: self.pool_low_threshold,
            critical: self.pool_critical_threshold,
            bribery_tension: self.bribery_tension_threshold,
            iron_fist_tension: self.iron_fist_tension_threshold,
        }
    }

    pub fn policy_deltas(&self) -> PolicyDeltas {
        PolicyDeltas {
            bribery_wage: self.bribery_wage_delta,
            austerity_wage: self.austerity_wage_delta,
            iron_fist_repression: self.iron_fist_repression_delta,
            crisis_wage: self.crisis_wage_delta,
            crisis_repression: self.crisis_repression_delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Sigmoid steepness of the acquiescence curve.
    pub steepness: f64,
    /// Rate at which agitation follows material desperation.
    pub agitation_rate: f64,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            steepness: 10.0,
            agitation_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolismConfig {
    pub entropy_factor: f64,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            entropy_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidarityConfig {
    pub activation_threshold: f64,
    pub mass_awakening_threshold: f64,
    pub negligible_delta: f64,
}

impl Default for SolidarityConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 0.3,
            mass_awakening_threshold: 0.6,
            negligible_delta: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritoryConfig {
    pub heat_gain_rate: f64,
    pub heat_decay_rate: f64,
    pub spillover_rate: f64,
    pub eviction_heat_threshold: f64,
    pub rent_spike_multiplier: f64,
    pub displacement_rate: f64,
    pub camp_decay_rate: f64,
    pub displacement_mode: DisplacementMode,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            heat_gain_rate: 0.15,
            heat_decay_rate: 0.1,
            spillover_rate: 0.05,
            eviction_heat_threshold: 0.8,
            rent_spike_multiplier: 1.5,
            displacement_rate: 0.1,
            camp_decay_rate: 0.05,
            displacement_mode: DisplacementMode::Extraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StruggleConfig {
    /// Spark probability per unit of repression faced.
    pub spark_probability_scale: f64,
    pub uprising_agitation_threshold: f64,
    pub uprising_wealth_destruction: f64,
    pub solidarity_gain: f64,
    pub consciousness_boost: f64,
    pub organization_gain: f64,
    pub repression_backlash: f64,
    /// Share of agitation spent by an uprising.
    pub agitation_release: f64,
}

impl Default for StruggleConfig {
    fn default() -> Self {
        Self {
            spark_probability_scale: 0.1,
            uprising_agitation_threshold: 0.5,
            uprising_wealth_destruction: 0.1,
            solidarity_gain: 0.2,
            consciousness_boost: 0.1,
            organization_gain: 0.1,
            repression_backlash: 0.05,
            agitation_release: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Share of a collapsing labor aristocracy that joins the enforcers.
    pub enforcer_fraction: f64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            enforcer_fraction: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Controlled population one enforcer can hold down.
    pub control_capacity: f64,
    /// Consecutive crisis ticks before the terminal decision is taken.
    pub terminal_decision_delay: u32,
    pub revolutionary_organization_threshold: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            control_capacity: 4.0,
            terminal_decision_delay: 3,
            revolutionary_organization_threshold: 0.5,
        }
    }
}

/// Configuration for a simulation run. Every section but `economy` may be
/// omitted from JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed; the same seed and graph always produce the same event log.
    #[serde(default)]
    pub seed: u64,
    pub economy: EconomyConfig,
    #[serde(default)]
    pub survival: SurvivalConfig,
    #[serde(default)]
    pub metabolism: MetabolismConfig,
    #[serde(default)]
    pub solidarity: SolidarityConfig,
    #[serde(default)]
    pub territory: TerritoryConfig,
    #[serde(default)]
    pub struggle: StruggleConfig,
    #[serde(default)]
    pub decomposition: DecompositionConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

impl SimulationConfig {
    /// Parse and validate a JSON configuration. A missing bound is reported
    /// by its dotted field name before serde sees the document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        for field in REQUIRED_ECONOMY_FIELDS {
            if raw.get("economy").and_then(|e| e.get(field)).is_none() {
                return Err(ConfigError::MissingField(format!("economy.{field}")));
            }
        }
        let config: SimulationConfig = serde_json::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constant against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.economy;
        positive("economy.initial_rent_pool", e.initial_rent_pool)?;
        non_negative("economy.initial_super_wage_rate", e.initial_super_wage_rate)?;
        unit(
            "economy.initial_repression_level",
            e.initial_repression_level,
        )?;
        unit("economy.extraction_efficiency", e.extraction_efficiency)?;
        non_negative("economy.trpf_coefficient", e.trpf_coefficient)?;
        unit("economy.trpf_efficiency_floor", e.trpf_efficiency_floor)?;
        unit("economy.comprador_cut", e.comprador_cut)?;
        if !(e.ppp_multiplier >= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "economy.ppp_multiplier",
                value: e.ppp_multiplier,
                expected: "[1, inf)",
            });
        }
        non_negative("economy.negligible_pool", e.negligible_pool)?;
        non_negative(
            "economy.subsidy_trigger_threshold",
            e.subsidy_trigger_threshold,
        )?;
        non_negative("economy.subsidy_conversion_rate", e.subsidy_conversion_rate)?;
        unit("economy.pool_high_threshold", e.pool_high_threshold)?;
        unit("economy.pool_low_threshold", e.pool_low_threshold)?;
        unit("economy.pool_critical_threshold", e.pool_critical_threshold)?;
        ordered(
            "economy.pool_critical_threshold",
            e.pool_critical_threshold,
            "economy.pool_low_threshold",
            e.pool_low_threshold,
        )?;
        ordered(
            "economy.pool_low_threshold",
            e.pool_low_threshold,
            "economy.pool_high_threshold",
            e.pool_high_threshold,
        )?;
        unit(
            "economy.bribery_tension_threshold",
            e.bribery_tension_threshold,
        )?;
        unit(
            "economy.iron_fist_tension_threshold",
            e.iron_fist_tension_threshold,
        )?;
        non_negative("economy.bribery_wage_delta", e.bribery_wage_delta)?;
        non_negative("economy.austerity_wage_delta", e.austerity_wage_delta)?;
        non_negative(
            "economy.iron_fist_repression_delta",
            e.iron_fist_repression_delta,
        )?;
        non_negative("economy.crisis_wage_delta", e.crisis_wage_delta)?;
        non_negative("economy.crisis_repression_delta", e.crisis_repression_delta)?;
        unit("economy.pool_decay_rate", e.pool_decay_rate)?;
        non_negative(
            "economy.tension_accumulation_rate",
            e.tension_accumulation_rate,
        )?;
        non_negative("economy.min_wage_rate", e.min_wage_rate)?;
        ordered(
            "economy.min_wage_rate",
            e.min_wage_rate,
            "economy.max_wage_rate",
            e.max_wage_rate,
        )?;
        unit("economy.min_repression", e.min_repression)?;
        unit("economy.max_repression", e.max_repression)?;
        ordered(
            "economy.min_repression",
            e.min_repression,
            "economy.max_repression",
            e.max_repression,
        )?;

        let s = &self.survival;
        positive("survival.steepness", s.steepness)?;
        unit("survival.agitation_rate", s.agitation_rate)?;

        non_negative("metabolism.entropy_factor", self.metabolism.entropy_factor)?;

        let so = &self.solidarity;
        unit("solidarity.activation_threshold", so.activation_threshold)?;
        unit(
            "solidarity.mass_awakening_threshold",
            so.mass_awakening_threshold,
        )?;
        non_negative("solidarity.negligible_delta", so.negligible_delta)?;

        let t = &self.territory;
        unit("territory.heat_gain_rate", t.heat_gain_rate)?;
        unit("territory.heat_decay_rate", t.heat_decay_rate)?;
        unit("territory.spillover_rate", t.spillover_rate)?;
        unit(
            "territory.eviction_heat_threshold",
            t.eviction_heat_threshold,
        )?;
        if !(t.rent_spike_multiplier >= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "territory.rent_spike_multiplier",
                value: t.rent_spike_multiplier,
                expected: "[1, inf)",
            });
        }
        unit("territory.displacement_rate", t.displacement_rate)?;
        if !(t.camp_decay_rate > 0.0 && t.camp_decay_rate <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "territory.camp_decay_rate",
                value: t.camp_decay_rate,
                expected: "(0, 1]",
            });
        }

        let st = &self.struggle;
        non_negative(
            "struggle.spark_probability_scale",
            st.spark_probability_scale,
        )?;
        unit(
            "struggle.uprising_agitation_threshold",
            st.uprising_agitation_threshold,
        )?;
        unit(
            "struggle.uprising_wealth_destruction",
            st.uprising_wealth_destruction,
        )?;
        unit("struggle.solidarity_gain", st.solidarity_gain)?;
        unit("struggle.consciousness_boost", st.consciousness_boost)?;
        unit("struggle.organization_gain", st.organization_gain)?;
        unit("struggle.repression_backlash", st.repression_backlash)?;
        unit("struggle.agitation_release", st.agitation_release)?;

        unit(
            "decomposition.enforcer_fraction",
            self.decomposition.enforcer_fraction,
        )?;

        let c = &self.control;
        positive("control.control_capacity", c.control_capacity)?;
        unit(
            "control.revolutionary_organization_threshold",
            c.revolutionary_organization_threshold,
        )?;
        Ok(())
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "[0, 1]",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "[0, inf)",
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "(0, inf)",
        })
    }
}

fn ordered(
    lower: &'static str,
    lower_value: f64,
    upper: &'static str,
    upper_value: f64,
) -> Result<(), ConfigError> {
    if lower_value <= upper_value {
        Ok(())
    } else {
        Err(ConfigError::InvertedBounds {
            lower,
            lower_value,
            upper,
            upper_value,
        })
    }
}

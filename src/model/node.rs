use serde::{Deserialize, Serialize};

use crate::formulas::clamp_unit;

/// Organization assumed for a class record that does not carry one.
pub const DEFAULT_ORGANIZATION: f64 = 0.1;
/// Repression assumed for a class record that does not carry one.
pub const DEFAULT_REPRESSION: f64 = 0.5;
/// Subsistence threshold assumed for a class record that does not carry one.
pub const DEFAULT_SUBSISTENCE: f64 = 0.3;

fn default_organization() -> f64 {
    DEFAULT_ORGANIZATION
}

fn default_repression() -> f64 {
    DEFAULT_REPRESSION
}

fn default_subsistence() -> f64 {
    DEFAULT_SUBSISTENCE
}

fn default_active() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SocialRole {
    CoreBourgeoisie,
    CompradorBourgeoisie,
    LaborAristocracy,
    PeripheryProletariat,
    InternalProletariat,
    PettyBourgeoisie,
    Lumpenproletariat,
    CarceralEnforcer,
}

string_enum!(SocialRole, "social role", {
    CoreBourgeoisie => "CORE_BOURGEOISIE",
    CompradorBourgeoisie => "COMPRADOR_BOURGEOISIE",
    LaborAristocracy => "LABOR_ARISTOCRACY",
    PeripheryProletariat => "PERIPHERY_PROLETARIAT",
    InternalProletariat => "INTERNAL_PROLETARIAT",
    PettyBourgeoisie => "PETTY_BOURGEOISIE",
    Lumpenproletariat => "LUMPENPROLETARIAT",
    CarceralEnforcer => "CARCERAL_ENFORCER",
});

impl SocialRole {
    /// Roles whose members face extraction directly and can rise up.
    pub fn is_exploited(self) -> bool {
        matches!(
            self,
            SocialRole::PeripheryProletariat
                | SocialRole::InternalProletariat
                | SocialRole::Lumpenproletariat
        )
    }

    /// Roles counted as the population the carceral apparatus must hold down.
    pub fn is_controlled(self) -> bool {
        matches!(
            self,
            SocialRole::InternalProletariat | SocialRole::Lumpenproletariat
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TerritoryType {
    Core,
    Periphery,
    Reservation,
    PenalColony,
    ConcentrationCamp,
}

string_enum!(TerritoryType, "territory type", {
    Core => "CORE",
    Periphery => "PERIPHERY",
    Reservation => "RESERVATION",
    PenalColony => "PENAL_COLONY",
    ConcentrationCamp => "CONCENTRATION_CAMP",
});

impl TerritoryType {
    /// Sinks receive displaced population and are never emptied by displacement.
    pub fn is_sink(self) -> bool {
        matches!(
            self,
            TerritoryType::Reservation
                | TerritoryType::PenalColony
                | TerritoryType::ConcentrationCamp
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SectorType {
    Industrial,
    Residential,
    Commercial,
    University,
    Docks,
    Government,
    Agricultural,
}

string_enum!(SectorType, "sector type", {
    Industrial => "INDUSTRIAL",
    Residential => "RESIDENTIAL",
    Commercial => "COMMERCIAL",
    University => "UNIVERSITY",
    Docks => "DOCKS",
    Government => "GOVERNMENT",
    Agricultural => "AGRICULTURAL",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Profile {
    HighProfile,
    LowProfile,
}

string_enum!(Profile, "territory profile", {
    HighProfile => "HIGH_PROFILE",
    LowProfile => "LOW_PROFILE",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NodeKind {
    SocialClass,
    Territory,
}

string_enum!(NodeKind, "node type", {
    SocialClass => "SOCIAL_CLASS",
    Territory => "TERRITORY",
});

// ---------------------------------------------------------------------------
// Node payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ideology {
    #[serde(default)]
    pub class_consciousness: f64,
    #[serde(default)]
    pub national_identity: f64,
    #[serde(default)]
    pub agitation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialClass {
    pub role: SocialRole,
    #[serde(default)]
    pub wealth: f64,
    #[serde(default = "default_organization")]
    pub organization: f64,
    #[serde(default = "default_repression")]
    pub repression_faced: f64,
    #[serde(default = "default_subsistence")]
    pub subsistence_threshold: f64,
    #[serde(default)]
    pub ideology: Ideology,
    #[serde(default)]
    pub population: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Biological consumption (food, energy) per tick.
    #[serde(default)]
    pub s_bio: f64,
    /// Class-reproduction consumption per tick.
    #[serde(default)]
    pub s_class: f64,
    /// Nominal wealth plus the purchasing-power bonus of super-wages.
    #[serde(default)]
    pub effective_wealth: f64,
    /// Purchasing-power bonus received on the last super-wage payment.
    #[serde(default)]
    pub unearned_increment: f64,
    #[serde(default)]
    pub p_acquiescence: f64,
    #[serde(default)]
    pub p_revolution: f64,
}

impl SocialClass {
    pub fn new(role: SocialRole) -> Self {
        Self {
            role,
            wealth: 0.0,
            organization: DEFAULT_ORGANIZATION,
            repression_faced: DEFAULT_REPRESSION,
            subsistence_threshold: DEFAULT_SUBSISTENCE,
            ideology: Ideology::default(),
            population: 0.0,
            active: true,
            s_bio: 0.0,
            s_class: 0.0,
            effective_wealth: 0.0,
            unearned_increment: 0.0,
            p_acquiescence: 0.0,
            p_revolution: 0.0,
        }
    }

    pub fn consciousness(&self) -> f64 {
        self.ideology.class_consciousness
    }

    pub fn consumption(&self) -> f64 {
        self.s_bio + self.s_class
    }

    /// Pull every bounded attribute back into range.
    pub fn normalize(&mut self) {
        self.wealth = self.wealth.max(0.0);
        self.population = self.population.max(0.0);
        self.organization = clamp_unit(self.organization);
        self.repression_faced = clamp_unit(self.repression_faced);
        self.ideology.class_consciousness = clamp_unit(self.ideology.class_consciousness);
        self.ideology.national_identity = clamp_unit(self.ideology.national_identity);
        self.ideology.agitation = clamp_unit(self.ideology.agitation);
        self.p_acquiescence = clamp_unit(self.p_acquiescence);
        self.p_revolution = clamp_unit(self.p_revolution);
        self.s_bio = self.s_bio.max(0.0);
        self.s_class = self.s_class.max(0.0);
    }

    /// Every dotted path `attr` and `set_attr` understand.
    pub const ATTRIBUTES: [&str; 15] = [
        "wealth",
        "organization",
        "repression_faced",
        "subsistence_threshold",
        "population",
        "active",
        "s_bio",
        "s_class",
        "effective_wealth",
        "unearned_increment",
        "p_acquiescence",
        "p_revolution",
        "ideology.class_consciousness",
        "ideology.national_identity",
        "ideology.agitation",
    ];

    pub fn attr(&self, path: &str) -> Option<f64> {
        let v = match path {
            "wealth" => self.wealth,
            "organization" => self.organization,
            "repression_faced" => self.repression_faced,
            "subsistence_threshold" => self.subsistence_threshold,
            "population" => self.population,
            "active" => bool_value(self.active),
            "s_bio" => self.s_bio,
            "s_class" => self.s_class,
            "effective_wealth" => self.effective_wealth,
            "unearned_increment" => self.unearned_increment,
            "p_acquiescence" => self.p_acquiescence,
            "p_revolution" => self.p_revolution,
            "ideology.class_consciousness" => self.ideology.class_consciousness,
            "ideology.national_identity" => self.ideology.national_identity,
            "ideology.agitation" => self.ideology.agitation,
            _ => return None,
        };
        Some(v)
    }

    /// Write an attribute by dotted path, clamping into its documented range.
    /// Returns false for unknown paths.
    pub fn set_attr(&mut self, path: &str, value: f64) -> bool {
        match path {
            "wealth" => self.wealth = value.max(0.0),
            "organization" => self.organization = clamp_unit(value),
            "repression_faced" => self.repression_faced = clamp_unit(value),
            "subsistence_threshold" => self.subsistence_threshold = value.max(0.0),
            "population" => self.population = value.max(0.0),
            "active" => self.active = value != 0.0,
            "s_bio" => self.s_bio = value.max(0.0),
            "s_class" => self.s_class = value.max(0.0),
            "effective_wealth" => self.effective_wealth = value.max(0.0),
            "unearned_increment" => self.unearned_increment = value.max(0.0),
            "p_acquiescence" => self.p_acquiescence = clamp_unit(value),
            "p_revolution" => self.p_revolution = clamp_unit(value),
            "ideology.class_consciousness" => self.ideology.class_consciousness = clamp_unit(value),
            "ideology.national_identity" => self.ideology.national_identity = clamp_unit(value),
            "ideology.agitation" => self.ideology.agitation = clamp_unit(value),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub sector_type: SectorType,
    pub territory_type: TerritoryType,
    pub profile: Profile,
    #[serde(default)]
    pub heat: f64,
    #[serde(default)]
    pub population: f64,
    #[serde(default)]
    pub biocapacity: f64,
    /// Zero on ingestion means "same as the starting biocapacity".
    #[serde(default)]
    pub max_biocapacity: f64,
    #[serde(default)]
    pub regeneration_rate: f64,
    #[serde(default)]
    pub extraction_intensity: f64,
    #[serde(default)]
    pub rent_level: f64,
    #[serde(default)]
    pub under_eviction: bool,
}

impl Territory {
    pub fn new(territory_type: TerritoryType, profile: Profile) -> Self {
        Self {
            sector_type: SectorType::Residential,
            territory_type,
            profile,
            heat: 0.0,
            population: 0.0,
            biocapacity: 0.0,
            max_biocapacity: 0.0,
            regeneration_rate: 0.0,
            extraction_intensity: 0.0,
            rent_level: 0.0,
            under_eviction: false,
        }
    }

    pub fn normalize(&mut self) {
        if self.max_biocapacity <= 0.0 {
            self.max_biocapacity = self.biocapacity.max(0.0);
        }
        self.biocapacity = self.biocapacity.clamp(0.0, self.max_biocapacity);
        self.heat = clamp_unit(self.heat);
        self.population = self.population.max(0.0);
        self.rent_level = self.rent_level.max(0.0);
        self.regeneration_rate = self.regeneration_rate.max(0.0);
        self.extraction_intensity = self.extraction_intensity.max(0.0);
    }

    pub const ATTRIBUTES: [&str; 8] = [
        "heat",
        "population",
        "biocapacity",
        "max_biocapacity",
        "regeneration_rate",
        "extraction_intensity",
        "rent_level",
        "under_eviction",
    ];

    pub fn attr(&self, path: &str) -> Option<f64> {
        let v = match path {
            "heat" => self.heat,
            "population" => self.population,
            "biocapacity" => self.biocapacity,
            "max_biocapacity" => self.max_biocapacity,
            "regeneration_rate" => self.regeneration_rate,
            "extraction_intensity" => self.extraction_intensity,
            "rent_level" => self.rent_level,
            "under_eviction" => bool_value(self.under_eviction),
            _ => return None,
        };
        Some(v)
    }

    pub fn set_attr(&mut self, path: &str, value: f64) -> bool {
        match path {
            "heat" => self.heat = clamp_unit(value),
            "population" => self.population = value.max(0.0),
            "biocapacity" => self.biocapacity = value.clamp(0.0, self.max_biocapacity),
            "max_biocapacity" => {
                self.max_biocapacity = value.max(0.0);
                self.biocapacity = self.biocapacity.min(self.max_biocapacity);
            }
            "regeneration_rate" => self.regeneration_rate = value.max(0.0),
            "extraction_intensity" => self.extraction_intensity = value.max(0.0),
            "rent_level" => self.rent_level = value.max(0.0),
            "under_eviction" => self.under_eviction = value != 0.0,
            _ => return false,
        }
        true
    }
}

/// Whether `path` names an attribute of either node kind.
pub fn is_node_attribute(path: &str) -> bool {
    SocialClass::ATTRIBUTES.contains(&path) || Territory::ATTRIBUTES.contains(&path)
}

fn bool_value(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type")]
pub enum NodeData {
    #[serde(rename = "SOCIAL_CLASS")]
    SocialClass(SocialClass),
    #[serde(rename = "TERRITORY")]
    Territory(Territory),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::SocialClass(_) => NodeKind::SocialClass,
            NodeData::Territory(_) => NodeKind::Territory,
        }
    }

    pub fn as_class(&self) -> Option<&SocialClass> {
        match self {
            NodeData::SocialClass(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut SocialClass> {
        match self {
            NodeData::SocialClass(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_territory(&self) -> Option<&Territory> {
        match self {
            NodeData::Territory(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_territory_mut(&mut self) -> Option<&mut Territory> {
        match self {
            NodeData::Territory(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn role(&self) -> Option<SocialRole> {
        self.data.as_class().map(|c| c.role)
    }

    /// Read a numeric attribute by dotted path, e.g. `ideology.agitation`.
    pub fn attr(&self, path: &str) -> Option<f64> {
        match &self.data {
            NodeData::SocialClass(c) => c.attr(path),
            NodeData::Territory(t) => t.attr(path),
        }
    }

    pub fn set_attr(&mut self, path: &str, value: f64) -> Result<(), crate::error::GraphError> {
        let known = match &mut self.data {
            NodeData::SocialClass(c) => c.set_attr(path, value),
            NodeData::Territory(t) => t.set_attr(path, value),
        };
        if known {
            Ok(())
        } else {
            Err(crate::error::GraphError::UnknownAttribute {
                node: self.id.clone(),
                path: path.to_string(),
            })
        }
    }

    pub(crate) fn normalize(&mut self) {
        match &mut self.data {
            NodeData::SocialClass(c) => c.normalize(),
            NodeData::Territory(t) => t.normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_record_fills_documented_defaults() {
        let json =
            r#"{"id":"la","node_type":"SOCIAL_CLASS","role":"LABOR_ARISTOCRACY","wealth":5}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let class = node.data.as_class().unwrap();
        assert_eq!(class.role, SocialRole::LaborAristocracy);
        assert!((class.wealth - 5.0).abs() < f64::EPSILON);
        assert!((class.organization - DEFAULT_ORGANIZATION).abs() < f64::EPSILON);
        assert!((class.repression_faced - DEFAULT_REPRESSION).abs() < f64::EPSILON);
        assert!(class.ideology.class_consciousness.abs() < f64::EPSILON);
        assert!(class.active);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let json = r#"{"id":"x","node_type":"SOCIAL_CLASS","role":"WIZARD"}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn territory_serializes_with_type_tag() {
        let node = Node {
            id: "t1".into(),
            data: NodeData::Territory(Territory::new(
                TerritoryType::PenalColony,
                Profile::LowProfile,
            )),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["node_type"], "TERRITORY");
        assert_eq!(json["territory_type"], "PENAL_COLONY");
        assert_eq!(json["profile"], "LOW_PROFILE");
        assert_eq!(json["id"], "t1");
    }

    #[test]
    fn territory_normalize_defaults_max_biocapacity() {
        let mut t = Territory::new(TerritoryType::Periphery, Profile::LowProfile);
        t.biocapacity = 40.0;
        t.normalize();
        assert!((t.max_biocapacity - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dotted_paths_read_and_clamp() {
        let mut node = Node {
            id: "p".into(),
            data: NodeData::SocialClass(SocialClass::new(SocialRole::PeripheryProletariat)),
        };
        node.set_attr("ideology.class_consciousness", 1.7).unwrap();
        assert_eq!(node.attr("ideology.class_consciousness"), Some(1.0));
        node.set_attr("wealth", -3.0).unwrap();
        assert_eq!(node.attr("wealth"), Some(0.0));
        assert_eq!(node.attr("active"), Some(1.0));
        assert!(node.attr("heat").is_none());
        assert!(node.set_attr("heat", 0.5).is_err());
    }

    #[test]
    fn attribute_lists_match_accessors() {
        let class = SocialClass::new(SocialRole::InternalProletariat);
        for path in SocialClass::ATTRIBUTES {
            assert!(class.attr(path).is_some(), "{path}");
        }
        let territory = Territory::new(TerritoryType::Core, Profile::HighProfile);
        for path in Territory::ATTRIBUTES {
            assert!(territory.attr(path).is_some(), "{path}");
        }
        assert!(is_node_attribute("ideology.agitation"));
        assert!(is_node_attribute("heat"));
        assert!(!is_node_attribute("ideology.agitaton"));
    }

    #[test]
    fn role_predicates() {
        assert!(SocialRole::PeripheryProletariat.is_exploited());
        assert!(!SocialRole::LaborAristocracy.is_exploited());
        assert!(SocialRole::Lumpenproletariat.is_controlled());
        assert!(!SocialRole::CarceralEnforcer.is_controlled());
        assert!(TerritoryType::ConcentrationCamp.is_sink());
        assert!(!TerritoryType::Core.is_sink());
    }
}

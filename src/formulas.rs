//! Pure numeric functions shared by the systems.
//!
//! Nothing here touches the graph; every function is a plain `f64` mapping.

/// Clamp into [0, 1], mapping NaN to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Survival calculus
// ---------------------------------------------------------------------------

/// P(S|A): probability of surviving by acquiescing. Sigmoid in wealth,
/// centred on the subsistence threshold.
pub fn acquiescence_probability(wealth: f64, subsistence: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (wealth - subsistence)).exp())
}

/// P(S|R): probability of surviving by revolting.
pub fn revolution_probability(organization: f64, repression: f64) -> f64 {
    clamp_unit(organization / (1.0 + repression.max(0.0)))
}

/// P(S|R) / P(S|A).
///
/// When P(S|A) is exactly zero the ratio is 1.0 if P(S|R) is positive and
/// 0.0 otherwise.
pub fn stability_ratio(p_revolution: f64, p_acquiescence: f64) -> f64 {
    if p_acquiescence == 0.0 {
        if p_revolution > 0.0 { 1.0 } else { 0.0 }
    } else {
        p_revolution / p_acquiescence
    }
}

// ---------------------------------------------------------------------------
// Imperial rent
// ---------------------------------------------------------------------------

/// Extraction efficiency after `tick` ticks of falling profit rate.
pub fn extraction_efficiency(alpha: f64, trpf_coefficient: f64, floor: f64, tick: u64) -> f64 {
    alpha * (1.0 - trpf_coefficient * tick as f64).max(floor)
}

/// Rent extracted from a class: efficiency * wealth * (1 - consciousness).
pub fn imperial_rent(efficiency: f64, wealth: f64, consciousness: f64) -> f64 {
    (efficiency * wealth.max(0.0) * (1.0 - clamp_unit(consciousness))).max(0.0)
}

// ---------------------------------------------------------------------------
// Ecology
// ---------------------------------------------------------------------------

/// Net biocapacity change: regeneration minus entropy-weighted extraction.
pub fn biocapacity_delta(regeneration: f64, extraction: f64, entropy_factor: f64) -> f64 {
    regeneration - extraction * entropy_factor
}

/// Consumption over biocapacity. Positive consumption on zero biocapacity
/// is infinite overshoot; nothing over nothing is zero.
pub fn overshoot_ratio(consumption: f64, biocapacity: f64) -> f64 {
    if biocapacity > 0.0 {
        consumption / biocapacity
    } else if consumption > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Class-wealth dynamics
// ---------------------------------------------------------------------------

/// Shares of total wealth held by the four classes of the imperial circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassShares {
    pub periphery: f64,
    pub comprador: f64,
    pub core: f64,
    pub labor_aristocracy: f64,
}

impl ClassShares {
    pub fn total(&self) -> f64 {
        self.periphery + self.comprador + self.core + self.labor_aristocracy
    }

    fn normalized(self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return Self {
                periphery: 0.25,
                comprador: 0.25,
                core: 0.25,
                labor_aristocracy: 0.25,
            };
        }
        Self {
            periphery: self.periphery / total,
            comprador: self.comprador / total,
            core: self.core / total,
            labor_aristocracy: self.labor_aristocracy / total,
        }
    }
}

/// Per-unit-time flow rates between the four classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRates {
    /// periphery -> comprador
    pub extraction: f64,
    /// comprador -> core
    pub tribute: f64,
    /// core -> labor aristocracy
    pub super_wage: f64,
    /// labor aristocracy -> periphery, spending on imported goods
    pub consumption: f64,
}

/// d(share)/dt for each class. Every flow leaves one class and enters
/// another, so the derivatives sum to zero.
pub fn class_wealth_derivatives(shares: &ClassShares, rates: &FlowRates) -> ClassShares {
    let extraction = rates.extraction * shares.periphery;
    let tribute = rates.tribute * shares.comprador;
    let wages = rates.super_wage * shares.core;
    let consumption = rates.consumption * shares.labor_aristocracy;
    ClassShares {
        periphery: consumption - extraction,
        comprador: extraction - tribute,
        core: tribute - wages,
        labor_aristocracy: wages - consumption,
    }
}

/// One Euler step of the class-wealth ODE. Shares stay non-negative and are
/// renormalized so they keep summing to 1.0.
pub fn integrate_class_shares(shares: &ClassShares, rates: &FlowRates, dt: f64) -> ClassShares {
    // A flow can move at most the whole source share in one step.
    let bounded = FlowRates {
        extraction: (rates.extraction * dt).clamp(0.0, 1.0),
        tribute: (rates.tribute * dt).clamp(0.0, 1.0),
        super_wage: (rates.super_wage * dt).clamp(0.0, 1.0),
        consumption: (rates.consumption * dt).clamp(0.0, 1.0),
    };
    let d = class_wealth_derivatives(shares, &bounded);
    ClassShares {
        periphery: (shares.periphery + d.periphery).max(0.0),
        comprador: (shares.comprador + d.comprador).max(0.0),
        core: (shares.core + d.core).max(0.0),
        labor_aristocracy: (shares.labor_aristocracy + d.labor_aristocracy).max(0.0),
    }
    .normalized()
}

// ---------------------------------------------------------------------------
// Bourgeoisie decision heuristic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyDecision {
    Bribery,
    Austerity,
    IronFist,
    Crisis,
    NoChange,
}

string_enum!(PolicyDecision, "policy decision", {
    Bribery => "BRIBERY",
    Austerity => "AUSTERITY",
    IronFist => "IRON_FIST",
    Crisis => "CRISIS",
    NoChange => "NO_CHANGE",
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionThresholds {
    pub high: f64,
    pub low: f64,
    pub critical: f64,
    /// Bribery needs tension strictly below this.
    pub bribery_tension: f64,
    /// Below `low`, tension above this means iron fist instead of austerity.
    pub iron_fist_tension: f64,
}

/// Magnitudes of each policy's adjustments. Signs are applied by
/// [`policy_deltas`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDeltas {
    pub bribery_wage: f64,
    pub austerity_wage: f64,
    pub iron_fist_repression: f64,
    pub crisis_wage: f64,
    pub crisis_repression: f64,
}

/// Pick the core bourgeoisie's policy from the pool ratio and mean tension.
/// A critical pool overrides everything else.
pub fn bourgeoisie_decision(
    pool_ratio: f64,
    tension: f64,
    thresholds: &DecisionThresholds,
) -> PolicyDecision {
    if pool_ratio < thresholds.critical {
        PolicyDecision::Crisis
    } else if pool_ratio >= thresholds.high && tension < thresholds.bribery_tension {
        PolicyDecision::Bribery
    } else if pool_ratio < thresholds.low {
        if tension <= thresholds.iron_fist_tension {
            PolicyDecision::Austerity
        } else {
            PolicyDecision::IronFist
        }
    } else {
        PolicyDecision::NoChange
    }
}

/// (wage rate delta, repression delta) for a decision.
pub fn policy_deltas(decision: PolicyDecision, deltas: &PolicyDeltas) -> (f64, f64) {
    match decision {
        PolicyDecision::Bribery => (deltas.bribery_wage, 0.0),
        PolicyDecision::Austerity => (-deltas.austerity_wage, 0.0),
        PolicyDecision::IronFist => (0.0, deltas.iron_fist_repression),
        PolicyDecision::Crisis => (-deltas.crisis_wage, deltas.crisis_repression),
        PolicyDecision::NoChange => (0.0, 0.0),
    }
}

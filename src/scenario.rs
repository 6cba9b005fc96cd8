use crate::model::*;

// -- Builder-style ref types --

/// Typed reference to a social class in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::class`] (creation) or [`Scenario::class_mut`] (mutation).
/// Call [`.id()`](ClassRef::id) to terminate the chain and extract the node id.
pub struct ClassRef<'a> {
    scenario: &'a mut Scenario,
    pos: usize,
}

#[rustfmt::skip]
impl<'a> ClassRef<'a> {
    fn data_mut(&mut self) -> &mut SocialClass {
        match &mut self.scenario.nodes[self.pos].data {
            NodeData::SocialClass(c) => c,
            NodeData::Territory(_) => unreachable!("ClassRef always points at a class"),
        }
    }

    pub fn wealth(mut self, v: f64) -> Self { self.data_mut().wealth = v; self }
    pub fn organization(mut self, v: f64) -> Self { self.data_mut().organization = v; self }
    pub fn repression(mut self, v: f64) -> Self { self.data_mut().repression_faced = v; self }
    pub fn subsistence(mut self, v: f64) -> Self { self.data_mut().subsistence_threshold = v; self }
    pub fn population(mut self, v: f64) -> Self { self.data_mut().population = v; self }
    pub fn active(mut self, v: bool) -> Self { self.data_mut().active = v; self }
    pub fn s_bio(mut self, v: f64) -> Self { self.data_mut().s_bio = v; self }
    pub fn s_class(mut self, v: f64) -> Self { self.data_mut().s_class = v; self }
    pub fn consciousness(mut self, v: f64) -> Self { self.data_mut().ideology.class_consciousness = v; self }
    pub fn national_identity(mut self, v: f64) -> Self { self.data_mut().ideology.national_identity = v; self }
    pub fn agitation(mut self, v: f64) -> Self { self.data_mut().ideology.agitation = v; self }

    /// Escape hatch: apply an arbitrary closure to the class data.
    pub fn with(mut self, f: impl FnOnce(&mut SocialClass)) -> Self { f(self.data_mut()); self }

    /// Terminate the chain and return the node id.
    pub fn id(self) -> String { self.scenario.nodes[self.pos].id.clone() }
}

/// Typed reference to a territory in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::territory`] (creation) or [`Scenario::territory_mut`] (mutation).
pub struct TerritoryRef<'a> {
    scenario: &'a mut Scenario,
    pos: usize,
}

#[rustfmt::skip]
impl<'a> TerritoryRef<'a> {
    fn data_mut(&mut self) -> &mut Territory {
        match &mut self.scenario.nodes[self.pos].data {
            NodeData::Territory(t) => t,
            NodeData::SocialClass(_) => unreachable!("TerritoryRef always points at a territory"),
        }
    }

    pub fn profile(mut self, v: Profile) -> Self { self.data_mut().profile = v; self }
    pub fn sector(mut self, v: SectorType) -> Self { self.data_mut().sector_type = v; self }
    pub fn heat(mut self, v: f64) -> Self { self.data_mut().heat = v; self }
    pub fn population(mut self, v: f64) -> Self { self.data_mut().population = v; self }
    pub fn biocapacity(mut self, v: f64) -> Self { self.data_mut().biocapacity = v; self }
    pub fn max_biocapacity(mut self, v: f64) -> Self { self.data_mut().max_biocapacity = v; self }
    pub fn regeneration_rate(mut self, v: f64) -> Self { self.data_mut().regeneration_rate = v; self }
    pub fn extraction_intensity(mut self, v: f64) -> Self { self.data_mut().extraction_intensity = v; self }
    pub fn rent_level(mut self, v: f64) -> Self { self.data_mut().rent_level = v; self }
    pub fn under_eviction(mut self, v: bool) -> Self { self.data_mut().under_eviction = v; self }

    /// Escape hatch: apply an arbitrary closure to the territory data.
    pub fn with(mut self, f: impl FnOnce(&mut Territory)) -> Self { f(self.data_mut()); self }

    /// Terminate the chain and return the node id.
    pub fn id(self) -> String { self.scenario.nodes[self.pos].id.clone() }
}

/// Typed reference to an edge in a [`Scenario`].
pub struct EdgeRef<'a> {
    scenario: &'a mut Scenario,
    pos: usize,
}

#[rustfmt::skip]
impl<'a> EdgeRef<'a> {
    fn attrs_mut(&mut self) -> &mut EdgeAttrs {
        &mut self.scenario.edges[self.pos].attrs
    }

    pub fn tension(mut self, v: f64) -> Self { self.attrs_mut().tension = v; self }
    pub fn solidarity_strength(mut self, v: f64) -> Self { self.attrs_mut().solidarity_strength = v; self }
    pub fn subsidy_cap(mut self, v: f64) -> Self { self.attrs_mut().subsidy_cap = v; self }
    pub fn value_flow(mut self, v: f64) -> Self { self.attrs_mut().value_flow = v; self }
}

struct PendingEdge {
    source: String,
    target: String,
    kind: EdgeType,
    attrs: EdgeAttrs,
}

/// Fluent builder for constructing a [`WorldGraph`].
///
/// Nodes and edges are collected as written and inserted in that order by
/// [`build`](Scenario::build), so attribute setters may be chained in any
/// order and range clamping happens once, at insertion. Used by tests, the
/// demo binary and as the starting point for hand-written worlds.
///
/// # Panics
///
/// The builder panics on malformed input (duplicate ids, edges to unknown
/// nodes, self loops). Load untrusted data through
/// [`WorldGraph::from_state`] instead.
#[derive(Default)]
pub struct Scenario {
    nodes: Vec<Node>,
    edges: Vec<PendingEdge>,
    metadata: GraphMetadata,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder-style creation --

    /// Add a social class with the documented defaults and return a builder ref.
    pub fn class(&mut self, id: &str, role: SocialRole) -> ClassRef<'_> {
        let pos = self.push_node(id, NodeData::SocialClass(SocialClass::new(role)));
        ClassRef {
            scenario: self,
            pos,
        }
    }

    /// Add a low-profile residential territory and return a builder ref.
    pub fn territory(&mut self, id: &str, territory_type: TerritoryType) -> TerritoryRef<'_> {
        let data = NodeData::Territory(Territory::new(territory_type, Profile::LowProfile));
        let pos = self.push_node(id, data);
        TerritoryRef {
            scenario: self,
            pos,
        }
    }

    /// Add a directed edge with zeroed attributes.
    pub fn edge(&mut self, source: &str, target: &str, kind: EdgeType) -> EdgeRef<'_> {
        self.edges.push(PendingEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            attrs: EdgeAttrs::default(),
        });
        let pos = self.edges.len() - 1;
        EdgeRef {
            scenario: self,
            pos,
        }
    }

    /// Add the same edge type in both directions.
    pub fn mutual(&mut self, a: &str, b: &str, kind: EdgeType, solidarity_strength: f64) {
        self.edge(a, b, kind).solidarity_strength(solidarity_strength);
        self.edge(b, a, kind).solidarity_strength(solidarity_strength);
    }

    // -- Builder-style mutation --

    /// Return a builder ref for an existing class.
    pub fn class_mut(&mut self, id: &str) -> ClassRef<'_> {
        let pos = self.position(id);
        assert!(
            self.nodes[pos].data.as_class().is_some(),
            "node {id} is not a social class"
        );
        ClassRef {
            scenario: self,
            pos,
        }
    }

    /// Return a builder ref for an existing territory.
    pub fn territory_mut(&mut self, id: &str) -> TerritoryRef<'_> {
        let pos = self.position(id);
        assert!(
            self.nodes[pos].data.as_territory().is_some(),
            "node {id} is not a territory"
        );
        TerritoryRef {
            scenario: self,
            pos,
        }
    }

    /// Return a builder ref for the first edge of `kind` from `source` to `target`.
    pub fn edge_mut(&mut self, source: &str, target: &str, kind: EdgeType) -> EdgeRef<'_> {
        let pos = self
            .edges
            .iter()
            .position(|e| e.source == source && e.target == target && e.kind == kind)
            .unwrap_or_else(|| panic!("no {kind} edge from {source} to {target}"));
        EdgeRef {
            scenario: self,
            pos,
        }
    }

    /// Start the world with displacement already forced into `mode`.
    pub fn displacement_override(&mut self, mode: DisplacementMode) -> &mut Self {
        self.metadata.displacement_override = Some(mode);
        self
    }

    /// Seed the economy singleton instead of letting the first tick create it.
    pub fn economy(&mut self, state: EconomyState) -> &mut Self {
        self.metadata.economy = Some(state);
        self
    }

    // -- Output --

    /// Consume the scenario and return the constructed graph.
    pub fn build(self) -> WorldGraph {
        let mut graph = WorldGraph::new();
        for node in self.nodes {
            let id = node.id.clone();
            graph
                .add_node(node)
                .unwrap_or_else(|e| panic!("scenario node {id}: {e}"));
        }
        for e in self.edges {
            graph
                .add_edge(&e.source, &e.target, e.kind, e.attrs)
                .unwrap_or_else(|err| panic!("scenario edge {} -> {}: {err}", e.source, e.target));
        }
        graph.metadata = self.metadata;
        graph
    }

    fn push_node(&mut self, id: &str, data: NodeData) -> usize {
        assert!(
            self.nodes.iter().all(|n| n.id != id),
            "duplicate node id {id}"
        );
        self.nodes.push(Node {
            id: id.to_string(),
            data,
        });
        self.nodes.len() - 1
    }

    fn position(&self, id: &str) -> usize {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .unwrap_or_else(|| panic!("no node {id} in scenario"))
    }

    // -- Presets --

    /// A complete imperial circuit: a periphery worked through a comprador,
    /// a core paying super-wages to its labor aristocracy, a client state,
    /// an internal colony with its enforcers, and a ring of territories
    /// ending in the three sinks.
    pub fn imperial_circuit() -> Scenario {
        let mut s = Scenario::new();

        s.class("periphery_workers", SocialRole::PeripheryProletariat)
            .wealth(200.0)
            .population(5000.0)
            .organization(0.3)
            .repression(0.6)
            .consciousness(0.4)
            .agitation(0.3)
            .s_bio(4.0);
        s.class("comprador", SocialRole::CompradorBourgeoisie)
            .wealth(40.0)
            .population(50.0)
            .organization(0.6)
            .repression(0.1)
            .s_class(2.0);
        s.class("core_owners", SocialRole::CoreBourgeoisie)
            .wealth(500.0)
            .population(100.0)
            .organization(0.8)
            .repression(0.05)
            .s_class(6.0);
        s.class("labor_aristocracy", SocialRole::LaborAristocracy)
            .wealth(30.0)
            .population(800.0)
            .subsistence(5.0)
            .consciousness(0.1)
            .s_bio(3.0)
            .s_class(2.0);
        s.class("client_regime", SocialRole::CompradorBourgeoisie)
            .wealth(20.0)
            .population(30.0)
            .organization(0.2)
            .repression(0.3);
        s.class("internal_proletariat", SocialRole::InternalProletariat)
            .wealth(10.0)
            .population(1200.0)
            .organization(0.35)
            .repression(0.7)
            .consciousness(0.5)
            .agitation(0.4)
            .s_bio(2.0);
        s.class("lumpen", SocialRole::Lumpenproletariat)
            .wealth(1.0)
            .population(300.0)
            .organization(0.1)
            .repression(0.8)
            .agitation(0.5);
        s.class("police", SocialRole::CarceralEnforcer)
            .wealth(15.0)
            .population(200.0)
            .organization(0.7)
            .repression(0.0);
        s.class("shopkeepers", SocialRole::PettyBourgeoisie)
            .wealth(25.0)
            .population(400.0)
            .consciousness(0.2);

        s.territory("downtown", TerritoryType::Core)
            .profile(Profile::HighProfile)
            .sector(SectorType::Commercial)
            .heat(0.3)
            .population(2000.0)
            .biocapacity(50.0)
            .max_biocapacity(60.0)
            .regeneration_rate(0.02)
            .extraction_intensity(0.05)
            .rent_level(10.0);
        s.territory("harbor", TerritoryType::Core)
            .sector(SectorType::Docks)
            .heat(0.1)
            .population(800.0)
            .biocapacity(30.0)
            .regeneration_rate(0.02)
            .extraction_intensity(0.02)
            .rent_level(4.0);
        s.territory("plantations", TerritoryType::Periphery)
            .sector(SectorType::Agricultural)
            .population(5000.0)
            .biocapacity(120.0)
            .max_biocapacity(150.0)
            .regeneration_rate(0.03)
            .extraction_intensity(0.08)
            .rent_level(1.0);
        s.territory("reservation", TerritoryType::Reservation).population(300.0);
        s.territory("penal_colony", TerritoryType::PenalColony)
            .sector(SectorType::Industrial)
            .population(150.0);
        s.territory("camp", TerritoryType::ConcentrationCamp);

        // Economic circuit.
        s.edge("periphery_workers", "comprador", EdgeType::Exploitation);
        s.edge("comprador", "core_owners", EdgeType::Tribute);
        s.edge("core_owners", "labor_aristocracy", EdgeType::Wages);
        s.edge("core_owners", "client_regime", EdgeType::ClientState)
            .subsidy_cap(15.0);

        // Political relations.
        s.mutual("periphery_workers", "internal_proletariat", EdgeType::Solidarity, 0.4);
        s.mutual("internal_proletariat", "lumpen", EdgeType::Solidarity, 0.3);
        s.edge("police", "internal_proletariat", EdgeType::Repression)
            .tension(0.4);
        s.edge("police", "lumpen", EdgeType::Repression).tension(0.5);

        // Land.
        s.edge("periphery_workers", "plantations", EdgeType::Tenancy);
        s.edge("internal_proletariat", "harbor", EdgeType::Tenancy);
        s.edge("lumpen", "penal_colony", EdgeType::Tenancy);
        s.edge("shopkeepers", "downtown", EdgeType::Tenancy);
        s.edge("labor_aristocracy", "downtown", EdgeType::Tenancy);
        for sink in ["penal_colony", "reservation", "camp"] {
            s.edge("downtown", sink, EdgeType::Adjacency);
        }
        s.edge("downtown", "harbor", EdgeType::Adjacency);
        s.edge("harbor", "downtown", EdgeType::Adjacency);

        s
    }
}

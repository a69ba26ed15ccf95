//! Vocabulary shared with a routing engine.
//!
//! A [`RoutingModel`] describes one constrained single-depot routing problem in
//! engine terms: an arc-cost evaluator, cumulative dimensions with per-node
//! ranges, optional-visit disjunctions and per-vehicle span bounds. Engines
//! answer with a [`SolveOutcome`].

use std::time::Duration;

/// Only vehicle 0 carries a route; additional vehicles stay idle.
pub(crate) const ROUTED_VEHICLE: usize = 0;

/// Callback evaluated on an arc `(from, to)` of node indices.
pub type ArcFn<'a> = Box<dyn Fn(usize, usize) -> i64 + 'a>;

/// Handle to a dimension registered on a [`RoutingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionId(usize);

impl DimensionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inclusive bounds of a cumul variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulRange {
    pub min: i64,
    pub max: i64,
}

impl CumulRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A quantity accumulated along the route, e.g. elapsed time.
pub struct Dimension<'a> {
    name: String,
    transit: ArcFn<'a>,
    slack_max: i64,
    capacity: i64,
    ranges: Vec<CumulRange>,
    span_upper_bounds: Vec<Option<i64>>,
}

impl<'a> Dimension<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transit(&self, from: usize, to: usize) -> i64 {
        (self.transit)(from, to)
    }

    /// Longest wait allowed at a node.
    pub fn slack_max(&self) -> i64 {
        self.slack_max
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Range of a node's cumul. For the depot this bounds the route start.
    pub fn range(&self, node: usize) -> CumulRange {
        self.ranges[node]
    }

    pub fn span_upper_bound(&self, vehicle: usize) -> Option<i64> {
        self.span_upper_bounds.get(vehicle).copied().flatten()
    }
}

/// A group of nodes of which at most one is visited; leaving all of them out
/// costs `penalty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction {
    pub nodes: Vec<usize>,
    pub penalty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstSolutionStrategy {
    /// Repeatedly insert the node whose cheapest feasible insertion costs
    /// least.
    #[default]
    CheapestInsertion,
    /// Extend the route from its last node along the cheapest feasible arc.
    PathCheapestArc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalSearchMetaheuristic {
    /// Stop at the first local optimum.
    GreedyDescent,
    /// Escape local optima by penalizing expensive arcs.
    #[default]
    GuidedLocalSearch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub first_solution_strategy: FirstSolutionStrategy,
    pub metaheuristic: LocalSearchMetaheuristic,
    pub time_limit: Duration,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::default(),
            metaheuristic: LocalSearchMetaheuristic::default(),
            time_limit: Duration::from_secs(crate::request::DEFAULT_TIME_LIMIT_SECONDS),
        }
    }
}

/// Engine-ready description of one routing problem.
pub struct RoutingModel<'a> {
    node_count: usize,
    vehicle_count: usize,
    depot: usize,
    arc_cost: Option<ArcFn<'a>>,
    dimensions: Vec<Dimension<'a>>,
    disjunctions: Vec<Disjunction>,
}

impl<'a> RoutingModel<'a> {
    pub fn new(node_count: usize, vehicle_count: usize, depot: usize) -> Self {
        Self {
            node_count,
            vehicle_count,
            depot,
            arc_cost: None,
            dimensions: Vec::new(),
            disjunctions: Vec::new(),
        }
    }

    pub fn set_arc_cost(&mut self, cost: impl Fn(usize, usize) -> i64 + 'a) {
        self.arc_cost = Some(Box::new(cost));
    }

    /// Registers a dimension whose cumul grows by `transit` along each arc.
    ///
    /// Every node starts with the range `[0, capacity]`.
    pub fn add_dimension(
        &mut self,
        name: impl Into<String>,
        transit: impl Fn(usize, usize) -> i64 + 'a,
        slack_max: i64,
        capacity: i64,
    ) -> DimensionId {
        self.dimensions.push(Dimension {
            name: name.into(),
            transit: Box::new(transit),
            slack_max,
            capacity,
            ranges: vec![CumulRange::new(0, capacity); self.node_count],
            span_upper_bounds: vec![None; self.vehicle_count],
        });
        DimensionId(self.dimensions.len() - 1)
    }

    /// Restricts a node's cumul. Out-of-range handles are ignored here and
    /// reported by engines as an invalid model.
    pub fn set_cumul_range(&mut self, dimension: DimensionId, node: usize, range: CumulRange) {
        if let Some(slot) = self
            .dimensions
            .get_mut(dimension.0)
            .and_then(|dim| dim.ranges.get_mut(node))
        {
            *slot = range;
        }
    }

    pub fn set_span_upper_bound(&mut self, dimension: DimensionId, vehicle: usize, bound: i64) {
        if let Some(slot) = self
            .dimensions
            .get_mut(dimension.0)
            .and_then(|dim| dim.span_upper_bounds.get_mut(vehicle))
        {
            *slot = Some(bound);
        }
    }

    pub fn add_disjunction(&mut self, nodes: Vec<usize>, penalty: i64) {
        self.disjunctions.push(Disjunction { nodes, penalty });
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    pub fn depot(&self) -> usize {
        self.depot
    }

    pub fn has_arc_cost(&self) -> bool {
        self.arc_cost.is_some()
    }

    /// Cost of an arc; zero when no evaluator is registered.
    pub fn arc_cost(&self, from: usize, to: usize) -> i64 {
        self.arc_cost.as_ref().map_or(0, |cost| cost(from, to))
    }

    pub fn dimensions(&self) -> &[Dimension<'a>] {
        &self.dimensions
    }

    pub fn dimension(&self, id: DimensionId) -> Option<&Dimension<'a>> {
        self.dimensions.get(id.0)
    }

    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }
}

/// Engine status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    NotSolved,
    Success,
    /// A solution exists but the search was cut short.
    PartialSuccess,
    Fail,
    FailTimeout,
    Invalid,
    Infeasible,
    /// The search proved the returned solution optimal.
    Optimal,
}

/// One vehicle's resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRoute {
    path: Vec<usize>,
    cumuls: Vec<Vec<i64>>,
}

impl VehicleRoute {
    /// `path` runs depot, stops..., depot; `cumuls` holds one value per path
    /// position for every dimension.
    pub fn new(path: Vec<usize>, cumuls: Vec<Vec<i64>>) -> Self {
        Self { path, cumuls }
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Node at `position`, or `None` past the end marker.
    pub fn next(&self, position: usize) -> Option<usize> {
        self.path.get(position + 1).copied()
    }

    /// The last position is the route end, not a visit.
    pub fn is_end(&self, position: usize) -> bool {
        position + 1 >= self.path.len()
    }

    pub fn cumul(&self, dimension: DimensionId, position: usize) -> Option<i64> {
        self.cumuls
            .get(dimension.0)
            .and_then(|values| values.get(position))
            .copied()
    }
}

/// Engine answer: routes plus the objective they achieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    routes: Vec<VehicleRoute>,
    objective: i64,
}

impl Assignment {
    pub fn new(routes: Vec<VehicleRoute>, objective: i64) -> Self {
        Self { routes, objective }
    }

    pub fn route(&self, vehicle: usize) -> Option<&VehicleRoute> {
        self.routes.get(vehicle)
    }

    pub fn objective(&self) -> i64 {
        self.objective
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved {
        assignment: Assignment,
        status: EngineStatus,
    },
    Failed(EngineStatus),
}

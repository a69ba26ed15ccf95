//! Expresses a [`RoutingProblem`] in engine terms.

use tracing::{debug, warn};

use crate::extract::RouteSolution;
use crate::model::{
    CumulRange, DimensionId, FirstSolutionStrategy, LocalSearchMetaheuristic, RoutingModel,
    SearchParameters,
};
use crate::problem::{RoutingProblem, WindowConstraint};
use crate::request::SolverStatus;

/// Smallest cost of leaving a visit out of the route.
pub const MIN_DROP_PENALTY: i64 = 100_000_000;

pub const TIME_DIMENSION: &str = "time";

/// A model ready for [`crate::traits::RoutingEngine::solve`].
pub struct EncodedModel<'p> {
    pub model: RoutingModel<'p>,
    pub time: DimensionId,
    pub parameters: SearchParameters,
}

pub enum Encoded<'p> {
    /// The answer is known without a search.
    ShortCircuit(RouteSolution),
    Model(EncodedModel<'p>),
}

/// Penalty for dropping a visit; exceeds the cost of any route through all
/// nodes.
pub fn drop_penalty(problem: &RoutingProblem) -> i64 {
    let worst_route = problem
        .distance_matrix
        .iter()
        .map(|row| row.iter().copied().max().unwrap_or(0).max(0))
        .fold(0_i64, i64::saturating_add);
    MIN_DROP_PENALTY.max(worst_route.saturating_add(1))
}

/// Cumul range for a node's window, clamped to `[0, horizon]`.
///
/// A window that is inverted after clamping falls back to the full range.
pub fn window_range(node: usize, window: WindowConstraint, horizon: i64) -> CumulRange {
    let full = CumulRange::new(0, horizon);
    let Some((earliest, latest)) = window.endpoints() else {
        return full;
    };
    let earliest = earliest.clamp(0, horizon);
    let latest = latest.clamp(0, horizon);
    if earliest > latest {
        warn!(node, earliest, latest, "inverted time window, treating as unconstrained");
        return full;
    }
    CumulRange::new(earliest, latest)
}

pub fn encode(problem: &RoutingProblem) -> Encoded<'_> {
    let node_count = problem.node_count();
    let depot = problem.depot;

    if node_count <= 1 {
        return Encoded::ShortCircuit(RouteSolution::depot_only());
    }
    if node_count == 2 {
        return Encoded::ShortCircuit(single_visit(problem));
    }

    let horizon = problem.horizon.max(0);
    let mut model = RoutingModel::new(node_count, problem.vehicle_count, depot);
    model.set_arc_cost(move |from, to| problem.distance(from, to));
    let time = model.add_dimension(
        TIME_DIMENSION,
        move |from, to| problem.transit_time(from, to),
        horizon,
        horizon,
    );

    for (node, window) in problem.time_windows.iter().enumerate() {
        if node == depot {
            if window.endpoints().is_some() {
                warn!(node, "time window on the depot is ignored");
            }
            model.set_cumul_range(time, node, CumulRange::new(0, 0));
            continue;
        }
        model.set_cumul_range(time, node, window_range(node, *window, horizon));
    }

    let penalty = drop_penalty(problem);
    for node in problem.visits() {
        model.add_disjunction(vec![node], penalty);
    }

    if let Some(duration) = problem.max_route_duration {
        for vehicle in 0..problem.vehicle_count {
            model.set_span_upper_bound(time, vehicle, duration);
        }
    }

    debug!(node_count, horizon, penalty, "encoded routing model");
    Encoded::Model(EncodedModel {
        model,
        time,
        parameters: SearchParameters {
            first_solution_strategy: FirstSolutionStrategy::CheapestInsertion,
            metaheuristic: LocalSearchMetaheuristic::GuidedLocalSearch,
            time_limit: problem.time_limit,
        },
    })
}

/// Depot plus one visit: the only route is out and back.
fn single_visit(problem: &RoutingProblem) -> RouteSolution {
    let depot = problem.depot;
    let visit = 1 - depot;
    let outbound = problem.travel_time(depot, visit);
    RouteSolution {
        visit_order: vec![visit],
        arrivals: vec![outbound],
        total_distance: problem
            .distance(depot, visit)
            .saturating_add(problem.distance(visit, depot)),
        total_duration: outbound
            .saturating_add(problem.service_times[visit])
            .saturating_add(problem.travel_time(visit, depot)),
        feasible: true,
        dropped: Vec::new(),
        status: SolverStatus::Optimal,
    }
}

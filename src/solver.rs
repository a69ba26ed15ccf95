//! Request-level entry points: optimize, evaluate a fixed order, batch.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::encoder::{self, Encoded};
use crate::error::{OptimizeError, ValidationError};
use crate::extract::{self, RouteSolution};
use crate::problem::RoutingProblem;
use crate::request::{
    BatchItem, ErrorBody, EvaluateRequest, OptimizeRequest, OptimizeResponse, SolverStatus,
};
use crate::traits::RoutingEngine;

impl From<RouteSolution> for OptimizeResponse {
    fn from(solution: RouteSolution) -> Self {
        Self {
            visit_order: solution.visit_order,
            total_distance_meters: solution.total_distance,
            total_duration_seconds: solution.total_duration,
            estimated_arrivals: solution.arrivals,
            feasible: solution.feasible,
            dropped_visits: solution.dropped,
            solver_status: solution.status,
        }
    }
}

/// Sequences the visits of one request.
///
/// Validation failures are returned before any model is built. An engine that
/// finds no route is not an error: the response reports every visit dropped.
pub fn optimize<E>(request: &OptimizeRequest, engine: &E) -> Result<OptimizeResponse, OptimizeError>
where
    E: RoutingEngine + ?Sized,
{
    request.validate()?;
    let problem = RoutingProblem::build(request);
    info!(
        nodes = problem.node_count(),
        vehicles = problem.vehicle_count,
        time_limit_secs = problem.time_limit.as_secs(),
        horizon = problem.horizon,
        "solving route"
    );

    let solution = match encoder::encode(&problem) {
        Encoded::ShortCircuit(solution) => solution,
        Encoded::Model(encoded) => {
            let outcome = engine.solve(&encoded.model, &encoded.parameters);
            extract::extract(&problem, encoded.time, outcome)?
        }
    };

    if solution.status == SolverStatus::NoSolution {
        warn!(dropped = solution.dropped.len(), "no route found");
    } else {
        info!(
            visits = solution.visit_order.len(),
            distance = solution.total_distance,
            duration = solution.total_duration,
            dropped = solution.dropped.len(),
            status = solution.status.as_str(),
            "route solved"
        );
    }
    Ok(solution.into())
}

/// Solves independent requests in parallel; results keep the input order.
pub fn optimize_batch<E>(requests: &[OptimizeRequest], engine: &E) -> Vec<BatchItem>
where
    E: RoutingEngine + Sync + ?Sized,
{
    info!(requests = requests.len(), "solving batch");
    requests
        .par_iter()
        .map(|request| match optimize(request, engine) {
            Ok(response) => BatchItem::Solved(response),
            Err(err) => BatchItem::Rejected(ErrorBody {
                detail: err.to_string(),
            }),
        })
        .collect()
}

/// Schedules a caller-chosen visit order without searching.
///
/// Arrivals wait for windows to open like the optimized schedule does. The
/// order must list every visit exactly once.
pub fn evaluate_order(request: &EvaluateRequest) -> Result<OptimizeResponse, OptimizeError> {
    request.problem.validate()?;
    let problem = RoutingProblem::build(&request.problem);
    check_order(&problem, &request.visit_order)?;

    let depot = problem.depot;
    let mut cumul: i64 = 0;
    let mut prev = depot;
    let mut total_distance: i64 = 0;
    let mut on_time = true;
    let mut arrivals = Vec::with_capacity(request.visit_order.len());
    for &node in &request.visit_order {
        let arrival = cumul.saturating_add(problem.transit_time(prev, node));
        let window = encoder::window_range(node, problem.time_windows[node], i64::MAX);
        let value = arrival.max(window.min);
        on_time &= window.contains(value);
        arrivals.push(value);
        total_distance = total_distance.saturating_add(problem.distance(prev, node));
        cumul = value;
        prev = node;
    }
    let total_duration = if request.visit_order.is_empty() {
        0
    } else {
        cumul.saturating_add(problem.transit_time(prev, depot))
    };
    let within_span = problem
        .max_route_duration
        .is_none_or(|limit| total_duration <= limit);

    info!(
        visits = request.visit_order.len(),
        distance = total_distance,
        duration = total_duration,
        on_time,
        within_span,
        "evaluated manual order"
    );
    Ok(OptimizeResponse {
        visit_order: request.visit_order.clone(),
        total_distance_meters: total_distance,
        total_duration_seconds: total_duration,
        estimated_arrivals: arrivals,
        feasible: on_time && within_span,
        dropped_visits: Vec::new(),
        solver_status: SolverStatus::Manual,
    })
}

fn check_order(problem: &RoutingProblem, order: &[usize]) -> Result<(), ValidationError> {
    let size = problem.node_count();
    let mut seen = vec![false; size];
    for &node in order {
        if node >= size || node == problem.depot {
            return Err(ValidationError::UnknownVisit {
                node,
                depot: problem.depot,
                size,
            });
        }
        if seen[node] {
            return Err(ValidationError::DuplicateVisit(node));
        }
        seen[node] = true;
    }
    let expected = size - 1;
    if order.len() != expected {
        return Err(ValidationError::IncompleteOrder {
            expected,
            actual: order.len(),
        });
    }
    Ok(())
}

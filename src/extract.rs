//! Translation of engine output back into route metrics.

use tracing::warn;

use crate::error::ExtractError;
use crate::model::{DimensionId, EngineStatus, ROUTED_VEHICLE, SolveOutcome};
use crate::problem::RoutingProblem;
use crate::request::SolverStatus;

/// Route metrics recovered from an assignment or produced by a shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSolution {
    pub visit_order: Vec<usize>,
    /// Cumulative seconds at each stop of `visit_order`.
    pub arrivals: Vec<i64>,
    /// Distance along traversed arcs; the return to the depot is not counted.
    pub total_distance: i64,
    /// Cumulative time at the route end.
    pub total_duration: i64,
    pub feasible: bool,
    pub dropped: Vec<usize>,
    pub status: SolverStatus,
}

impl RouteSolution {
    /// A depot-only problem: nothing to visit, trivially optimal.
    pub fn depot_only() -> Self {
        Self {
            visit_order: Vec::new(),
            arrivals: Vec::new(),
            total_distance: 0,
            total_duration: 0,
            feasible: true,
            dropped: Vec::new(),
            status: SolverStatus::Optimal,
        }
    }

    /// No route at all: every visit is dropped and no metrics are reported.
    pub fn no_solution(problem: &RoutingProblem) -> Self {
        Self {
            visit_order: Vec::new(),
            arrivals: Vec::new(),
            total_distance: 0,
            total_duration: 0,
            feasible: false,
            dropped: problem.visits().collect(),
            status: SolverStatus::NoSolution,
        }
    }
}

/// Maps an engine status carrying an assignment to the wire vocabulary.
pub fn status_of(status: EngineStatus) -> SolverStatus {
    match status {
        EngineStatus::Optimal => SolverStatus::Optimal,
        _ => SolverStatus::Feasible,
    }
}

/// Reads vehicle 0's route out of the engine outcome.
pub fn extract(
    problem: &RoutingProblem,
    time: DimensionId,
    outcome: SolveOutcome,
) -> Result<RouteSolution, ExtractError> {
    let (assignment, status) = match outcome {
        SolveOutcome::Solved { assignment, status } => (assignment, status),
        SolveOutcome::Failed(status) => {
            warn!(?status, "engine found no solution");
            return Ok(RouteSolution::no_solution(problem));
        }
    };

    let route = assignment
        .route(ROUTED_VEHICLE)
        .ok_or(ExtractError::MissingRoute(ROUTED_VEHICLE))?;
    let path = route.path();
    let node_count = problem.node_count();
    let depot = problem.depot;
    if path.len() < 2 || path.first() != Some(&depot) || path.last() != Some(&depot) {
        return Err(ExtractError::OpenRoute {
            vehicle: ROUTED_VEHICLE,
        });
    }

    let mut visited = vec![false; node_count];
    let mut visit_order = Vec::new();
    let mut arrivals = Vec::new();
    let mut total_distance: i64 = 0;
    let mut position = 0;
    while !route.is_end(position) {
        let node = path[position];
        if node >= node_count {
            return Err(ExtractError::UnknownNode {
                node,
                size: node_count,
            });
        }
        if position > 0 {
            if node == depot || visited[node] {
                return Err(ExtractError::RepeatedNode(node));
            }
            visited[node] = true;
            visit_order.push(node);
            arrivals.push(route.cumul(time, position).ok_or(ExtractError::MissingCumul {
                dimension: time.index(),
                position,
            })?);
        }

        let next_position = position + 1;
        if !route.is_end(next_position) {
            if let Some(next) = route.next(position).filter(|next| *next < node_count) {
                total_distance = total_distance.saturating_add(problem.distance(node, next));
            }
        }
        position = next_position;
    }

    let total_duration = route.cumul(time, position).ok_or(ExtractError::MissingCumul {
        dimension: time.index(),
        position,
    })?;
    let dropped: Vec<usize> = problem.visits().filter(|node| !visited[*node]).collect();

    Ok(RouteSolution {
        feasible: dropped.is_empty(),
        visit_order,
        arrivals,
        total_distance,
        total_duration,
        dropped,
        status: status_of(status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, VehicleRoute};
    use crate::request::OptimizeRequest;

    fn problem() -> RoutingProblem {
        let distances = vec![
            vec![0, 100, 200, 300],
            vec![100, 0, 100, 200],
            vec![200, 100, 0, 100],
            vec![300, 200, 100, 0],
        ];
        RoutingProblem::build(&OptimizeRequest::new(distances.clone(), distances))
    }

    fn time() -> DimensionId {
        let mut model = crate::model::RoutingModel::new(1, 1, 0);
        model.add_dimension("time", |_, _| 0, 0, 0)
    }

    fn solved(path: Vec<usize>, cumuls: Vec<i64>, status: EngineStatus) -> SolveOutcome {
        SolveOutcome::Solved {
            assignment: Assignment::new(vec![VehicleRoute::new(path, vec![cumuls])], 0),
            status,
        }
    }

    #[test]
    fn return_leg_is_not_counted() {
        let outcome = solved(
            vec![0, 1, 2, 3, 0],
            vec![0, 100, 800, 1500, 2400],
            EngineStatus::Optimal,
        );
        let solution = extract(&problem(), time(), outcome).expect("extract");
        assert_eq!(solution.visit_order, vec![1, 2, 3]);
        assert_eq!(solution.arrivals, vec![100, 800, 1500]);
        assert_eq!(solution.total_distance, 300);
        assert_eq!(solution.total_duration, 2400);
        assert!(solution.feasible);
        assert_eq!(solution.status, SolverStatus::Optimal);
    }

    #[test]
    fn skipped_nodes_are_dropped_and_status_is_feasible() {
        let outcome = solved(vec![0, 3, 1, 0], vec![0, 300, 500, 600], EngineStatus::Success);
        let solution = extract(&problem(), time(), outcome).expect("extract");
        assert_eq!(solution.dropped, vec![2]);
        assert!(!solution.feasible);
        assert_eq!(solution.total_distance, 500);
        assert_eq!(solution.status, SolverStatus::Feasible);
    }

    #[test]
    fn failure_drops_every_visit() {
        let solution = extract(&problem(), time(), SolveOutcome::Failed(EngineStatus::Infeasible))
            .expect("extract");
        assert_eq!(solution, RouteSolution::no_solution(&problem()));
        assert_eq!(solution.dropped, vec![1, 2, 3]);
        assert_eq!(solution.status, SolverStatus::NoSolution);
    }

    #[test]
    fn inconsistent_assignments_are_errors() {
        let missing = SolveOutcome::Solved {
            assignment: Assignment::new(Vec::new(), 0),
            status: EngineStatus::Success,
        };
        assert_eq!(
            extract(&problem(), time(), missing),
            Err(ExtractError::MissingRoute(0))
        );

        let open = solved(vec![0, 1], vec![0, 10], EngineStatus::Success);
        assert_eq!(
            extract(&problem(), time(), open),
            Err(ExtractError::OpenRoute { vehicle: 0 })
        );

        let unknown = solved(vec![0, 9, 0], vec![0, 10, 20], EngineStatus::Success);
        assert_eq!(
            extract(&problem(), time(), unknown),
            Err(ExtractError::UnknownNode { node: 9, size: 4 })
        );

        let repeated = solved(vec![0, 1, 1, 0], vec![0, 10, 20, 30], EngineStatus::Success);
        assert_eq!(
            extract(&problem(), time(), repeated),
            Err(ExtractError::RepeatedNode(1))
        );

        let short = solved(vec![0, 1, 0], vec![0], EngineStatus::Success);
        assert_eq!(
            extract(&problem(), time(), short),
            Err(ExtractError::MissingCumul {
                dimension: 0,
                position: 1
            })
        );
    }
}

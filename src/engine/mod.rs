//! Bundled single-vehicle routing engine.
//!
//! Small instances are enumerated exhaustively and reported optimal. Larger
//! ones start from a constructed route and are improved by local search until
//! the iteration count or the time limit runs out.

mod construct;
mod exhaustive;
mod local_search;
mod schedule;

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::model::{
    Assignment, EngineStatus, LocalSearchMetaheuristic, ROUTED_VEHICLE, RoutingModel,
    SearchParameters, SolveOutcome, VehicleRoute,
};
use crate::traits::RoutingEngine;

use self::schedule::Evaluator;

/// Tuning knobs of [`LocalSearchEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Instances with at most this many candidate visits are enumerated.
    pub exhaustive_limit: usize,
    /// Penalization rounds of guided local search.
    pub guided_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exhaustive_limit: 7,
            guided_iterations: 1_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn after(limit: Duration) -> Self {
        Self(Instant::now().checked_add(limit))
    }

    #[cfg(test)]
    pub(crate) fn never() -> Self {
        Self(None)
    }

    pub(crate) fn expired(self) -> bool {
        self.0.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalSearchEngine {
    config: EngineConfig,
}

impl LocalSearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl RoutingEngine for LocalSearchEngine {
    fn solve(&self, model: &RoutingModel<'_>, parameters: &SearchParameters) -> SolveOutcome {
        if let Err(reason) = check_model(model) {
            warn!(reason, "rejecting routing model");
            return SolveOutcome::Failed(EngineStatus::Invalid);
        }

        let deadline = Deadline::after(parameters.time_limit);
        let evaluator = Evaluator::new(model);
        let visit_count = evaluator.candidates().count();

        let strategy = parameters.first_solution_strategy;
        let initial = construct::initial_route(&evaluator, strategy);
        let incumbent = initial
            .as_ref()
            .and_then(|route| evaluator.objective(route).map(|cost| (route.clone(), cost)));

        if visit_count <= self.config.exhaustive_limit {
            debug!(visit_count, "enumerating all routes");
            let enumeration = exhaustive::enumerate(&evaluator, incumbent, deadline);
            return match (enumeration.best, enumeration.complete) {
                (Some((route, cost)), true) => {
                    solved(&evaluator, route, cost, EngineStatus::Optimal)
                }
                (Some((route, cost)), false) => {
                    solved(&evaluator, route, cost, EngineStatus::PartialSuccess)
                }
                (None, true) => SolveOutcome::Failed(EngineStatus::Infeasible),
                (None, false) => SolveOutcome::Failed(EngineStatus::FailTimeout),
            };
        }

        let Some(route) = initial else {
            debug!(visit_count, "construction found no feasible route");
            return SolveOutcome::Failed(EngineStatus::Fail);
        };

        let improved = match parameters.metaheuristic {
            LocalSearchMetaheuristic::GreedyDescent => {
                local_search::descend(&evaluator, route, deadline)
            }
            LocalSearchMetaheuristic::GuidedLocalSearch => {
                local_search::guided(&evaluator, route, self.config.guided_iterations, deadline)
            }
        };
        let status = if improved.timed_out {
            EngineStatus::PartialSuccess
        } else {
            EngineStatus::Success
        };
        solved(&evaluator, improved.route, improved.objective, status)
    }
}

fn check_model(model: &RoutingModel<'_>) -> Result<(), &'static str> {
    let n = model.node_count();
    if n == 0 {
        return Err("model has no nodes");
    }
    if model.vehicle_count() == 0 {
        return Err("model has no vehicles");
    }
    if model.depot() >= n {
        return Err("depot is not a node of the model");
    }
    if !model.has_arc_cost() {
        return Err("no arc cost evaluator registered");
    }
    let bad_node = model
        .disjunctions()
        .iter()
        .flat_map(|disjunction| disjunction.nodes.iter())
        .any(|node| *node >= n || *node == model.depot());
    if bad_node {
        return Err("disjunction refers to the depot or an unknown node");
    }
    Ok(())
}

/// Wraps a feasible route of the routed vehicle into an assignment. Idle
/// vehicles go straight from start to end.
fn solved(
    evaluator: &Evaluator<'_, '_>,
    route: Vec<usize>,
    objective: i64,
    status: EngineStatus,
) -> SolveOutcome {
    let depot = evaluator.depot();
    let Some(cumuls) = evaluator.cumuls(&route) else {
        return SolveOutcome::Failed(EngineStatus::Fail);
    };
    let idle = evaluator.cumuls(&[]).unwrap_or_default();

    let routes = (0..evaluator.vehicle_count())
        .map(|vehicle| {
            if vehicle == ROUTED_VEHICLE {
                let mut path = Vec::with_capacity(route.len() + 2);
                path.push(depot);
                path.extend_from_slice(&route);
                path.push(depot);
                VehicleRoute::new(path, cumuls.clone())
            } else {
                VehicleRoute::new(vec![depot, depot], idle.clone())
            }
        })
        .collect();
    SolveOutcome::Solved {
        assignment: Assignment::new(routes, objective),
        status,
    }
}

//! First-solution construction.

use crate::model::FirstSolutionStrategy;

use super::schedule::Evaluator;

/// Builds an initial route with the requested strategy.
///
/// Construction always runs to completion; the time limit only bounds the
/// search that follows. Returns `None` when the result leaves a mandatory
/// node out or otherwise fails the model's constraints.
pub(crate) fn initial_route(
    evaluator: &Evaluator<'_, '_>,
    strategy: FirstSolutionStrategy,
) -> Option<Vec<usize>> {
    let mut route = Vec::new();
    if strategy == FirstSolutionStrategy::PathCheapestArc {
        extend_cheapest_arc(evaluator, &mut route);
    }
    fill_cheapest_insertion(evaluator, &mut route);
    evaluator.objective(&route).map(|_| route)
}

/// Appends the unrouted node reached by the cheapest feasible arc until no
/// extension is feasible or worth its penalty.
fn extend_cheapest_arc(evaluator: &Evaluator<'_, '_>, route: &mut Vec<usize>) {
    loop {
        let last = route.last().copied().unwrap_or(evaluator.depot());
        let mut best: Option<(i64, usize)> = None;
        for node in evaluator.unrouted(route) {
            let cost = evaluator.arc(last, node);
            if best.is_some_and(|(best_cost, _)| cost >= best_cost) {
                continue;
            }
            if evaluator.insertion_delta(route, node, route.len()) >= evaluator.drop_penalty(node) {
                continue;
            }
            route.push(node);
            let feasible = evaluator.feasible(route);
            route.pop();
            if feasible {
                best = Some((cost, node));
            }
        }
        match best {
            Some((_, node)) => route.push(node),
            None => break,
        }
    }
}

/// Repeatedly performs the cheapest feasible insertion over all unrouted
/// nodes and positions. Ties go to the lowest node, then the earliest
/// position. An insertion that costs at least the node's penalty is skipped.
fn fill_cheapest_insertion(evaluator: &Evaluator<'_, '_>, route: &mut Vec<usize>) {
    loop {
        let mut best: Option<(i64, usize, usize)> = None;
        for node in evaluator.unrouted(route) {
            let penalty = evaluator.drop_penalty(node);
            for position in 0..=route.len() {
                let delta = evaluator.insertion_delta(route, node, position);
                if delta >= penalty || best.is_some_and(|(best_delta, _, _)| delta >= best_delta) {
                    continue;
                }
                route.insert(position, node);
                let feasible = evaluator.feasible(route);
                route.remove(position);
                if feasible {
                    best = Some((delta, node, position));
                }
            }
        }
        match best {
            Some((_, node, position)) => route.insert(position, node),
            None => break,
        }
    }
}

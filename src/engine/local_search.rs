//! Local search over a single route.
//!
//! Neighbourhoods are scanned lazily in a fixed order and the first improving
//! move is taken. Guided local search wraps the descent: when it settles in a
//! local optimum, the arcs with the highest utility `cost / (1 + penalty)` are
//! penalized and the descent resumes on the augmented objective
//! `objective + lambda * sum(penalties)`.

use tracing::debug;

use super::Deadline;
use super::schedule::Evaluator;

const DEADLINE_CHECK_INTERVAL: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Improved,
    LocalOptimum,
    TimedOut,
}

pub(crate) struct Improvement {
    pub route: Vec<usize>,
    pub objective: i64,
    pub timed_out: bool,
}

/// Every route one move away from `route`.
fn neighbours<'r>(
    route: &'r [usize],
    unrouted: &'r [usize],
) -> impl Iterator<Item = Vec<usize>> + 'r {
    let len = route.len();

    let insertions = unrouted.iter().flat_map(move |&node| {
        (0..=len).map(move |position| {
            let mut next = route.to_vec();
            next.insert(position, node);
            next
        })
    });

    let relocations = (0..len).flat_map(move |from| {
        (0..len).filter(move |to| *to != from).map(move |to| {
            let mut next = route.to_vec();
            let node = next.remove(from);
            next.insert(to, node);
            next
        })
    });

    let exchanges = (0..len).flat_map(move |i| {
        (i + 1..len).map(move |j| {
            let mut next = route.to_vec();
            next.swap(i, j);
            next
        })
    });

    // Adjacent pairs are already covered by exchanges.
    let two_opt = (0..len).flat_map(move |i| {
        (i + 2..len).map(move |j| {
            let mut next = route.to_vec();
            next[i..=j].reverse();
            next
        })
    });

    let replacements = (0..len).flat_map(move |position| {
        unrouted.iter().map(move |&node| {
            let mut next = route.to_vec();
            next[position] = node;
            next
        })
    });

    let removals = (0..len).map(move |position| {
        let mut next = route.to_vec();
        next.remove(position);
        next
    });

    insertions
        .chain(relocations)
        .chain(exchanges)
        .chain(two_opt)
        .chain(replacements)
        .chain(removals)
}

/// Applies the first neighbour whose cost beats `current`.
fn improve(
    evaluator: &Evaluator<'_, '_>,
    route: &mut Vec<usize>,
    current: &mut i64,
    cost: &impl Fn(&[usize]) -> Option<i64>,
    deadline: Deadline,
) -> Step {
    let unrouted = evaluator.unrouted(route);
    let mut found = None;
    for (scanned, candidate) in neighbours(route, &unrouted).enumerate() {
        if scanned % DEADLINE_CHECK_INTERVAL == 0 && deadline.expired() {
            return Step::TimedOut;
        }
        if let Some(value) = cost(&candidate).filter(|value| *value < *current) {
            found = Some((candidate, value));
            break;
        }
    }
    match found {
        Some((candidate, value)) => {
            *route = candidate;
            *current = value;
            Step::Improved
        }
        None => Step::LocalOptimum,
    }
}

/// Greedy descent on the real objective. The route must be feasible.
pub(crate) fn descend(
    evaluator: &Evaluator<'_, '_>,
    route: Vec<usize>,
    deadline: Deadline,
) -> Improvement {
    let mut route = route;
    let Some(mut objective) = evaluator.objective(&route) else {
        return Improvement {
            route,
            objective: i64::MAX,
            timed_out: false,
        };
    };
    let cost = |candidate: &[usize]| evaluator.objective(candidate);
    loop {
        match improve(evaluator, &mut route, &mut objective, &cost, deadline) {
            Step::Improved => continue,
            step => {
                return Improvement {
                    route,
                    objective,
                    timed_out: step == Step::TimedOut,
                };
            }
        }
    }
}

/// Guided local search starting from a feasible route.
///
/// Runs at most `iterations` penalization rounds and returns the best route
/// found under the real objective.
pub(crate) fn guided(
    evaluator: &Evaluator<'_, '_>,
    route: Vec<usize>,
    iterations: usize,
    deadline: Deadline,
) -> Improvement {
    let start = descend(evaluator, route, deadline);
    if start.timed_out {
        return start;
    }
    let mut best = start;

    if best.route.is_empty() {
        return best;
    }
    let arc_count = best.route.len() as i64 + 1;
    let lambda = (evaluator.arc_cost(&best.route) / (10 * arc_count)).max(1);
    let depot = evaluator.depot();
    let mut penalties = ArcPenalties::new(evaluator.node_count());

    let mut route = best.route.clone();
    for round in 0..iterations {
        if deadline.expired() {
            best.timed_out = true;
            break;
        }
        if !penalties.penalize_max_utility(evaluator, depot, &route) {
            debug!(round, "no arc left to penalize");
            break;
        }

        let augmented = |candidate: &[usize]| {
            evaluator.objective(candidate).map(|objective| {
                objective.saturating_add(lambda.saturating_mul(penalties.total(depot, candidate)))
            })
        };
        let Some(mut current) = augmented(&route) else {
            break;
        };
        loop {
            match improve(evaluator, &mut route, &mut current, &augmented, deadline) {
                Step::Improved => {
                    let real = evaluator.objective(&route);
                    if let Some(objective) = real.filter(|value| *value < best.objective) {
                        best.route = route.clone();
                        best.objective = objective;
                    }
                }
                Step::LocalOptimum => break,
                Step::TimedOut => {
                    best.timed_out = true;
                    break;
                }
            }
        }
        if best.timed_out {
            break;
        }
    }
    debug!(objective = best.objective, timed_out = best.timed_out, "guided search finished");
    best
}

/// Arcs of the closed route: depot, stops..., depot.
fn closed_arcs(depot: usize, route: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let inner = route.windows(2).map(|pair| (pair[0], pair[1]));
    route
        .first()
        .map(|first| (depot, *first))
        .into_iter()
        .chain(inner)
        .chain(route.last().map(|last| (*last, depot)))
}

/// Penalty counts per arc, stored row-major.
struct ArcPenalties {
    size: usize,
    counts: Vec<u32>,
}

impl ArcPenalties {
    fn new(size: usize) -> Self {
        Self {
            size,
            counts: vec![0; size * size],
        }
    }

    fn get(&self, from: usize, to: usize) -> u32 {
        self.counts[from * self.size + to]
    }

    fn total(&self, depot: usize, route: &[usize]) -> i64 {
        closed_arcs(depot, route)
            .map(|(from, to)| i64::from(self.get(from, to)))
            .sum()
    }

    /// Raises the penalty of every arc tied for the highest utility. Returns
    /// false when no arc has a positive cost.
    fn penalize_max_utility(
        &mut self,
        evaluator: &Evaluator<'_, '_>,
        depot: usize,
        route: &[usize],
    ) -> bool {
        // Utilities compare as cost_a * (1 + p_b) against cost_b * (1 + p_a).
        let mut best: Option<(i128, i128)> = None;
        let mut chosen: Vec<(usize, usize)> = Vec::new();
        for (from, to) in closed_arcs(depot, route) {
            let cost = i128::from(evaluator.arc(from, to));
            if cost <= 0 {
                continue;
            }
            let weight = 1 + i128::from(self.get(from, to));
            match best {
                Some((best_cost, best_weight)) if cost * best_weight < best_cost * weight => {}
                Some((best_cost, best_weight)) if cost * best_weight == best_cost * weight => {
                    chosen.push((from, to));
                }
                _ => {
                    best = Some((cost, weight));
                    chosen.clear();
                    chosen.push((from, to));
                }
            }
        }
        for (from, to) in &chosen {
            let slot = &mut self.counts[from * self.size + to];
            *slot = slot.saturating_add(1);
        }
        !chosen.is_empty()
    }
}

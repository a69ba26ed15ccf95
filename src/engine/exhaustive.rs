//! Complete enumeration for small instances.
//!
//! Every ordered subset of the candidate nodes is a potential route, so the
//! search walks the permutation tree depth-first and prunes a branch as soon
//! as its prefix breaks a stop constraint.

use super::Deadline;
use super::schedule::Evaluator;

const DEADLINE_CHECK_INTERVAL: usize = 256;

pub(crate) struct Enumeration {
    /// Cheapest route found with its objective.
    pub best: Option<(Vec<usize>, i64)>,
    /// Whether the whole tree was visited, making `best` provably optimal.
    pub complete: bool,
}

pub(crate) fn enumerate(
    evaluator: &Evaluator<'_, '_>,
    incumbent: Option<(Vec<usize>, i64)>,
    deadline: Deadline,
) -> Enumeration {
    let candidates: Vec<usize> = evaluator.candidates().collect();
    let mut search = Search {
        evaluator,
        candidates: &candidates,
        used: vec![false; candidates.len()],
        route: Vec::with_capacity(candidates.len()),
        best: incumbent,
        expansions: 0,
        deadline,
        timed_out: false,
    };
    search.descend();
    Enumeration {
        complete: !search.timed_out,
        best: search.best,
    }
}

struct Search<'e, 'm, 'a> {
    evaluator: &'e Evaluator<'m, 'a>,
    candidates: &'e [usize],
    used: Vec<bool>,
    route: Vec<usize>,
    best: Option<(Vec<usize>, i64)>,
    expansions: usize,
    deadline: Deadline,
    timed_out: bool,
}

impl Search<'_, '_, '_> {
    fn descend(&mut self) {
        self.expansions += 1;
        if self.expansions % DEADLINE_CHECK_INTERVAL == 0 && self.deadline.expired() {
            self.timed_out = true;
        }
        if self.timed_out {
            return;
        }

        if let Some(cost) = self.evaluator.objective(&self.route) {
            if self.best.as_ref().is_none_or(|(_, best)| cost < *best) {
                self.best = Some((self.route.clone(), cost));
            }
        }

        for index in 0..self.candidates.len() {
            if self.used[index] {
                continue;
            }
            self.route.push(self.candidates[index]);
            if self.evaluator.prefix_feasible(&self.route) {
                self.used[index] = true;
                self.descend();
                self.used[index] = false;
            }
            self.route.pop();
            if self.timed_out {
                return;
            }
        }
    }
}

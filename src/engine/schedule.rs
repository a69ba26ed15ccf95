//! Route evaluation against a [`RoutingModel`].
//!
//! A route is the sequence of visited nodes between the depot start and the
//! depot end. Cumuls are scheduled as early as possible: the route starts at
//! the depot's lower bound and the vehicle waits at a node only until the
//! node's range opens.

use crate::model::{Dimension, ROUTED_VEHICLE, RoutingModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// A stop violates its range, the slack or the capacity. Every extension
    /// of the route violates it too.
    StopViolation,
    /// The return to the depot breaks the capacity or the span bound.
    EndViolation,
    Feasible,
}

pub(crate) struct Evaluator<'m, 'a> {
    model: &'m RoutingModel<'a>,
    /// Disjunction index per node, `None` for the depot and mandatory nodes.
    disjunction_of: Vec<Option<usize>>,
    mandatory: Vec<usize>,
}

impl<'m, 'a> Evaluator<'m, 'a> {
    /// Callers validate the model first; disjunction nodes must be in range.
    pub(crate) fn new(model: &'m RoutingModel<'a>) -> Self {
        let mut disjunction_of = vec![None; model.node_count()];
        for (index, disjunction) in model.disjunctions().iter().enumerate() {
            for &node in &disjunction.nodes {
                disjunction_of[node] = Some(index);
            }
        }
        let mandatory = (0..model.node_count())
            .filter(|node| *node != model.depot() && disjunction_of[*node].is_none())
            .collect();
        Self {
            model,
            disjunction_of,
            mandatory,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.model.node_count()
    }

    pub(crate) fn depot(&self) -> usize {
        self.model.depot()
    }

    pub(crate) fn vehicle_count(&self) -> usize {
        self.model.vehicle_count()
    }

    /// Nodes that may appear on a route.
    pub(crate) fn candidates(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count()).filter(|node| *node != self.depot())
    }

    /// Candidates not on `route`, ascending.
    pub(crate) fn unrouted(&self, route: &[usize]) -> Vec<usize> {
        let mut routed = vec![false; self.node_count()];
        for &node in route {
            routed[node] = true;
        }
        self.candidates().filter(|node| !routed[*node]).collect()
    }

    /// Cost saved by visiting `node`; unbounded for mandatory nodes.
    pub(crate) fn drop_penalty(&self, node: usize) -> i64 {
        match self.disjunction_of[node] {
            Some(index) => self.model.disjunctions()[index].penalty,
            None => i64::MAX,
        }
    }

    pub(crate) fn arc(&self, from: usize, to: usize) -> i64 {
        self.model.arc_cost(from, to)
    }

    /// Arc cost of the closed route; an empty route costs nothing.
    pub(crate) fn arc_cost(&self, route: &[usize]) -> i64 {
        let depot = self.depot();
        match (route.first(), route.last()) {
            (Some(&first), Some(&last)) => route
                .windows(2)
                .map(|pair| self.arc(pair[0], pair[1]))
                .fold(self.arc(depot, first), i64::saturating_add)
                .saturating_add(self.arc(last, depot)),
            _ => 0,
        }
    }

    /// Arc-cost change of inserting `node` before position `position`.
    pub(crate) fn insertion_delta(&self, route: &[usize], node: usize, position: usize) -> i64 {
        let depot = self.depot();
        if route.is_empty() {
            return self.arc(depot, node).saturating_add(self.arc(node, depot));
        }
        let prev = if position == 0 { depot } else { route[position - 1] };
        let next = route.get(position).copied().unwrap_or(depot);
        self.arc(prev, node)
            .saturating_add(self.arc(node, next))
            .saturating_sub(self.arc(prev, next))
    }

    /// Whether every stop on `route` is reachable within its ranges. Extending
    /// an infeasible prefix never makes it feasible.
    pub(crate) fn prefix_feasible(&self, route: &[usize]) -> bool {
        self.model
            .dimensions()
            .iter()
            .all(|dim| self.walk(dim, route, |_| {}) != Walk::StopViolation)
    }

    pub(crate) fn feasible(&self, route: &[usize]) -> bool {
        self.model
            .dimensions()
            .iter()
            .all(|dim| self.walk(dim, route, |_| {}) == Walk::Feasible)
    }

    /// Objective of `route`: arc cost plus the penalty of every disjunction it
    /// leaves out. `None` when the route is infeasible, repeats a node, visits
    /// two nodes of one disjunction or misses a mandatory node.
    pub(crate) fn objective(&self, route: &[usize]) -> Option<i64> {
        let mut visited = vec![false; self.node_count()];
        for &node in route {
            if node >= visited.len() || node == self.depot() || visited[node] {
                return None;
            }
            visited[node] = true;
        }
        if self.mandatory.iter().any(|node| !visited[*node]) {
            return None;
        }
        let mut cost = self.arc_cost(route);
        for disjunction in self.model.disjunctions() {
            match disjunction.nodes.iter().filter(|node| visited[**node]).count() {
                0 => cost = cost.saturating_add(disjunction.penalty),
                1 => {}
                _ => return None,
            }
        }
        self.feasible(route).then_some(cost)
    }

    /// Cumul values per dimension, aligned with depot, stops..., depot.
    pub(crate) fn cumuls(&self, route: &[usize]) -> Option<Vec<Vec<i64>>> {
        self.model
            .dimensions()
            .iter()
            .map(|dim| {
                let mut values = Vec::with_capacity(route.len() + 2);
                match self.walk(dim, route, |value| values.push(value)) {
                    Walk::Feasible => Some(values),
                    _ => None,
                }
            })
            .collect()
    }

    fn walk(&self, dim: &Dimension<'_>, route: &[usize], mut record: impl FnMut(i64)) -> Walk {
        let depot = self.depot();
        let start_range = dim.range(depot);
        let start = start_range.min;
        if start > start_range.max || start > dim.capacity() {
            return Walk::StopViolation;
        }
        record(start);

        let mut cumul = start;
        let mut prev = depot;
        for &node in route {
            let arrival = cumul.saturating_add(dim.transit(prev, node));
            let range = dim.range(node);
            let value = arrival.max(range.min);
            let wait = value.saturating_sub(arrival);
            if wait > dim.slack_max() || value > range.max || value > dim.capacity() {
                return Walk::StopViolation;
            }
            record(value);
            cumul = value;
            prev = node;
        }

        let end = cumul.saturating_add(dim.transit(prev, depot));
        if end > dim.capacity() {
            return Walk::EndViolation;
        }
        if let Some(bound) = dim.span_upper_bound(ROUTED_VEHICLE) {
            if end.saturating_sub(start) > bound {
                return Walk::EndViolation;
            }
        }
        record(end);
        Walk::Feasible
    }
}

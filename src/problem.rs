//! Normalization of a raw request into a [`RoutingProblem`].
//!
//! Missing service times and time windows are resolved into concrete per-node
//! values here, and the time horizon bounding every cumulative-time variable
//! is derived from the matrices and windows.

use std::time::Duration;

use crate::request::{OptimizeRequest, TimeWindow};

/// Service seconds for a visit that did not specify one.
pub const DEFAULT_SERVICE_TIME: i64 = 600;

/// Slack added beyond the latest window endpoint.
pub const HORIZON_BUFFER: i64 = 3600;

/// Time-window constraint of one node, resolved from the optional input.
///
/// `Window` carries the caller's values untouched; inverted or out-of-range
/// windows are repaired by the encoder once the horizon is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowConstraint {
    Unconstrained,
    Window { earliest: i64, latest: i64 },
}

impl WindowConstraint {
    pub fn endpoints(self) -> Option<(i64, i64)> {
        match self {
            WindowConstraint::Unconstrained => None,
            WindowConstraint::Window { earliest, latest } => Some((earliest, latest)),
        }
    }
}

impl From<Option<TimeWindow>> for WindowConstraint {
    fn from(window: Option<TimeWindow>) -> Self {
        match window {
            Some(TimeWindow { earliest, latest }) => WindowConstraint::Window { earliest, latest },
            None => WindowConstraint::Unconstrained,
        }
    }
}

/// A normalized single-solve problem.
///
/// Owned by one optimize call and dropped with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingProblem {
    pub distance_matrix: Vec<Vec<i64>>,
    pub time_matrix: Vec<Vec<i64>>,
    /// Exactly one entry per node.
    pub service_times: Vec<i64>,
    /// Exactly one entry per node.
    pub time_windows: Vec<WindowConstraint>,
    pub horizon: i64,
    pub vehicle_count: usize,
    pub depot: usize,
    pub max_route_duration: Option<i64>,
    pub time_limit: Duration,
}

impl RoutingProblem {
    /// Builds the normalized problem. Never fails; callers validate the
    /// request shape first.
    pub fn build(request: &OptimizeRequest) -> Self {
        let node_count = request.node_count();
        let depot = request.depot;

        let mut service_times = request.service_times.clone();
        service_times.truncate(node_count);
        while service_times.len() < node_count {
            let node = service_times.len();
            service_times.push(if node == depot { 0 } else { DEFAULT_SERVICE_TIME });
        }

        let mut time_windows: Vec<WindowConstraint> = request
            .time_windows
            .iter()
            .take(node_count)
            .copied()
            .map(WindowConstraint::from)
            .collect();
        time_windows.resize(node_count, WindowConstraint::Unconstrained);

        // A zero duration means "no cap", as it always has on the wire.
        let max_route_duration = request.max_route_duration.filter(|seconds| *seconds > 0);
        let horizon = compute_horizon(
            &request.time_matrix,
            &service_times,
            &time_windows,
            max_route_duration,
        );

        Self {
            distance_matrix: request.distance_matrix.clone(),
            time_matrix: request.time_matrix.clone(),
            service_times,
            time_windows,
            horizon,
            vehicle_count: request.num_vehicles,
            depot,
            max_route_duration,
            time_limit: Duration::from_secs(request.solver_time_limit_seconds),
        }
    }

    pub fn node_count(&self) -> usize {
        self.distance_matrix.len()
    }

    /// Every node except the depot, ascending.
    pub fn visits(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count()).filter(move |node| *node != self.depot)
    }

    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.distance_matrix[from][to]
    }

    pub fn travel_time(&self, from: usize, to: usize) -> i64 {
        self.time_matrix[from][to]
    }

    /// Transit of the time dimension: travel plus service at the origin.
    pub fn transit_time(&self, from: usize, to: usize) -> i64 {
        self.travel_time(from, to)
            .saturating_add(self.service_times[from])
    }
}

/// Upper bound for every cumulative-time variable.
///
/// An explicit route-duration cap wins. Otherwise the bound covers the
/// worst-case travel plus all service time, and reaches comfortably past the
/// latest window endpoint.
pub fn compute_horizon(
    time_matrix: &[Vec<i64>],
    service_times: &[i64],
    time_windows: &[WindowConstraint],
    max_route_duration: Option<i64>,
) -> i64 {
    if let Some(duration) = max_route_duration {
        return duration;
    }

    let row_maxima = time_matrix
        .iter()
        .map(|row| row.iter().copied().max().unwrap_or(0));
    let max_travel = row_maxima.clone().max().unwrap_or(0);
    let total_travel = row_maxima.fold(0_i64, i64::saturating_add);
    let total_service = service_times.iter().copied().fold(0_i64, i64::saturating_add);
    let travel_horizon = total_travel
        .saturating_add(total_service)
        .saturating_add(max_travel);

    let endpoints: Vec<(i64, i64)> = time_windows
        .iter()
        .filter_map(|window| window.endpoints())
        .collect();
    // Inverted windows still count with both ends so the domain covers them.
    let max_window_endpoint = endpoints
        .iter()
        .fold(0_i64, |acc, (earliest, latest)| acc.max(*earliest).max(*latest));
    let window_horizon = if endpoints.is_empty() {
        0
    } else {
        max_window_endpoint
            .saturating_add(total_travel)
            .saturating_add(total_service)
            .saturating_add(HORIZON_BUFFER)
    };

    travel_horizon
        .max(window_horizon)
        .max(max_window_endpoint.saturating_add(HORIZON_BUFFER))
}

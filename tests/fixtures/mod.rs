//! Test fixtures for route-optimizer.
//!
//! Provides matrices and requests shared by the integration tests:
//! - Points on a line, where the sequential order is the only optimum
//! - The sequential time-window scenario
//! - Unreachable windows that force visits to be dropped

#![allow(dead_code)]

use route_optimizer::request::{OptimizeRequest, TimeWindow};

/// Points on a line, `step` apart: entry `(i, j)` is `|i - j| * step`.
pub fn line_matrix(n: usize, step: i64) -> Vec<Vec<i64>> {
    (0..n)
        .map(|i| (0..n).map(|j| (i as i64 - j as i64).abs() * step).collect())
        .collect()
}

/// Depot --100m-- A --100m-- B --100m-- C, one minute per 100m, five
/// minutes of service per stop.
pub fn three_in_line() -> OptimizeRequest {
    OptimizeRequest::new(line_matrix(4, 100), line_matrix(4, 60))
        .with_service_times(vec![0, 300, 300, 300])
}

/// Windows in the first, second and third hour; only 1 -> 2 -> 3 fits.
pub fn sequential_windows() -> OptimizeRequest {
    OptimizeRequest::new(
        vec![
            vec![0, 1000, 1000, 1000],
            vec![1000, 0, 500, 1500],
            vec![1000, 500, 0, 500],
            vec![1000, 1500, 500, 0],
        ],
        vec![
            vec![0, 600, 600, 600],
            vec![600, 0, 300, 900],
            vec![600, 300, 0, 300],
            vec![600, 900, 300, 0],
        ],
    )
    .with_time_windows(vec![
        None,
        Some(TimeWindow::new(0, 3600)),
        Some(TimeWindow::new(3600, 7200)),
        Some(TimeWindow::new(7200, 10800)),
    ])
    .with_service_times(vec![0, 600, 600, 600])
}

/// Both visits must be reached within 100s but are an hour away.
pub fn unreachable_windows() -> OptimizeRequest {
    OptimizeRequest::new(
        vec![vec![0, 5000, 5000], vec![5000, 0, 10000], vec![5000, 10000, 0]],
        vec![vec![0, 3600, 3600], vec![3600, 0, 7200], vec![3600, 7200, 0]],
    )
    .with_time_windows(vec![
        None,
        Some(TimeWindow::new(0, 100)),
        Some(TimeWindow::new(0, 100)),
    ])
    .with_service_times(vec![0, 600, 600])
}

/// Asserts that the visit order and the dropped visits split the visits
/// exactly.
pub fn assert_partition(
    response: &route_optimizer::OptimizeResponse,
    node_count: usize,
    depot: usize,
) {
    let mut seen: Vec<usize> = response
        .visit_order
        .iter()
        .chain(response.dropped_visits.iter())
        .copied()
        .collect();
    seen.sort_unstable();
    let expected: Vec<usize> = (0..node_count).filter(|node| *node != depot).collect();
    assert_eq!(seen, expected, "visit order and dropped visits must partition the visits");
    assert_eq!(response.feasible, response.dropped_visits.is_empty());
    assert_eq!(response.estimated_arrivals.len(), response.visit_order.len());
}

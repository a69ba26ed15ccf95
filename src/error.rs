//! Error types for each boundary of the optimizer.

use thiserror::Error;

/// Request rejected before any model is built.
///
/// Messages name the offending field and, for size mismatches, the expected
/// and actual sizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("distance_matrix cannot be empty")]
    EmptyMatrix,
    #[error("time_matrix size ({actual}) must match distance_matrix size ({expected})")]
    TimeMatrixSize { expected: usize, actual: usize },
    #[error("{field} row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        field: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{field}[{row}][{column}] must not be negative, got {value}")]
    NegativeEntry {
        field: &'static str,
        row: usize,
        column: usize,
        value: i64,
    },
    #[error("service_times[{node}] must not be negative, got {value}")]
    NegativeServiceTime { node: usize, value: i64 },
    #[error("{field} length ({actual}) exceeds matrix size ({expected})")]
    TooLong {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("depot index ({depot}) out of range for matrix size ({size})")]
    DepotOutOfRange { depot: usize, size: usize },
    #[error("num_vehicles must be at least 1")]
    NoVehicles,
    #[error("max_route_duration must not be negative, got {0}")]
    NegativeRouteDuration(i64),
    #[error("visit_order entry {node} is not a visit index (depot {depot}, matrix size {size})")]
    UnknownVisit {
        node: usize,
        depot: usize,
        size: usize,
    },
    #[error("visit_order lists visit {0} more than once")]
    DuplicateVisit(usize),
    #[error("visit_order has {actual} entries, expected {expected}")]
    IncompleteOrder { expected: usize, actual: usize },
}

/// The engine returned an assignment that does not describe the encoded
/// problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("assignment has no route for vehicle {0}")]
    MissingRoute(usize),
    #[error("route for vehicle {vehicle} does not start and end at the depot")]
    OpenRoute { vehicle: usize },
    #[error("route references node {node} outside 0..{size}")]
    UnknownNode { node: usize, size: usize },
    #[error("route visits node {0} more than once")]
    RepeatedNode(usize),
    #[error("assignment has no cumul values for dimension {dimension} at position {position}")]
    MissingCumul { dimension: usize, position: usize },
}

/// Failure of a single optimize or evaluate call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("failed to read engine assignment: {0}")]
    Extract(#[from] ExtractError),
}

/// Failure talking to a remote optimizer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("optimizer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("optimizer returned {status}: {detail}")]
    Rejected {
        status: reqwest::StatusCode,
        detail: String,
    },
}

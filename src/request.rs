//! Wire types for the optimize surface.
//!
//! Matrices are N×N where index 0 is the depot (the vehicle's start and end
//! position) and indices `1..N` are the visits to sequence. All times are
//! seconds from route start, all distances meters.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_TIME_LIMIT_SECONDS: u64 = 5;

/// Permissible arrival interval for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest: i64,
    pub latest: i64,
}

impl TimeWindow {
    pub fn new(earliest: i64, latest: i64) -> Self {
        Self { earliest, latest }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub distance_matrix: Vec<Vec<i64>>,
    pub time_matrix: Vec<Vec<i64>>,
    /// Per-node windows; `null` entries and missing trailing entries are
    /// unconstrained.
    #[serde(default)]
    pub time_windows: Vec<Option<TimeWindow>>,
    /// Per-node service seconds; missing trailing entries are defaulted.
    #[serde(default)]
    pub service_times: Vec<i64>,
    #[serde(default)]
    pub depot: usize,
    #[serde(default = "default_vehicles")]
    pub num_vehicles: usize,
    #[serde(default)]
    pub max_route_duration: Option<i64>,
    #[serde(default = "default_time_limit")]
    pub solver_time_limit_seconds: u64,
}

fn default_vehicles() -> usize {
    1
}

fn default_time_limit() -> u64 {
    DEFAULT_TIME_LIMIT_SECONDS
}

impl OptimizeRequest {
    /// Request with the given matrices and every other field defaulted.
    pub fn new(distance_matrix: Vec<Vec<i64>>, time_matrix: Vec<Vec<i64>>) -> Self {
        Self {
            distance_matrix,
            time_matrix,
            time_windows: Vec::new(),
            service_times: Vec::new(),
            depot: 0,
            num_vehicles: default_vehicles(),
            max_route_duration: None,
            solver_time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
        }
    }

    pub fn with_time_windows(mut self, time_windows: Vec<Option<TimeWindow>>) -> Self {
        self.time_windows = time_windows;
        self
    }

    pub fn with_service_times(mut self, service_times: Vec<i64>) -> Self {
        self.service_times = service_times;
        self
    }

    pub fn with_max_route_duration(mut self, seconds: i64) -> Self {
        self.max_route_duration = Some(seconds);
        self
    }

    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.solver_time_limit_seconds = seconds;
        self
    }

    pub fn node_count(&self) -> usize {
        self.distance_matrix.len()
    }

    /// Checks matrix shapes and auxiliary list sizes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ValidationError::EmptyMatrix);
        }
        if self.time_matrix.len() != n {
            return Err(ValidationError::TimeMatrixSize {
                expected: n,
                actual: self.time_matrix.len(),
            });
        }
        check_rows("distance_matrix", &self.distance_matrix, n)?;
        check_rows("time_matrix", &self.time_matrix, n)?;
        if self.time_windows.len() > n {
            return Err(ValidationError::TooLong {
                field: "time_windows",
                expected: n,
                actual: self.time_windows.len(),
            });
        }
        if self.service_times.len() > n {
            return Err(ValidationError::TooLong {
                field: "service_times",
                expected: n,
                actual: self.service_times.len(),
            });
        }
        if let Some((node, &value)) = self.service_times.iter().enumerate().find(|(_, v)| **v < 0) {
            return Err(ValidationError::NegativeServiceTime { node, value });
        }
        if self.depot >= n {
            return Err(ValidationError::DepotOutOfRange {
                depot: self.depot,
                size: n,
            });
        }
        if self.num_vehicles == 0 {
            return Err(ValidationError::NoVehicles);
        }
        if let Some(duration) = self.max_route_duration.filter(|d| *d < 0) {
            return Err(ValidationError::NegativeRouteDuration(duration));
        }
        Ok(())
    }
}

fn check_rows(field: &'static str, matrix: &[Vec<i64>], n: usize) -> Result<(), ValidationError> {
    for (row, values) in matrix.iter().enumerate() {
        if values.len() != n {
            return Err(ValidationError::RaggedRow {
                field,
                row,
                expected: n,
                actual: values.len(),
            });
        }
        if let Some((column, &value)) = values.iter().enumerate().find(|(_, v)| **v < 0) {
            return Err(ValidationError::NegativeEntry {
                field,
                row,
                column,
                value,
            });
        }
    }
    Ok(())
}

/// Optimize request plus a caller-chosen visit sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    #[serde(flatten)]
    pub problem: OptimizeRequest,
    pub visit_order: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    NoSolution,
    Timeout,
    /// The sequence was supplied by the caller, not searched.
    Manual,
}

impl SolverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::NoSolution => "NO_SOLUTION",
            SolverStatus::Timeout => "TIMEOUT",
            SolverStatus::Manual => "MANUAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    /// Node indices in visiting order, depot excluded.
    pub visit_order: Vec<usize>,
    pub total_distance_meters: i64,
    /// Route end time, including service and waiting.
    pub total_duration_seconds: i64,
    /// Cumulative seconds from route start, aligned with `visit_order`.
    pub estimated_arrivals: Vec<i64>,
    pub feasible: bool,
    #[serde(default)]
    pub dropped_visits: Vec<usize>,
    pub solver_status: SolverStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<OptimizeRequest>,
}

/// One element of a batch reply, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Solved(OptimizeResponse),
    Rejected(ErrorBody),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: usize) -> Vec<Vec<i64>> {
        vec![vec![0; n]; n]
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let body = r#"{"distance_matrix": [[0, 1], [1, 0]], "time_matrix": [[0, 1], [1, 0]]}"#;
        let request: OptimizeRequest = serde_json::from_str(body).expect("parse request");
        assert!(request.time_windows.is_empty());
        assert!(request.service_times.is_empty());
        assert_eq!(request.depot, 0);
        assert_eq!(request.num_vehicles, 1);
        assert_eq!(request.max_route_duration, None);
        assert_eq!(request.solver_time_limit_seconds, 5);
    }

    #[test]
    fn null_windows_parse_as_unconstrained() {
        let body = r#"{
            "distance_matrix": [[0, 1], [1, 0]],
            "time_matrix": [[0, 1], [1, 0]],
            "time_windows": [null, {"earliest": 10, "latest": 20}]
        }"#;
        let request: OptimizeRequest = serde_json::from_str(body).expect("parse request");
        assert_eq!(request.time_windows, vec![None, Some(TimeWindow::new(10, 20))]);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let request = OptimizeRequest::new(Vec::new(), Vec::new());
        assert_eq!(request.validate(), Err(ValidationError::EmptyMatrix));
    }

    #[test]
    fn time_matrix_size_mismatch_names_both_sizes() {
        let request = OptimizeRequest::new(square(3), square(2));
        let err = request.validate().expect_err("size mismatch");
        assert_eq!(
            err.to_string(),
            "time_matrix size (2) must match distance_matrix size (3)"
        );
    }

    #[test]
    fn ragged_rows_are_reported_per_field() {
        let mut distances = square(3);
        distances[1].pop();
        let err = OptimizeRequest::new(distances, square(3))
            .validate()
            .expect_err("ragged distance row");
        assert_eq!(err.to_string(), "distance_matrix row 1 has 2 columns, expected 3");

        let mut times = square(3);
        times[2].push(7);
        let err = OptimizeRequest::new(square(3), times)
            .validate()
            .expect_err("ragged time row");
        assert_eq!(err.to_string(), "time_matrix row 2 has 4 columns, expected 3");
    }

    #[test]
    fn oversized_auxiliary_lists_are_rejected() {
        let err = OptimizeRequest::new(square(2), square(2))
            .with_service_times(vec![0, 600, 600])
            .validate()
            .expect_err("too many service times");
        assert_eq!(err.to_string(), "service_times length (3) exceeds matrix size (2)");

        let err = OptimizeRequest::new(square(2), square(2))
            .with_time_windows(vec![None, None, None])
            .validate()
            .expect_err("too many windows");
        assert_eq!(err.to_string(), "time_windows length (3) exceeds matrix size (2)");
    }

    #[test]
    fn depot_and_fleet_are_checked() {
        let mut request = OptimizeRequest::new(square(2), square(2));
        request.depot = 2;
        assert_eq!(
            request.validate(),
            Err(ValidationError::DepotOutOfRange { depot: 2, size: 2 })
        );

        let mut request = OptimizeRequest::new(square(2), square(2));
        request.num_vehicles = 0;
        assert_eq!(request.validate(), Err(ValidationError::NoVehicles));

        let request = OptimizeRequest::new(square(2), square(2)).with_max_route_duration(-1);
        assert_eq!(
            request.validate(),
            Err(ValidationError::NegativeRouteDuration(-1))
        );
    }

    #[test]
    fn negative_matrix_entries_name_their_cell() {
        let mut distances = square(3);
        distances[2][1] = -5;
        let err = OptimizeRequest::new(distances, square(3))
            .validate()
            .expect_err("negative distance");
        assert_eq!(err.to_string(), "distance_matrix[2][1] must not be negative, got -5");

        let mut times = square(3);
        times[0][1] = i64::MIN;
        let err = OptimizeRequest::new(square(3), times)
            .validate()
            .expect_err("negative travel time");
        assert_eq!(
            err,
            ValidationError::NegativeEntry {
                field: "time_matrix",
                row: 0,
                column: 1,
                value: i64::MIN,
            }
        );
    }

    #[test]
    fn negative_service_time_is_rejected() {
        let err = OptimizeRequest::new(square(3), square(3))
            .with_service_times(vec![0, 300, -1])
            .validate()
            .expect_err("negative service time");
        assert_eq!(err, ValidationError::NegativeServiceTime { node: 2, value: -1 });
        assert_eq!(err.to_string(), "service_times[2] must not be negative, got -1");
    }

    #[test]
    fn status_serializes_to_screaming_literals() {
        let statuses = [
            SolverStatus::Optimal,
            SolverStatus::Feasible,
            SolverStatus::NoSolution,
            SolverStatus::Timeout,
            SolverStatus::Manual,
        ];
        for status in statuses {
            let json = serde_json::to_string(&status).expect("serialize status");
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn evaluate_request_flattens_problem_fields() {
        let body = r#"{
            "distance_matrix": [[0, 1], [1, 0]],
            "time_matrix": [[0, 1], [1, 0]],
            "visit_order": [1]
        }"#;
        let request: EvaluateRequest = serde_json::from_str(body).expect("parse evaluate");
        assert_eq!(request.visit_order, vec![1]);
        assert_eq!(request.problem.node_count(), 2);
        assert_eq!(request.problem.solver_time_limit_seconds, 5);
    }
}

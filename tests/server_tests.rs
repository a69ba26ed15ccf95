//! HTTP surface tests driven through `warp::test`.

mod fixtures;

use std::convert::Infallible;
use std::sync::Arc;

use serde_json::{Value, json};
use warp::http::StatusCode;
use warp::{Filter, Reply};

use route_optimizer::config::ServerConfig;
use route_optimizer::model::{
    Assignment, EngineStatus, RoutingModel, SearchParameters, SolveOutcome, VehicleRoute,
};
use route_optimizer::server::routes;
use route_optimizer::{LocalSearchEngine, RoutingEngine};

use fixtures::{line_matrix, three_in_line};

fn api() -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    routes(Arc::new(LocalSearchEngine::default()), ServerConfig::default())
}

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).expect("JSON body")
}

#[tokio::test]
async fn test_health_is_ok() {
    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_optimize_returns_route() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&three_in_line())
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let result = body(&response);
    assert_eq!(result["visit_order"].as_array().map(Vec::len), Some(3));
    assert_eq!(result["feasible"], json!(true));
    assert_eq!(result["dropped_visits"], json!([]));
    assert_eq!(result["solver_status"], json!("OPTIMAL"));
}

#[tokio::test]
async fn test_optional_fields_default() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&json!({
            "distance_matrix": [[0, 1000], [1000, 0]],
            "time_matrix": [[0, 300], [300, 0]]
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let result = body(&response);
    assert_eq!(result["visit_order"], json!([1]));
    assert_eq!(result["total_distance_meters"], json!(2000));
    assert_eq!(result["total_duration_seconds"], json!(1200));
}

#[tokio::test]
async fn test_validation_error_is_bad_request() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&json!({
            "distance_matrix": line_matrix(3, 100),
            "time_matrix": line_matrix(2, 60)
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(&response),
        json!({"detail": "time_matrix size (2) must match distance_matrix size (3)"})
    );
}

#[tokio::test]
async fn test_negative_travel_time_is_bad_request() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&json!({
            "distance_matrix": line_matrix(3, 100),
            "time_matrix": [[0, 60, 120], [60, 0, -1], [120, 60, 0]]
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(&response),
        json!({"detail": "time_matrix[1][2] must not be negative, got -1"})
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .header("content-type", "application/json")
        .body("{\"distance_matrix\": [[0]")
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body(&response)["detail"].is_string());
}

#[tokio::test]
async fn test_missing_matrix_is_bad_request() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&json!({"distance_matrix": [[0]]}))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let api = routes(Arc::new(LocalSearchEngine::default()), config);
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&three_in_line())
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = warp::test::request()
        .method("GET")
        .path("/routes")
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_evaluate_reports_manual_status() {
    let response = warp::test::request()
        .method("POST")
        .path("/evaluate")
        .json(&json!({
            "distance_matrix": line_matrix(4, 100),
            "time_matrix": line_matrix(4, 60),
            "service_times": [0, 300, 300, 300],
            "visit_order": [3, 2, 1]
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let result = body(&response);
    assert_eq!(result["visit_order"], json!([3, 2, 1]));
    assert_eq!(result["solver_status"], json!("MANUAL"));
    assert_eq!(result["total_distance_meters"], json!(500));
}

#[tokio::test]
async fn test_evaluate_rejects_duplicate_visits() {
    let response = warp::test::request()
        .method("POST")
        .path("/evaluate")
        .json(&json!({
            "distance_matrix": line_matrix(3, 100),
            "time_matrix": line_matrix(3, 60),
            "visit_order": [1, 1]
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(&response),
        json!({"detail": "visit_order lists visit 1 more than once"})
    );
}

#[tokio::test]
async fn test_batch_keeps_request_order() {
    let response = warp::test::request()
        .method("POST")
        .path("/optimize/batch")
        .json(&json!({
            "requests": [
                three_in_line(),
                {"distance_matrix": [], "time_matrix": []},
                {"distance_matrix": [[0]], "time_matrix": [[0]]}
            ]
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let items = body(&response);
    let items = items.as_array().expect("array reply");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["visit_order"].as_array().map(Vec::len), Some(3));
    assert_eq!(items[1], json!({"detail": "distance_matrix cannot be empty"}));
    assert_eq!(items[2]["visit_order"], json!([]));
}

/// Returns a route through a node the model does not have.
struct BrokenEngine;

impl RoutingEngine for BrokenEngine {
    fn solve(&self, _model: &RoutingModel<'_>, _parameters: &SearchParameters) -> SolveOutcome {
        let route = VehicleRoute::new(vec![0, 42, 0], vec![vec![0, 1, 2]]);
        SolveOutcome::Solved {
            assignment: Assignment::new(vec![route], 0),
            status: EngineStatus::Success,
        }
    }
}

#[tokio::test]
async fn test_unusable_assignment_is_server_error() {
    let api = routes(Arc::new(BrokenEngine), ServerConfig::default());
    let response = warp::test::request()
        .method("POST")
        .path("/optimize")
        .json(&three_in_line())
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body(&response)["detail"].as_str().map(str::to_string).expect("detail");
    assert!(detail.starts_with("Solver error:"), "unexpected detail {detail}");
}

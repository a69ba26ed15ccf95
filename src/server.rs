//! HTTP surface.
//!
//! Solving is CPU-bound, so every request runs its solve on the blocking pool
//! and owns its problem, model and engine invocation for the whole call.

use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::config::ServerConfig;
use crate::error::OptimizeError;
use crate::request::{BatchRequest, ErrorBody, EvaluateRequest, HealthStatus, OptimizeRequest};
use crate::solver;
use crate::traits::RoutingEngine;

/// All routes of the service, with rejections turned into JSON replies.
///
/// The returned filter owns its config and can be served as `'static`.
pub fn routes<E>(
    engine: Arc<E>,
    config: ServerConfig,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    E: RoutingEngine + Send + Sync + 'static,
{
    let limit = config.max_body_bytes;
    let with_engine = warp::any().map(move || Arc::clone(&engine));

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&HealthStatus {
                status: "ok".to_string(),
            })
        });

    let optimize = warp::path("optimize")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::json())
        .and(with_engine.clone())
        .and_then(optimize_handler::<E>);

    let batch = warp::path!("optimize" / "batch")
        .and(warp::post())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::json())
        .and(with_engine)
        .and_then(batch_handler::<E>);

    let evaluate = warp::path("evaluate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::json())
        .and_then(evaluate_handler);

    health
        .or(optimize)
        .or(batch)
        .or(evaluate)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

async fn optimize_handler<E>(
    request: OptimizeRequest,
    engine: Arc<E>,
) -> Result<Response, Rejection>
where
    E: RoutingEngine + Send + Sync + 'static,
{
    let joined = tokio::task::spawn_blocking(move || solver::optimize(&request, &*engine)).await;
    Ok(match joined {
        Ok(Ok(response)) => json_reply(&response, StatusCode::OK),
        Ok(Err(err)) => optimize_error_reply(err),
        Err(err) => join_error_reply(err),
    })
}

async fn batch_handler<E>(batch: BatchRequest, engine: Arc<E>) -> Result<Response, Rejection>
where
    E: RoutingEngine + Send + Sync + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        solver::optimize_batch(&batch.requests, &*engine)
    })
    .await;
    Ok(match joined {
        Ok(items) => json_reply(&items, StatusCode::OK),
        Err(err) => join_error_reply(err),
    })
}

async fn evaluate_handler(request: EvaluateRequest) -> Result<Response, Rejection> {
    let joined = tokio::task::spawn_blocking(move || solver::evaluate_order(&request)).await;
    Ok(match joined {
        Ok(Ok(response)) => json_reply(&response, StatusCode::OK),
        Ok(Err(err)) => optimize_error_reply(err),
        Err(err) => join_error_reply(err),
    })
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn detail_reply(detail: impl Into<String>, status: StatusCode) -> Response {
    json_reply(
        &ErrorBody {
            detail: detail.into(),
        },
        status,
    )
}

fn optimize_error_reply(err: OptimizeError) -> Response {
    match err {
        OptimizeError::Invalid(err) => detail_reply(err.to_string(), StatusCode::BAD_REQUEST),
        OptimizeError::Extract(err) => {
            error!(error = %err, "engine returned an unusable assignment");
            detail_reply(format!("Solver error: {err}"), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn join_error_reply(err: tokio::task::JoinError) -> Response {
    error!(error = %err, "solve task did not complete");
    detail_reply(format!("Solver error: {err}"), StatusCode::INTERNAL_SERVER_ERROR)
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let reply = if rejection.is_not_found() {
        detail_reply("Not Found", StatusCode::NOT_FOUND)
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        detail_reply(err.to_string(), StatusCode::BAD_REQUEST)
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        detail_reply("request body too large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        detail_reply("content-length header required", StatusCode::LENGTH_REQUIRED)
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        detail_reply("expected a JSON body", StatusCode::UNSUPPORTED_MEDIA_TYPE)
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        detail_reply("Method Not Allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else {
        error!(?rejection, "unhandled rejection");
        detail_reply("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
    };
    Ok(reply)
}

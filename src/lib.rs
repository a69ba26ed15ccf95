//! route-optimizer
//!
//! Single-vehicle visit sequencing over caller-supplied distance and time
//! matrices, with time windows, service times and droppable visits.

pub mod client;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod problem;
pub mod request;
pub mod server;
pub mod solver;
pub mod traits;

pub use engine::{EngineConfig, LocalSearchEngine};
pub use error::{ClientError, ExtractError, OptimizeError, ValidationError};
pub use request::{
    BatchItem, BatchRequest, EvaluateRequest, OptimizeRequest, OptimizeResponse, SolverStatus,
    TimeWindow,
};
pub use solver::{evaluate_order, optimize, optimize_batch};
pub use traits::RoutingEngine;

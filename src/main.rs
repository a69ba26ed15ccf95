use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use route_optimizer::config::{DEFAULT_MAX_BODY_BYTES, ServerConfig};
use route_optimizer::engine::{EngineConfig, LocalSearchEngine};
use route_optimizer::server;

#[derive(Debug, Parser)]
#[command(name = "route-optimizer", about = "Single-vehicle route optimization service")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "ROUTE_OPTIMIZER_BIND", default_value = "0.0.0.0:5002")]
    bind: SocketAddr,

    /// Largest accepted request body in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: u64,

    /// Problems with at most this many visits are solved by enumeration.
    #[arg(long, default_value_t = EngineConfig::default().exhaustive_limit)]
    exhaustive_limit: usize,

    /// Penalization rounds of guided local search.
    #[arg(long, default_value_t = EngineConfig::default().guided_iterations)]
    guided_iterations: usize,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = ServerConfig {
        bind: cli.bind,
        max_body_bytes: cli.max_body_bytes,
    };
    let engine = Arc::new(LocalSearchEngine::new(EngineConfig {
        exhaustive_limit: cli.exhaustive_limit,
        guided_iterations: cli.guided_iterations,
    }));

    info!(
        bind = %config.bind,
        exhaustive_limit = engine.config().exhaustive_limit,
        guided_iterations = engine.config().guided_iterations,
        "route optimizer listening"
    );
    warp::serve(server::routes(engine, config)).run(config.bind).await;
}

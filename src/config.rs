//! Runtime settings of the HTTP service.

use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 5002;

/// Largest accepted request body. A 500-node request with both matrices is
/// a few megabytes of JSON.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_body_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

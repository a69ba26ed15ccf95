//! Blocking HTTP client for a remote optimizer.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::request::{ErrorBody, EvaluateRequest, HealthStatus, OptimizeRequest, OptimizeResponse};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Covers the whole round trip, so it should exceed the solver time
    /// limit of the requests sent.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5002".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerClient {
    config: ClientConfig,
    client: reqwest::blocking::Client,
}

impl OptimizerClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.url("health")).send()?;
        read_json(response)
    }

    pub fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, ClientError> {
        self.post("optimize", request)
    }

    /// Schedules a fixed visit order on the remote service.
    pub fn evaluate(&self, request: &EvaluateRequest) -> Result<OptimizeResponse, ClientError> {
        self.post("evaluate", request)
    }

    fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send()?;
        read_json(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

/// Decodes a 2xx body, or turns the service's `{"detail": ...}` reply into
/// [`ClientError::Rejected`].
fn read_json<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json()?);
    }
    let text = response.text()?;
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.detail)
        .unwrap_or(text);
    Err(ClientError::Rejected { status, detail })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = OptimizerClient::new(ClientConfig {
            base_url: "http://solver:5002/".to_string(),
            timeout_secs: 1,
        })
        .expect("client");
        assert_eq!(client.url("optimize"), "http://solver:5002/optimize");
    }
}

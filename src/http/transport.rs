//! Raw GET transport

use async_trait::async_trait;
use std::time::Duration;
use ureq::Agent;

use crate::error::TransportError;

/// Status line and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, "OK", body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can perform a GET and hand back the raw response.
///
/// Non-2xx statuses are responses, not errors. Only connection-level
/// failures become [`TransportError`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

/// Blocking ureq agent run on tokio's blocking pool
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn get_blocking(agent: &Agent, url: &str) -> Result<RawResponse, TransportError> {
        let response = agent
            .get(url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let mut body = response.into_body();
        let body = body
            .read_to_string()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::get_blocking(&agent, &url))
            .await
            .map_err(|e| TransportError::Network(format!("request task failed: {}", e)))?
    }
}

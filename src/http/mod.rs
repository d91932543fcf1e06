//! HTTP client for the content backend
//!
//! Requests go to `{api_base_url}/api/{endpoint}` and successful responses
//! carry a JSON envelope `{ "data": ... }`. Errors are returned as
//! [`LoadError`] and never retried here.

mod transport;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use std::sync::Arc;

use crate::error::LoadError;

pub use transport::{RawResponse, Transport, UreqTransport};

/// Characters escaped when an id is spliced into a backend path
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// GET-only JSON client
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint such as `articles/3`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Fetch an endpoint and return the envelope's `data` member
    pub async fn get(&self, endpoint: &str) -> Result<Value, LoadError> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!("GET {}", url);

        let response = self.transport.get(&url).await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            LoadError::from(e)
        })?;

        if !response.is_success() {
            tracing::warn!(
                "Request to {} returned {} {}",
                url,
                response.status,
                response.status_text
            );
            return Err(LoadError::HttpStatus {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }

        parse_envelope(&response.body)
    }
}

/// Extract `data` from a `{ "data": ... }` body
pub fn parse_envelope(body: &str) -> Result<Value, LoadError> {
    let mut json: Value =
        serde_json::from_str(body).map_err(|e| LoadError::InvalidPayload(e.to_string()))?;

    json.get_mut("data")
        .map(Value::take)
        .ok_or_else(|| LoadError::InvalidPayload("response has no `data` member".to_string()))
}

//! Error types shared by the HTTP client, cache, router and content loader

use thiserror::Error;

/// Failure while loading or rendering a piece of content.
///
/// The HTTP client and the response cache pass these through untouched.
/// The content loader is the first layer that turns them into a message
/// on the page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Connection-level failure (refused, DNS, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP error! status: {status} {status_text}")]
    HttpStatus {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Route missing, or the backend returned nothing to show
    #[error("{0}")]
    NotFound(String),

    /// Markdown could not be turned into HTML
    #[error("render error: {0}")]
    Render(String),

    /// Response body was not the expected `{ "data": ... }` envelope
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A parameterized route was dispatched without its parameter
    #[error("missing route parameter `{0}`")]
    MissingParam(&'static str),
}

impl LoadError {
    /// Message suitable for showing to a reader of the blog
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Network(_) => {
                "Network unavailable. Check your connection and try again.".to_string()
            }
            LoadError::HttpStatus {
                status,
                status_text,
                ..
            } => format!("Request failed: {} {}", status, status_text),
            LoadError::NotFound(msg) => msg.clone(),
            LoadError::Render(msg) => format!("Could not render content: {}", msg),
            LoadError::InvalidPayload(_) => "Unexpected response from server".to_string(),
            LoadError::MissingParam(name) => format!("Missing route parameter: {}", name),
        }
    }

    /// Whether this error came from the network layer rather than the backend
    pub fn is_network(&self) -> bool {
        matches!(self, LoadError::Network(_))
    }
}

/// Error raised by a [`crate::http::Transport`] before any status is known
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),
}

impl From<TransportError> for LoadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(msg) => LoadError::Network(msg),
        }
    }
}

/// Route table construction and URL generation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("duplicate route pattern `{0}`")]
    DuplicatePattern(String),

    #[error("parameterized patterns `{0}` and `{1}` share a prefix")]
    PrefixCollision(String, String),

    #[error("invalid route pattern `{0}`")]
    InvalidPattern(String),

    #[error("unknown route `{0}`")]
    UnknownRoute(String),

    #[error("route `{route}` requires parameter `{param}`")]
    MissingParam { route: String, param: &'static str },

    #[error("`{value}` is not a single path segment for route `{route}`")]
    InvalidParam { route: String, value: String },
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_message_distinct_from_status() {
        let network = LoadError::Network("connection refused".to_string());
        let status = LoadError::HttpStatus {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: String::new(),
        };
        assert!(network.user_message().contains("Network unavailable"));
        assert_eq!(
            status.user_message(),
            "Request failed: 500 Internal Server Error"
        );
        assert!(network.is_network());
        assert!(!status.is_network());
    }

    #[test]
    fn test_status_error_mentions_code() {
        let err = LoadError::HttpStatus {
            status: 404,
            status_text: "Not Found".to_string(),
            body: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 404 Not Found");
    }

    #[test]
    fn test_transport_error_converts_to_network() {
        let err: LoadError = TransportError::Network("refused".to_string()).into();
        assert_eq!(err, LoadError::Network("refused".to_string()));
    }
}

//! Host page integration
//!
//! The router and renderer only ever touch the page through [`Document`] and
//! [`History`]. [`MemoryDocument`] and [`MemoryHistory`] are headless
//! implementations used by the CLI and the tests.

mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::{HistoryEntry, MemoryDocument, MemoryHistory};

/// Work deferred to the next animation frame
pub type FrameCallback = Box<dyn FnOnce() + Send>;

/// The document title and the content container
pub trait Document: Send + Sync {
    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    /// HTML currently in the content container
    fn container_html(&self) -> String;

    /// Replace the content container's HTML
    fn set_container_html(&self, html: String);

    /// Run `callback` on the next animation frame
    fn request_animation_frame(&self, callback: FrameCallback);
}

/// State object written with every history push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub route: String,
}

impl HistoryState {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "route": self.route })
    }
}

/// Browser back/forward notification
///
/// `state` is whatever the history entry carries, which is not always
/// something this crate wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopStateEvent {
    pub state: Option<Value>,
}

impl PopStateEvent {
    pub fn new(state: Option<Value>) -> Self {
        Self { state }
    }

    /// The `route` recorded in the state, when it is a usable string
    pub fn route(&self) -> Option<&str> {
        self.state
            .as_ref()?
            .get("route")?
            .as_str()
            .filter(|route| route.starts_with('/'))
    }
}

/// Session history of the page
pub trait History: Send + Sync {
    /// Add an entry and make it current without navigating
    fn push_state(&self, state: HistoryState, title: &str, url: &str);

    /// Path of the current location, without query or fragment
    fn location_path(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_popstate_route() {
        let event = PopStateEvent::new(Some(json!({"route": "/article/1"})));
        assert_eq!(event.route(), Some("/article/1"));
    }

    #[test]
    fn test_popstate_tolerates_malformed_state() {
        for state in [
            None,
            Some(json!(null)),
            Some(json!("just a string")),
            Some(json!({"route": 42})),
            Some(json!({"route": ""})),
            Some(json!({"other": "/about"})),
        ] {
            assert_eq!(PopStateEvent::new(state).route(), None);
        }
    }

    #[test]
    fn test_history_state_value() {
        let state = HistoryState::new("/about");
        assert_eq!(state.to_value(), json!({"route": "/about"}));
    }
}

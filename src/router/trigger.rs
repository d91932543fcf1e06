//! What starts a navigation

use std::fmt;

use super::link::Anchor;
use crate::browser::PopStateEvent;

/// An event the router reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationTrigger {
    /// A click on an anchor inside the document
    LinkClick(Anchor),
    /// Browser back/forward
    PopState(PopStateEvent),
    /// First render after the page loads
    InitialLoad,
}

impl NavigationTrigger {
    /// Whether a navigation started by this trigger writes a history entry
    pub fn pushes_history(&self) -> bool {
        !matches!(self, NavigationTrigger::PopState(_))
    }
}

impl fmt::Display for NavigationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationTrigger::LinkClick(_) => write!(f, "link click"),
            NavigationTrigger::PopState(_) => write!(f, "popstate"),
            NavigationTrigger::InitialLoad => write!(f, "initial load"),
        }
    }
}

/// A path to render and whether to push it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    pub push: bool,
}

impl NavigationRequest {
    pub fn push(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            push: true,
        }
    }

    pub fn replay(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            push: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_popstate_skips_history() {
        assert!(NavigationTrigger::InitialLoad.pushes_history());
        assert!(NavigationTrigger::LinkClick(Anchor::new("/")).pushes_history());
        assert!(!NavigationTrigger::PopState(PopStateEvent::default()).pushes_history());
    }

    #[test]
    fn test_request_constructors() {
        assert!(NavigationRequest::push("/about").push);
        assert!(!NavigationRequest::replay("/about").push);
    }
}

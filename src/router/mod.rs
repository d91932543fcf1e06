//! Client-side navigation
//!
//! A navigation resolves a path against the route table, sets the route's
//! title, records a history entry (except on back/forward) and hands off to
//! the content loader. Navigations are not cancelled: when two overlap, the
//! one whose content arrives last is what stays on the page.

mod link;
mod trigger;

use std::sync::{Mutex, MutexGuard};

pub use link::{decide, path_for_anchor, Anchor, ClickDecision, PassReason};
pub use trigger::{NavigationRequest, NavigationTrigger};

use crate::browser::{HistoryState, PopStateEvent};
use crate::content::ContentLoader;
use crate::error::{LoadError, RouteError};
use crate::helpers::error_block;
use crate::routes::RouteName;
use crate::AppContext;

/// Where the router is in its current navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Resolving,
    Rendering,
    /// The last navigation ended with this message on the page
    Error(String),
}

/// The most recently resolved navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub path: String,
    pub pushed_to_history: bool,
}

/// How a dispatched trigger ended
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// Left to the browser
    PassThrough,
    Rendered,
    NotFound,
    /// The handler could not run
    Failed(LoadError),
}

#[derive(Debug)]
struct Inner {
    state: RouterState,
    current: Option<NavigationState>,
    last_error: Option<String>,
    sequence: u64,
}

/// Turns navigation triggers into rendered pages
pub struct Router<'a> {
    ctx: &'a AppContext,
    loader: ContentLoader<'a>,
    inner: Mutex<Inner>,
}

impl<'a> Router<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            loader: ContentLoader::new(ctx),
            inner: Mutex::new(Inner {
                state: RouterState::Idle,
                current: None,
                last_error: None,
                sequence: 0,
            }),
        }
    }

    pub fn state(&self) -> RouterState {
        self.lock().state.clone()
    }

    pub fn current(&self) -> Option<NavigationState> {
        self.lock().current.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Number of navigations started so far
    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }

    /// Canonical path for a named route
    pub fn url_for(&self, name: RouteName, id: Option<&str>) -> Result<String, RouteError> {
        self.ctx.routes.url_for(name, id)
    }

    /// Render whatever the location currently points at
    pub async fn start(&self) -> NavigationOutcome {
        self.dispatch(NavigationTrigger::InitialLoad).await
    }

    pub async fn on_click(&self, anchor: Anchor) -> NavigationOutcome {
        self.dispatch(NavigationTrigger::LinkClick(anchor)).await
    }

    pub async fn on_popstate(&self, event: PopStateEvent) -> NavigationOutcome {
        self.dispatch(NavigationTrigger::PopState(event)).await
    }

    pub async fn dispatch(&self, trigger: NavigationTrigger) -> NavigationOutcome {
        match self.request_for(&trigger) {
            Some(request) => {
                tracing::debug!("Navigating to {} on {}", request.path, trigger);
                self.navigate(request).await
            }
            None => {
                tracing::debug!("Leaving {} to the browser", trigger);
                NavigationOutcome::PassThrough
            }
        }
    }

    /// Path and history behaviour for a trigger, or `None` if the router
    /// should stay out of it
    pub fn request_for(&self, trigger: &NavigationTrigger) -> Option<NavigationRequest> {
        let path = match trigger {
            NavigationTrigger::LinkClick(anchor) => {
                let decision = decide(anchor, self.ctx.config.origin());
                if let ClickDecision::PassThrough(reason) = decision {
                    tracing::debug!("Click not intercepted: {:?}", reason);
                    return None;
                }
                let current = self.ctx.history.location_path();
                path_for_anchor(anchor, &self.ctx.routes, &current)?
            }
            NavigationTrigger::PopState(event) => match event.route() {
                Some(route) => route.to_string(),
                None => self.ctx.history.location_path(),
            },
            NavigationTrigger::InitialLoad => self.ctx.history.location_path(),
        };

        if trigger.pushes_history() {
            Some(NavigationRequest::push(path))
        } else {
            Some(NavigationRequest::replay(path))
        }
    }

    /// Resolve and render `request.path`.
    ///
    /// Everything up to the loader call happens before the first await, so
    /// the history entry and title always belong to the latest navigation
    /// started.
    pub async fn navigate(&self, request: NavigationRequest) -> NavigationOutcome {
        let sequence = {
            let mut inner = self.lock();
            inner.sequence += 1;
            inner.state = RouterState::Resolving;
            inner.sequence
        };

        let Some(matched) = self.ctx.routes.resolve(&request.path) else {
            tracing::info!("No route for {}", request.path);
            let message = format!("Page not found: {}", request.path);
            self.ctx
                .renderer
                .mount(&self.ctx.document, error_block(&message));
            self.fail(message);
            return NavigationOutcome::NotFound;
        };

        let title = matched.route.title.as_str();
        self.ctx.document.set_title(title);
        if request.push {
            self.ctx
                .history
                .push_state(HistoryState::new(&request.path), title, &request.path);
        }

        {
            let mut inner = self.lock();
            inner.current = Some(NavigationState {
                path: request.path.clone(),
                pushed_to_history: request.push,
            });
            inner.state = RouterState::Rendering;
        }

        tracing::info!("[{}] {} -> {}", sequence, request.path, matched.route.name);
        match self.loader.load(matched.route.name, &matched.params).await {
            Ok(()) => {
                self.lock().state = RouterState::Idle;
                NavigationOutcome::Rendered
            }
            Err(e) => {
                tracing::warn!("Handler for {} failed: {}", request.path, e);
                let message = format!("Failed to load page: {}", e.user_message());
                self.ctx
                    .renderer
                    .mount(&self.ctx.document, error_block(&message));
                self.fail(message);
                NavigationOutcome::Failed(e)
            }
        }
    }

    fn fail(&self, message: String) {
        let mut inner = self.lock();
        inner.last_error = Some(message.clone());
        inner.state = RouterState::Error(message);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! blog-router: client-side routing and content loading for a blog backed
//! by a JSON API
//!
//! The page is reached only through the [`browser::Document`] and
//! [`browser::History`] traits, so the whole navigation flow runs headless
//! in tests and in the CLI.

pub mod browser;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod http;
pub mod router;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use browser::{Document, History};
use cache::{Clock, MemoryStore, ResponseCache, SystemClock, TtlPolicy};
use config::LoaderConfig;
use content::{ContentLoader, Renderer};
use http::{HttpClient, Transport, UreqTransport};
use router::Router;
use routes::RouteTable;

/// Everything a navigation needs, built once per page
pub struct AppContext {
    pub config: LoaderConfig,
    pub routes: RouteTable,
    pub client: HttpClient,
    pub cache: ResponseCache,
    pub renderer: Renderer,
    pub document: Arc<dyn Document>,
    pub history: Arc<dyn History>,
}

impl AppContext {
    /// Create a context on the wall clock
    pub fn new(
        config: LoaderConfig,
        transport: Arc<dyn Transport>,
        document: Arc<dyn Document>,
        history: Arc<dyn History>,
    ) -> Self {
        Self::with_clock(config, transport, document, history, Arc::new(SystemClock))
    }

    /// Create a context whose cache reads time from `clock`
    pub fn with_clock(
        config: LoaderConfig,
        transport: Arc<dyn Transport>,
        document: Arc<dyn Document>,
        history: Arc<dyn History>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ResponseCache::with_parts(
            Box::new(MemoryStore::new()),
            TtlPolicy::new(config.cache_ttl()),
            clock,
        );

        Self {
            routes: RouteTable::for_site(&config),
            client: HttpClient::new(&config.api_base_url, transport),
            renderer: Renderer::new(&config.highlight_theme),
            cache,
            document,
            history,
            config,
        }
    }

    /// Create a context talking to the configured backend over HTTP
    pub fn connect(
        config: LoaderConfig,
        document: Arc<dyn Document>,
        history: Arc<dyn History>,
    ) -> Self {
        let transport = Arc::new(UreqTransport::new(config.request_timeout()));
        Self::new(config, transport, document, history)
    }

    pub fn router(&self) -> Router<'_> {
        Router::new(self)
    }

    pub fn loader(&self) -> ContentLoader<'_> {
        ContentLoader::new(self)
    }
}

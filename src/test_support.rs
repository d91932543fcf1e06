//! Scripted backend and page fixtures for unit tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::browser::{MemoryDocument, MemoryHistory};
use crate::cache::ManualClock;
use crate::config::LoaderConfig;
use crate::error::TransportError;
use crate::http::{RawResponse, Transport};
use crate::AppContext;

pub const BASE: &str = "http://api.test";

type Reply = Result<RawResponse, TransportError>;

enum Script {
    Fixed(Reply),
    Gated(VecDeque<oneshot::Receiver<Reply>>),
}

/// Transport answering from a per-URL script and counting calls
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
}

/// Holds back one response until opened
pub struct Gate {
    tx: oneshot::Sender<Reply>,
}

impl Gate {
    pub fn open(self, data: Value) {
        let _ = self
            .tx
            .send(Ok(RawResponse::ok(json!({ "data": data }).to_string())));
    }

    pub fn fail(self, message: &str) {
        let _ = self.tx.send(Err(TransportError::Network(message.to_string())));
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `{ "data": data }`
    pub fn respond(self, url: &str, data: Value) -> Self {
        let body = json!({ "data": data }).to_string();
        self.respond_raw(url, RawResponse::ok(body))
    }

    pub fn respond_raw(self, url: &str, response: RawResponse) -> Self {
        self.set(url, Script::Fixed(Ok(response)));
        self
    }

    /// Fail `url` at the connection level
    pub fn fail(self, url: &str, message: &str) -> Self {
        self.set(
            url,
            Script::Fixed(Err(TransportError::Network(message.to_string()))),
        );
        self
    }

    /// Make the next request to `url` wait for the returned gate
    pub fn gate(&self, url: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(url) {
            Some(Script::Gated(queue)) => queue.push_back(rx),
            _ => {
                scripts.insert(url.to_string(), Script::Gated(VecDeque::from([rx])));
            }
        }
        Gate { tx }
    }

    /// Number of requests made to `url`
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    fn set(&self, url: &str, script: Script) {
        self.scripts.lock().unwrap().insert(url.to_string(), script);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());

        let pending = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(url) {
                Some(Script::Fixed(reply)) => return reply.clone(),
                Some(Script::Gated(queue)) => queue.pop_front(),
                None => None,
            }
        };

        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string()))),
            None => Ok(RawResponse::new(404, "Not Found", "")),
        }
    }
}

/// A context wired to headless page objects and a scripted backend
pub struct Fixture {
    pub ctx: AppContext,
    pub transport: Arc<ScriptedTransport>,
    pub document: Arc<MemoryDocument>,
    pub history: Arc<MemoryHistory>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new(transport: ScriptedTransport, start_path: &str) -> Self {
        let mut config = LoaderConfig::default();
        config.api_base_url = BASE.to_string();
        config.origin = Some("http://blog.test".to_string());

        let transport = Arc::new(transport);
        let document = Arc::new(MemoryDocument::new(""));
        let history = Arc::new(MemoryHistory::new(start_path));
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));

        let ctx = AppContext::with_clock(
            config,
            transport.clone(),
            document.clone(),
            history.clone(),
            clock.clone(),
        );

        Self {
            ctx,
            transport,
            document,
            history,
            clock,
        }
    }

    pub fn url(endpoint: &str) -> String {
        format!("{}/api/{}", BASE, endpoint)
    }
}

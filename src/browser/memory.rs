//! Headless document and history

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::{Document, FrameCallback, History, HistoryState, PopStateEvent};
use crate::routes::strip_query_and_fragment;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Default)]
struct Page {
    title: String,
    html: String,
}

/// In-memory [`Document`] with a manually driven frame queue
#[derive(Default)]
pub struct MemoryDocument {
    page: Mutex<Page>,
    frames: Mutex<VecDeque<FrameCallback>>,
}

impl MemoryDocument {
    pub fn new(title: &str) -> Self {
        Self {
            page: Mutex::new(Page {
                title: title.to_string(),
                html: String::new(),
            }),
            frames: Mutex::new(VecDeque::new()),
        }
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending_frames(&self) -> usize {
        lock(&self.frames).len()
    }

    /// Run every callback queued so far, in request order.
    ///
    /// Callbacks requested while the frame runs wait for the next one.
    pub fn run_animation_frame(&self) -> usize {
        let callbacks: Vec<FrameCallback> = lock(&self.frames).drain(..).collect();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }
}

impl Document for MemoryDocument {
    fn title(&self) -> String {
        lock(&self.page).title.clone()
    }

    fn set_title(&self, title: &str) {
        lock(&self.page).title = title.to_string();
    }

    fn container_html(&self) -> String {
        lock(&self.page).html.clone()
    }

    fn set_container_html(&self, html: String) {
        lock(&self.page).html = html;
    }

    fn request_animation_frame(&self, callback: FrameCallback) {
        lock(&self.frames).push_back(callback);
    }
}

/// One session history entry
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub state: Option<Value>,
    pub title: String,
    pub url: String,
}

#[derive(Debug)]
struct Entries {
    list: Vec<HistoryEntry>,
    index: usize,
}

/// In-memory [`History`] supporting back and forward
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Entries>,
}

impl MemoryHistory {
    /// Start a session at `url`, as if the page had just been opened there
    pub fn new(url: &str) -> Self {
        Self {
            entries: Mutex::new(Entries {
                list: vec![HistoryEntry {
                    state: None,
                    title: String::new(),
                    url: url.to_string(),
                }],
                index: 0,
            }),
        }
    }

    /// Push an entry carrying arbitrary state, e.g. one written by another script
    pub fn push_raw(&self, state: Option<Value>, url: &str) {
        let mut entries = lock(&self.entries);
        let next = entries.index + 1;
        entries.list.truncate(next);
        entries.list.push(HistoryEntry {
            state,
            title: String::new(),
            url: url.to_string(),
        });
        entries.index = next;
    }

    /// Step back one entry, returning the event the browser would fire
    pub fn back(&self) -> Option<PopStateEvent> {
        let mut entries = lock(&self.entries);
        if entries.index == 0 {
            return None;
        }
        entries.index -= 1;
        let state = entries.list[entries.index].state.clone();
        Some(PopStateEvent::new(state))
    }

    /// Step forward one entry, returning the event the browser would fire
    pub fn forward(&self) -> Option<PopStateEvent> {
        let mut entries = lock(&self.entries);
        if entries.index + 1 >= entries.list.len() {
            return None;
        }
        entries.index += 1;
        let state = entries.list[entries.index].state.clone();
        Some(PopStateEvent::new(state))
    }

    /// Snapshot of all entries
    pub fn entries(&self) -> Vec<HistoryEntry> {
        lock(&self.entries).list.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the current entry
    pub fn index(&self) -> usize {
        lock(&self.entries).index
    }
}

impl History for MemoryHistory {
    fn push_state(&self, state: HistoryState, title: &str, url: &str) {
        let mut entries = lock(&self.entries);
        let next = entries.index + 1;
        entries.list.truncate(next);
        entries.list.push(HistoryEntry {
            state: Some(state.to_value()),
            title: title.to_string(),
            url: url.to_string(),
        });
        entries.index = next;
    }

    fn location_path(&self) -> String {
        let entries = lock(&self.entries);
        let url = &entries.list[entries.index].url;
        strip_query_and_fragment(url).to_string()
    }
}

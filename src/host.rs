//! The boundary between the runtime and the environment it runs in.
//!
//! A [`Host`] owns the navigable location (a history stack), the document
//! metadata, the scroll position and a small key/value storage, and reports
//! navigation the user performs outside the runtime as [`HostEvent`]s.
//! [`MemoryHost`] keeps all of it in memory, for tests and headless use.

mod memory;

use futures::stream::BoxStream;

use crate::page::Metadata;

pub use memory::{HistoryEntry, MemoryHost};

/// Navigation the host observed without the runtime asking for it.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The user moved through history (back/forward).
    PopState { url: String, scroll_y: f64 },
    /// The user activated an in-app link.
    LinkClicked { url: String },
}

/// An environment a process can navigate and draw metadata into.
///
/// Only history, metadata, scrolling and events are required. Focus,
/// container scrolling and storage default to doing nothing.
pub trait Host: Send + Sync + 'static {
    /// The current url, relative to the application root.
    fn location(&self) -> String;

    /// Adds `url` to history. `scroll_y` is saved on the entry being left.
    fn push_state(&self, url: &str, scroll_y: f64);

    /// Replaces the current history entry, saving `scroll_y` on it.
    fn replace_state(&self, url: &str, scroll_y: f64);

    /// Moves one entry back, reported as [`HostEvent::PopState`].
    fn back(&self);

    /// Leaves the application.
    fn redirect(&self, url: &str);

    fn set_metadata(&self, metadata: &Metadata);

    /// Scrolls the document.
    fn scroll_to(&self, x: f64, y: f64);

    /// The document's current vertical scroll offset.
    fn scroll_y(&self) -> f64 {
        0.0
    }

    /// Scrolls the element identified by `id`.
    fn scroll_container_to(&self, _id: &str, _x: f64, _y: f64) {}

    /// Moves input focus to the element identified by `id`.
    fn focus(&self, _id: &str) {}

    /// Removes input focus from the element identified by `id`.
    fn blur(&self, _id: &str) {}

    fn storage_get(&self, _key: &str) -> Option<String> {
        None
    }

    fn storage_set(&self, _key: &str, _value: &str) {}

    fn storage_remove(&self, _key: &str) {}

    /// Removes every stored key.
    fn storage_clear(&self) {}

    /// Subscribes to host navigation events.
    ///
    /// Events emitted before the call are not replayed.
    fn events(&self) -> BoxStream<'static, HostEvent>;
}

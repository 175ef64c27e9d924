use std::collections::HashMap;

use futures::{StreamExt, stream::BoxStream};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use super::{Host, HostEvent};
use crate::page::Metadata;

/// One entry of the history stack.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: String,
    pub scroll_y: f64,
}

#[derive(Debug)]
struct Inner {
    entries: Vec<HistoryEntry>,
    index: usize,
    metadata: Metadata,
    scroll: (f64, f64),
    storage: HashMap<String, String>,
    redirects: Vec<String>,
    focused: Option<String>,
    containers: HashMap<String, (f64, f64)>,
}

/// An in-memory [`Host`].
///
/// Navigation events are delivered over a broadcast channel, so any number of
/// processes (or tests) can observe the same host.
///
/// # Examples
///
/// ```
/// use portal_runtime::host::{Host, MemoryHost};
///
/// let host = MemoryHost::new("/");
/// host.push_state("/opportunities", 0.0);
/// host.push_state("/opportunities/7", 120.0);
/// host.back();
///
/// assert_eq!(host.location(), "/opportunities");
/// assert_eq!(host.history().len(), 3);
/// ```
#[derive(Debug)]
pub struct MemoryHost {
    inner: Mutex<Inner>,
    events: broadcast::Sender<HostEvent>,
}

impl MemoryHost {
    pub fn new(url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(Inner {
                entries: vec![HistoryEntry {
                    url: url.into(),
                    scroll_y: 0.0,
                }],
                index: 0,
                metadata: Metadata::default(),
                scroll: (0.0, 0.0),
                storage: HashMap::new(),
                redirects: Vec::new(),
                focused: None,
                containers: HashMap::new(),
            }),
            events,
        }
    }

    /// Simulates the user following an in-app link.
    pub fn click_link(&self, url: impl Into<String>) {
        self.emit(HostEvent::LinkClicked { url: url.into() });
    }

    /// Simulates the forward button.
    pub fn forward(&self) {
        let entry = {
            let mut inner = self.inner.lock();
            if inner.index + 1 >= inner.entries.len() {
                return;
            }
            inner.index += 1;
            inner.entries[inner.index].clone()
        };
        self.pop_state(entry);
    }

    /// The document title last set through [`Host::set_metadata`].
    pub fn title(&self) -> String {
        self.inner.lock().metadata.title.clone()
    }

    pub fn metadata(&self) -> Metadata {
        self.inner.lock().metadata.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock().entries.clone()
    }

    pub fn scroll(&self) -> (f64, f64) {
        self.inner.lock().scroll
    }

    /// The id of the focused element, if any.
    pub fn focused(&self) -> Option<String> {
        self.inner.lock().focused.clone()
    }

    /// The last offset set through [`Host::scroll_container_to`] for `id`.
    pub fn container_scroll(&self, id: &str) -> Option<(f64, f64)> {
        self.inner.lock().containers.get(id).copied()
    }

    /// Urls passed to [`Host::redirect`], oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.inner.lock().redirects.clone()
    }

    fn pop_state(&self, entry: HistoryEntry) {
        self.inner.lock().scroll.1 = entry.scroll_y;
        self.emit(HostEvent::PopState {
            url: entry.url,
            scroll_y: entry.scroll_y,
        });
    }

    fn emit(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("host event with no listener");
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Host for MemoryHost {
    fn location(&self) -> String {
        let inner = self.inner.lock();
        inner.entries[inner.index].url.clone()
    }

    fn push_state(&self, url: &str, scroll_y: f64) {
        let mut inner = self.inner.lock();
        let index = inner.index;
        inner.entries[index].scroll_y = scroll_y;
        inner.entries.truncate(index + 1);
        inner.entries.push(HistoryEntry {
            url: url.to_owned(),
            scroll_y: 0.0,
        });
        inner.index = index + 1;
    }

    fn replace_state(&self, url: &str, scroll_y: f64) {
        let mut inner = self.inner.lock();
        let index = inner.index;
        inner.entries[index] = HistoryEntry {
            url: url.to_owned(),
            scroll_y,
        };
    }

    fn back(&self) {
        let entry = {
            let mut inner = self.inner.lock();
            if inner.index == 0 {
                return;
            }
            inner.index -= 1;
            inner.entries[inner.index].clone()
        };
        self.pop_state(entry);
    }

    fn redirect(&self, url: &str) {
        self.inner.lock().redirects.push(url.to_owned());
    }

    fn set_metadata(&self, metadata: &Metadata) {
        self.inner.lock().metadata = metadata.clone();
    }

    fn scroll_to(&self, x: f64, y: f64) {
        self.inner.lock().scroll = (x, y);
    }

    fn scroll_y(&self) -> f64 {
        self.inner.lock().scroll.1
    }

    fn scroll_container_to(&self, id: &str, x: f64, y: f64) {
        self.inner.lock().containers.insert(id.to_owned(), (x, y));
    }

    fn focus(&self, id: &str) {
        self.inner.lock().focused = Some(id.to_owned());
    }

    fn blur(&self, id: &str) {
        let mut inner = self.inner.lock();
        if inner.focused.as_deref() == Some(id) {
            inner.focused = None;
        }
    }

    fn storage_get(&self, key: &str) -> Option<String> {
        self.inner.lock().storage.get(key).cloned()
    }

    fn storage_set(&self, key: &str, value: &str) {
        self.inner.lock().storage.insert(key.to_owned(), value.to_owned());
    }

    fn storage_remove(&self, key: &str) {
        self.inner.lock().storage.remove(key);
    }

    fn storage_clear(&self) {
        self.inner.lock().storage.clear();
    }

    fn events(&self) -> BoxStream<'static, HostEvent> {
        BroadcastStream::new(self.events.subscribe())
            .filter_map(|result| async move { result.ok() })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_push_truncates_forward_history() {
        let host = MemoryHost::new("/a");
        host.push_state("/b", 10.0);
        host.push_state("/c", 0.0);
        host.back();
        host.back();
        host.push_state("/d", 0.0);

        let urls: Vec<_> = host.history().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["/a", "/d"]);
        assert_eq!(host.location(), "/d");
    }

    #[test]
    fn test_replace_keeps_history_length() {
        let host = MemoryHost::new("/a");
        host.replace_state("/b", 5.0);

        assert_eq!(host.history(), vec![HistoryEntry { url: "/b".into(), scroll_y: 5.0 }]);
    }

    #[test]
    fn test_back_at_start_is_ignored() {
        let host = MemoryHost::new("/a");
        host.back();
        assert_eq!(host.location(), "/a");
    }

    #[tokio::test]
    async fn test_back_emits_pop_state_with_saved_scroll() {
        let host = MemoryHost::new("/a");
        let mut events = host.events();
        host.push_state("/b", 240.0);
        host.back();

        let event = timeout(Duration::from_secs(1), events.next()).await.unwrap();
        assert_eq!(
            event,
            Some(HostEvent::PopState {
                url: "/a".into(),
                scroll_y: 240.0
            })
        );
        assert_eq!(host.scroll_y(), 240.0);
    }

    #[test]
    fn test_blur_only_clears_the_focused_element() {
        let host = MemoryHost::default();
        host.focus("search");

        host.blur("other");
        assert_eq!(host.focused().as_deref(), Some("search"));
        host.blur("search");
        assert_eq!(host.focused(), None);
    }

    #[test]
    fn test_storage() {
        let host = MemoryHost::default();
        host.storage_set("k", "v");
        assert_eq!(host.storage_get("k"), Some("v".to_owned()));
        host.storage_remove("k");
        assert_eq!(host.storage_get("k"), None);
    }
}

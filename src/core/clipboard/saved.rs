use std::sync::{Arc, Mutex};

use log::warn;

use super::history::load_items;
use crate::core::storage::{KeyValueStore, SAVED_KEY};
use crate::shared::types::ClipboardItem;

/// Unbounded pinned collection, keyed by content
///
/// Holds at most one entry per distinct content string. Its lifecycle is
/// independent of the history store: eviction or deletion there never
/// touches a pinned copy of the same content.
pub struct SavedStore {
    items: Arc<Mutex<Vec<ClipboardItem>>>,
    store: Arc<dyn KeyValueStore>,
}

impl SavedStore {
    /// Restore the pinned set from durable storage; corrupt state is empty.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let items = load_items(store.as_ref(), SAVED_KEY);
        Self {
            items: Arc::new(Mutex::new(items)),
            store,
        }
    }

    /// Whether some pinned entry has this item's content.
    pub fn is_saved(&self, item: &ClipboardItem) -> bool {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|saved| saved.content == item.content)
    }

    /// Pin or unpin in a single atomic step. Returns true when the item is
    /// pinned afterwards.
    ///
    /// Pinning stores an immutable snapshot: a copy with a fresh identity and
    /// timestamp that reuses the source item's type tag.
    pub fn toggle(&self, item: &ClipboardItem) -> bool {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(index) = items.iter().position(|saved| saved.content == item.content) {
            items.remove(index);
            self.persist(&items);
            return false;
        }

        items.insert(0, ClipboardItem::with_type(item.content.clone(), item.item_type));
        self.persist(&items);
        true
    }

    /// Remove the pinned entry matching this item's content, if any.
    pub fn remove(&self, item: &ClipboardItem) {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = items.len();
        items.retain(|saved| saved.content != item.content);
        if items.len() != before {
            self.persist(&items);
        }
    }

    /// Empty the pinned set.
    pub fn clear(&self) {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        items.clear();
        self.persist(&items);
    }

    /// Snapshot of the pinned entries, most recently pinned first.
    pub fn items(&self) -> Vec<ClipboardItem> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a clone of the handle for sharing across threads.
    pub fn clone_arc(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            store: Arc::clone(&self.store),
        }
    }

    fn persist(&self, items: &[ClipboardItem]) {
        match serde_json::to_vec(items) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(SAVED_KEY, &bytes) {
                    warn!("failed to persist saved items: {}", e);
                }
            }
            Err(e) => warn!("failed to serialize saved items: {}", e),
        }
    }
}

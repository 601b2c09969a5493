use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::core::storage::{KeyValueStore, HISTORY_KEY};
use crate::shared::types::ClipboardItem;

/// Bounded clipboard history, most-recent-first
///
/// Owns the ordered sequence of captured items. Insertion order is the only
/// order; the capacity bound is re-applied after every mutation. All
/// mutations serialize through one mutex, so readers never observe a
/// partially applied change.
pub struct ClipboardHistory {
    items: Arc<Mutex<Vec<ClipboardItem>>>,
    max_items: Arc<AtomicUsize>,
    store: Arc<dyn KeyValueStore>,
}

impl ClipboardHistory {
    /// Restore the history from durable storage.
    ///
    /// Missing or corrupt stored state yields an empty history; startup
    /// never fails on bad persisted bytes.
    pub fn new(store: Arc<dyn KeyValueStore>, max_items: usize) -> Self {
        let items = load_items(store.as_ref(), HISTORY_KEY);
        Self {
            items: Arc::new(Mutex::new(items)),
            max_items: Arc::new(AtomicUsize::new(max_items.max(1))),
            store,
        }
    }

    /// Ingest newly detected pasteboard text.
    ///
    /// A value equal to the current head is dropped (adjacent-duplicate
    /// suppression; older duplicates further back are allowed). Otherwise the
    /// value is classified, inserted at the head, and the oldest entries are
    /// evicted until the capacity bound holds again.
    pub fn ingest(&self, content: &str) {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if items.first().map_or(false, |head| head.content == content) {
            debug!("skipping duplicate of current head");
            return;
        }

        items.insert(0, ClipboardItem::new(content));

        let max = self.max_items.load(Ordering::SeqCst);
        while items.len() > max {
            items.pop();
        }

        self.persist(&items);
    }

    /// Snapshot of the sequence, most recent first.
    pub fn items(&self) -> Vec<ClipboardItem> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Look up an item by identity.
    pub fn get(&self, id: &str) -> Option<ClipboardItem> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Remove an item by identity.
    pub fn delete(&self, id: &str) {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() != before {
            self.persist(&items);
        }
    }

    /// Empty the sequence.
    pub fn clear(&self) {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        items.clear();
        self.persist(&items);
    }

    /// Apply a new capacity bound.
    ///
    /// Growth is a no-op on the sequence; shrinkage evicts from the tail
    /// (oldest first) until the bound holds. Any positive value is accepted;
    /// range enforcement belongs to the settings surface.
    pub fn set_capacity(&self, max_items: usize) {
        if max_items == 0 {
            return;
        }
        self.max_items.store(max_items, Ordering::SeqCst);

        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if items.len() > max_items {
            while items.len() > max_items {
                items.pop();
            }
            self.persist(&items);
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_items.load(Ordering::SeqCst)
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
            max_items: Arc::clone(&self.max_items),
            store: Arc::clone(&self.store),
        }
    }

    // Persist failure is logged and dropped; the in-memory sequence stays
    // authoritative for the rest of the process lifetime.
    fn persist(&self, items: &[ClipboardItem]) {
        match serde_json::to_vec(items) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(HISTORY_KEY, &bytes) {
                    warn!("failed to persist clipboard history: {}", e);
                }
            }
            Err(e) => warn!("failed to serialize clipboard history: {}", e),
        }
    }
}

/// Load a serialized item list, treating missing or corrupt state as empty.
pub(crate) fn load_items(store: &dyn KeyValueStore, key: &str) -> Vec<ClipboardItem> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("failed to read stored items for {}: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => items,
        Err(e) => {
            warn!("corrupt stored items for {}, resetting to empty: {}", key, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn history_with(max: usize) -> ClipboardHistory {
        ClipboardHistory::new(Arc::new(MemoryStore::new()), max)
    }

    #[test]
    fn capacity_invariant_holds_after_every_ingest() {
        let history = history_with(5);
        for i in 0..20 {
            history.ingest(&format!("item {}", i));
            assert!(history.len() <= 5);
        }
        let items = history.items();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].content, "item 19");
        assert_eq!(items[4].content, "item 15");
    }

    #[test]
    fn head_duplicate_is_a_no_op() {
        let history = history_with(10);
        history.ingest("same");
        let head_id = history.items()[0].id.clone();

        history.ingest("same");
        let items = history.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, head_id);
    }

    #[test]
    fn non_head_duplicate_inserts_a_new_entry() {
        let history = history_with(10);
        history.ingest("first");
        history.ingest("second");
        history.ingest("first");

        let items = history.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].content, "first");
        assert_eq!(items[2].content, "first");
        assert_ne!(items[0].id, items[2].id);
    }

    #[test]
    fn delete_removes_by_identity() {
        let history = history_with(10);
        history.ingest("keep");
        history.ingest("remove");

        let target = history.items()[0].id.clone();
        history.delete(&target);

        let items = history.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "keep");

        // Deleting an unknown id changes nothing
        history.delete("no-such-id");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn clear_empties_the_sequence() {
        let history = history_with(10);
        history.ingest("a");
        history.ingest("b");
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn shrinking_capacity_evicts_exactly_the_oldest() {
        let history = history_with(8);
        for i in 0..8 {
            history.ingest(&format!("item {}", i));
        }

        history.set_capacity(3);

        let items = history.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].content, "item 7");
        assert_eq!(items[1].content, "item 6");
        assert_eq!(items[2].content, "item 5");
    }

    #[test]
    fn growing_capacity_keeps_the_sequence() {
        let history = history_with(3);
        for i in 0..3 {
            history.ingest(&format!("item {}", i));
        }
        history.set_capacity(10);
        assert_eq!(history.len(), 3);
        assert_eq!(history.capacity(), 10);
    }

    #[test]
    fn history_round_trips_through_storage() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let history = ClipboardHistory::new(Arc::clone(&store), 10);
        history.ingest("one");
        history.ingest("https://example.com");
        history.ingest("three");
        let saved = history.items();

        let restored = ClipboardHistory::new(store, 10);
        let items = restored.items();
        assert_eq!(items.len(), 3);
        for (restored_item, original) in items.iter().zip(saved.iter()) {
            assert_eq!(restored_item.id, original.id);
            assert_eq!(restored_item.content, original.content);
            assert_eq!(restored_item.timestamp, original.timestamp);
            assert_eq!(restored_item.item_type, original.item_type);
        }
    }

    #[test]
    fn corrupt_stored_bytes_yield_an_empty_history() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, b"not json at all").unwrap();

        let history = ClipboardHistory::new(store, 10);
        assert!(history.is_empty());
    }

    #[test]
    fn persist_failure_keeps_memory_authoritative() {
        struct FailingStore;
        impl KeyValueStore for FailingStore {
            fn get(&self, _key: &str) -> crate::shared::errors::EngineResult<Option<Vec<u8>>> {
                Ok(None)
            }
            fn set(&self, _key: &str, _value: &[u8]) -> crate::shared::errors::EngineResult<()> {
                Err(crate::shared::errors::EngineError::Storage("disk full".to_string()))
            }
        }

        let history = ClipboardHistory::new(Arc::new(FailingStore), 10);
        history.ingest("still here");
        assert_eq!(history.items()[0].content, "still here");
    }
}

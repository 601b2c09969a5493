//! Engine assembly
//!
//! Wires the pasteboard, durable storage, settings, and the three clipboard
//! components together the way the app shell consumes them: one handle that
//! owns the wiring, with the capacity observer connecting settings changes
//! to history eviction.

use std::sync::Arc;

use log::warn;

use crate::core::clipboard::{ClipboardHistory, ClipboardMonitor, SavedStore};
use crate::core::pasteboard::{Pasteboard, SystemPasteboard};
use crate::core::storage::{KeyValueStore, MemoryStore, RedbStore};
use crate::shared::errors::{EngineError, EngineResult};
use crate::shared::settings::Settings;
use crate::shared::types::ClipboardItem;

/// Fully wired clipboard engine
pub struct ClipboardEngine {
    settings: Settings,
    history: ClipboardHistory,
    saved: SavedStore,
    monitor: ClipboardMonitor,
}

impl ClipboardEngine {
    /// Assemble an engine over explicit pasteboard and storage backends,
    /// loading settings from the default location.
    pub fn new(pasteboard: Arc<dyn Pasteboard>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_settings(pasteboard, store, Settings::load())
    }

    /// Assemble an engine with an explicit settings handle.
    pub fn with_settings(
        pasteboard: Arc<dyn Pasteboard>,
        store: Arc<dyn KeyValueStore>,
        settings: Settings,
    ) -> Self {
        let history = ClipboardHistory::new(Arc::clone(&store), settings.max_items());
        let saved = SavedStore::new(store);
        let monitor = ClipboardMonitor::new(pasteboard, history.clone_arc());

        {
            let history = history.clone_arc();
            settings.on_max_items_changed(move |max| history.set_capacity(max));
        }

        Self {
            settings,
            history,
            saved,
            monitor,
        }
    }

    /// Assemble an engine over the system pasteboard and the default redb
    /// database. If the database cannot be opened the engine still comes up,
    /// degraded to in-memory storage.
    pub fn with_system_defaults() -> Self {
        let store: Arc<dyn KeyValueStore> = match RedbStore::open_default() {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("failed to open clipboard database, falling back to in-memory storage: {}", e);
                Arc::new(MemoryStore::new())
            }
        };
        Self::new(Arc::new(SystemPasteboard::new()), store)
    }

    /// Start pasteboard monitoring. Must be called from a tokio runtime.
    pub fn start(&self) {
        self.monitor.start();
    }

    /// Stop pasteboard monitoring.
    pub fn stop(&self) {
        self.monitor.stop();
    }

    /// Copy a history item back onto the pasteboard.
    ///
    /// The item's position in the sequence is unchanged, and the write is
    /// suppressed so it does not re-enter history as new content.
    pub fn copy_item(&self, id: &str) -> EngineResult<()> {
        let item = self
            .history
            .get(id)
            .ok_or_else(|| EngineError::InvalidInput(format!("clipboard item not found: {}", id)))?;
        self.monitor.write_and_suppress(&item.content)
    }

    /// Copy any item (history or pinned) back onto the pasteboard.
    pub fn copy_out(&self, item: &ClipboardItem) -> EngineResult<()> {
        self.monitor.write_and_suppress(&item.content)
    }

    pub fn history(&self) -> &ClipboardHistory {
        &self.history
    }

    pub fn saved(&self) -> &SavedStore {
        &self.saved
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn monitor(&self) -> &ClipboardMonitor {
        &self.monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pasteboard::Pasteboard;
    use crate::shared::errors::EngineResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedPasteboard {
        state: Mutex<(u64, Option<String>)>,
    }

    impl ScriptedPasteboard {
        fn set_external(&self, text: &str) {
            let mut state = self.state.lock().unwrap();
            state.0 += 1;
            state.1 = Some(text.to_string());
        }
    }

    impl Pasteboard for ScriptedPasteboard {
        fn change_token(&self) -> u64 {
            self.state.lock().unwrap().0
        }

        fn read_text(&self) -> Option<String> {
            self.state.lock().unwrap().1.clone()
        }

        fn write_text(&self, text: &str) -> EngineResult<()> {
            let mut state = self.state.lock().unwrap();
            state.0 += 1;
            state.1 = Some(text.to_string());
            Ok(())
        }
    }

    fn engine_with_fake() -> (Arc<ScriptedPasteboard>, ClipboardEngine) {
        let pasteboard = Arc::new(ScriptedPasteboard::default());
        let engine = ClipboardEngine::with_settings(
            Arc::clone(&pasteboard) as Arc<dyn Pasteboard>,
            Arc::new(MemoryStore::new()),
            Settings::in_memory(),
        );
        (pasteboard, engine)
    }

    #[test]
    fn settings_capacity_change_reaches_the_history_store() {
        let (pasteboard, engine) = engine_with_fake();

        for i in 0..10 {
            pasteboard.set_external(&format!("item {}", i));
            engine.monitor().poll_once();
        }
        assert_eq!(engine.history().len(), 10);

        engine.settings().set_max_items(5);
        assert_eq!(engine.history().len(), 5);
        assert_eq!(engine.history().items()[0].content, "item 9");
    }

    #[test]
    fn copy_item_does_not_reorder_or_grow_history() {
        let (pasteboard, engine) = engine_with_fake();

        pasteboard.set_external("older");
        engine.monitor().poll_once();
        pasteboard.set_external("newer");
        engine.monitor().poll_once();

        let older_id = engine.history().items()[1].id.clone();
        engine.copy_item(&older_id).unwrap();
        engine.monitor().poll_once();

        let items = engine.history().items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, "newer");
        assert_eq!(items[1].content, "older");
    }

    #[test]
    fn copy_item_with_unknown_id_is_an_error() {
        let (_pasteboard, engine) = engine_with_fake();
        assert!(engine.copy_item("missing").is_err());
    }

    #[test]
    fn pinned_entries_survive_history_eviction_and_deletion() {
        let (pasteboard, engine) = engine_with_fake();

        pasteboard.set_external("precious");
        engine.monitor().poll_once();
        let captured = engine.history().items()[0].clone();
        engine.saved().toggle(&captured);

        engine.history().delete(&captured.id);
        assert!(engine.history().is_empty());
        assert!(engine.saved().is_saved(&captured));

        // Re-copying identical content creates an independent history entry
        pasteboard.set_external("precious");
        engine.monitor().poll_once();
        let recaptured = &engine.history().items()[0];
        assert_eq!(recaptured.content, "precious");
        assert_ne!(recaptured.id, captured.id);
    }

    #[test]
    fn copy_out_works_for_pinned_items() {
        let (pasteboard, engine) = engine_with_fake();

        pasteboard.set_external("pin and copy");
        engine.monitor().poll_once();
        let captured = engine.history().items()[0].clone();
        engine.saved().toggle(&captured);
        engine.history().clear();

        let pinned = engine.saved().items()[0].clone();
        engine.copy_out(&pinned).unwrap();
        engine.monitor().poll_once();

        // The suppressed write never lands back in history
        assert!(engine.history().is_empty());
        assert_eq!(pasteboard.read_text().as_deref(), Some("pin and copy"));
    }
}

//! Clipboard history engine
//!
//! Watches the system pasteboard for new text, classifies each capture, and
//! maintains a bounded most-recent-first history plus an unbounded pinned
//! collection, both persisted through an opaque key-value substrate.

pub mod core;
pub mod shared;

pub use crate::core::clipboard::{ClipboardHistory, ClipboardMonitor, SavedStore};
pub use crate::core::engine::ClipboardEngine;
pub use crate::core::pasteboard::{Pasteboard, SystemPasteboard};
pub use crate::core::storage::{KeyValueStore, MemoryStore, RedbStore, HISTORY_KEY, SAVED_KEY};
pub use crate::shared::errors::{EngineError, EngineResult};
pub use crate::shared::settings::{AppSettings, Settings};
pub use crate::shared::types::{ClipboardItem, ClipboardItemType};

//! Clipboard module
//!
//! Provides clipboard history tracking, monitoring, and pinned items.
//!
//! This module contains three main components:
//! - `history`: bounded, most-recent-first history with deduplication and
//!   capacity enforcement
//! - `monitor`: polling watcher that detects pasteboard changes and
//!   suppresses self-echoes
//! - `saved`: unbounded pinned collection keyed by content

pub mod history;
pub mod monitor;
pub mod saved;

pub use history::ClipboardHistory;
pub use monitor::ClipboardMonitor;
pub use saved::SavedStore;

//! Process-wide user settings
//!
//! Loaded once at startup, persisted synchronously on every mutation.
//! `max_items` is the only field the engine reacts to: changes are pushed to
//! registered observers so the history store can re-apply its capacity bound.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};

/// Smallest history capacity the settings surface will accept
pub const MIN_HISTORY_ITEMS: usize = 5;
/// Largest history capacity the settings surface will accept
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Predefined emoji options for the menu bar icon
pub const ICON_OPTIONS: [&str; 10] = ["📋", "📄", "📝", "📑", "🗂", "📰", "📊", "💾", "⚡️", "🔄"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub max_items: usize,
    pub menu_bar_icon: String,
    pub show_timestamps: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            max_items: 10,
            menu_bar_icon: "📋".to_string(),
            show_timestamps: true,
        }
    }
}

type MaxItemsListener = Box<dyn Fn(usize) + Send + Sync>;

/// Shared, observed settings handle
///
/// Cheap to clone; all clones share the same state and listener list.
#[derive(Clone)]
pub struct Settings {
    inner: Arc<RwLock<AppSettings>>,
    path: Option<PathBuf>,
    listeners: Arc<Mutex<Vec<MaxItemsListener>>>,
}

impl Settings {
    /// Default settings file location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "clipkeep", "clipkeep")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the default location.
    ///
    /// A missing, unreadable, or corrupt file yields defaults; startup never
    /// fails on bad settings state.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load settings from an explicit path (`None` keeps them memory-only).
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let values = path
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(values) => Some(values),
                Err(e) => {
                    warn!("corrupt settings file, using defaults: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            inner: Arc::new(RwLock::new(values)),
            path,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Settings that are never written to disk. Used in tests.
    pub fn in_memory() -> Self {
        Self::load_from(None)
    }

    pub fn snapshot(&self) -> AppSettings {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn max_items(&self) -> usize {
        self.snapshot().max_items
    }

    pub fn menu_bar_icon(&self) -> String {
        self.snapshot().menu_bar_icon
    }

    pub fn show_timestamps(&self) -> bool {
        self.snapshot().show_timestamps
    }

    /// Register an observer for capacity changes.
    pub fn on_max_items_changed(&self, listener: impl Fn(usize) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(listener));
    }

    /// Set the history capacity, clamped to the valid range.
    ///
    /// Persists, then notifies observers with the effective value.
    pub fn set_max_items(&self, max_items: usize) {
        let max_items = max_items.clamp(MIN_HISTORY_ITEMS, MAX_HISTORY_ITEMS);
        {
            let mut values = self
                .inner
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            values.max_items = max_items;
        }
        self.save();
        self.notify_max_items(max_items);
    }

    pub fn set_menu_bar_icon(&self, icon: impl Into<String>) {
        {
            let mut values = self
                .inner
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            values.menu_bar_icon = icon.into();
        }
        self.save();
    }

    pub fn set_show_timestamps(&self, show: bool) {
        {
            let mut values = self
                .inner
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            values.show_timestamps = show;
        }
        self.save();
    }

    /// Restore every field to its default value.
    pub fn reset_to_defaults(&self) {
        let defaults = AppSettings::default();
        let max_items = defaults.max_items;
        {
            let mut values = self
                .inner
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *values = defaults;
        }
        self.save();
        self.notify_max_items(max_items);
    }

    fn notify_max_items(&self, max_items: usize) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in listeners.iter() {
            listener(max_items);
        }
    }

    /// Best-effort synchronous persist; failure keeps in-memory state
    /// authoritative.
    fn save(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("failed to create config directory: {}", e);
                return;
            }
        }

        let snapshot = self.snapshot();
        match serde_json::to_string_pretty(&snapshot) {
            Ok(content) => {
                if let Err(e) = std::fs::write(path, content) {
                    warn!("failed to write settings file: {}", e);
                }
            }
            Err(e) => warn!("failed to serialize settings: {}", e),
        }
    }
}

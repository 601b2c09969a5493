use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::time::{sleep, Duration};

use super::history::ClipboardHistory;
use crate::core::pasteboard::Pasteboard;
use crate::shared::errors::EngineResult;

/// Polling interval. A tuning constant, not a contract.
const POLL_INTERVAL_MS: u64 = 500;

/// Clipboard monitor that polls the pasteboard for changes
///
/// Detection works on change tokens: a tick that sees the same token as the
/// previous one does nothing. When the token moves, it is recorded
/// unconditionally, even for ticks that are ultimately discarded (empty
/// content, suppressed self-echo, paused) so stale state is never
/// re-processed at a later tick.
pub struct ClipboardMonitor {
    pasteboard: Arc<dyn Pasteboard>,
    history: ClipboardHistory,
    running: Arc<AtomicBool>,
    enabled: Arc<AtomicBool>,
    suppress_next: Arc<AtomicBool>,
    last_seen: Arc<Mutex<Option<u64>>>,
}

impl ClipboardMonitor {
    /// Create a new clipboard monitor feeding the given history store.
    pub fn new(pasteboard: Arc<dyn Pasteboard>, history: ClipboardHistory) -> Self {
        Self {
            pasteboard,
            history,
            running: Arc::new(AtomicBool::new(false)),
            enabled: Arc::new(AtomicBool::new(true)),
            suppress_next: Arc::new(AtomicBool::new(false)),
            last_seen: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the polling task. Idempotent; a second call is a no-op.
    ///
    /// The current change token is captured as the baseline before the first
    /// tick, so content already on the pasteboard at startup is not treated
    /// as new. Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        self.capture_baseline();

        let monitor = self.clone_arc();
        tokio::spawn(async move {
            debug!("clipboard monitor started");
            while monitor.running.load(Ordering::SeqCst) {
                monitor.poll_once();
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            debug!("clipboard monitor stopped");
        });
    }

    /// Stop polling. Idempotent and level-triggered: no more ticks fire, but
    /// a tick already in progress completes.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Pause ingestion without stopping the polling task.
    ///
    /// A paused monitor keeps consuming change tokens, so content copied
    /// while paused is not replayed on resume.
    pub fn pause(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Run one detection tick.
    pub fn poll_once(&self) {
        let current = self.pasteboard.change_token();
        {
            let mut last = self
                .last_seen
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *last == Some(current) {
                return;
            }
            // Record the token before looking at content, so a tick that is
            // discarded below can never be re-processed later.
            *last = Some(current);
        }

        let Some(text) = self.pasteboard.read_text() else {
            return;
        };
        if text.is_empty() {
            return;
        }

        if self.suppress_next.swap(false, Ordering::SeqCst) {
            debug!("ignored self-initiated copy");
            return;
        }

        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }

        self.history.ingest(&text);
    }

    /// Write text to the pasteboard without the echo landing back in history.
    ///
    /// The last-seen token is resynchronized to the post-write token, so the
    /// next tick sees "no change"; the suppression flag only covers a tick
    /// that was already in flight during the write.
    pub fn write_and_suppress(&self, text: &str) -> EngineResult<()> {
        self.suppress_next.store(true, Ordering::SeqCst);

        if let Err(e) = self.pasteboard.write_text(text) {
            // Nothing was written, so nothing will echo
            self.suppress_next.store(false, Ordering::SeqCst);
            warn!("pasteboard write failed: {}", e);
            return Err(e);
        }

        let token = self.pasteboard.change_token();
        let mut last = self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(token);
        Ok(())
    }

    fn capture_baseline(&self) {
        let token = self.pasteboard.change_token();
        let mut last = self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(token);
    }

    /// Get a clone of the handle for sharing across threads.
    pub fn clone_arc(&self) -> Self {
        Self {
            pasteboard: Arc::clone(&self.pasteboard),
            history: self.history.clone_arc(),
            running: Arc::clone(&self.running),
            enabled: Arc::clone(&self.enabled),
            suppress_next: Arc::clone(&self.suppress_next),
            last_seen: Arc::clone(&self.last_seen),
        }
    }
}

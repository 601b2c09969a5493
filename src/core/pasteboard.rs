//! Pasteboard access
//!
//! The system pasteboard has no push API, so change detection is built on an
//! opaque change token: the token must differ after every external content
//! replacement and after every write performed through this interface.
//! Failures are never fatal; a failed read is simply "no content this tick".

use std::sync::Mutex;

use cli_clipboard::{ClipboardContext, ClipboardProvider};
use crate::shared::errors::{EngineError, EngineResult};

/// Narrow interface to the external pasteboard resource
pub trait Pasteboard: Send + Sync {
    /// Current change token. Changes whenever pasteboard content is replaced.
    fn change_token(&self) -> u64;

    /// Current text content, if any. `None` on read failure.
    fn read_text(&self) -> Option<String>;

    /// Replace the pasteboard content. The change token observed afterwards
    /// must differ from the one observed before.
    fn write_text(&self, text: &str) -> EngineResult<()>;
}

#[derive(Default)]
struct TokenState {
    token: u64,
    last_hash: Option<u64>,
}

/// System pasteboard adapter
///
/// The OS clipboard APIs this builds on expose no change counter, so tokens
/// are synthesized: content is hashed on every token read and the counter
/// advances when the hash moves. Writes advance the counter unconditionally
/// and record the written content's hash, satisfying the write contract.
pub struct SystemPasteboard {
    state: Mutex<TokenState>,
}

impl SystemPasteboard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TokenState::default()),
        }
    }

    // A fresh context per call keeps the adapter free of platform handles
    // that cannot move across threads.
    fn read_raw() -> EngineResult<String> {
        let mut ctx =
            ClipboardContext::new().map_err(|e| EngineError::Pasteboard(e.to_string()))?;
        ctx.get_contents()
            .map_err(|e| EngineError::Pasteboard(e.to_string()))
    }

    fn content_hash(text: &str) -> u64 {
        let digest = md5::compute(text.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.0[..8]);
        u64::from_be_bytes(prefix)
    }
}

impl Default for SystemPasteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Pasteboard for SystemPasteboard {
    fn change_token(&self) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Ok(text) = Self::read_raw() {
            let hash = Self::content_hash(&text);
            if state.last_hash != Some(hash) {
                state.last_hash = Some(hash);
                state.token = state.token.wrapping_add(1);
            }
        }
        state.token
    }

    fn read_text(&self) -> Option<String> {
        Self::read_raw().ok()
    }

    fn write_text(&self, text: &str) -> EngineResult<()> {
        let mut ctx =
            ClipboardContext::new().map_err(|e| EngineError::Pasteboard(e.to_string()))?;
        ctx.set_contents(text.to_owned())
            .map_err(|e| EngineError::Pasteboard(e.to_string()))?;

        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.last_hash = Some(Self::content_hash(text));
        state.token = state.token.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_and_discriminates() {
        let a = SystemPasteboard::content_hash("hello");
        let b = SystemPasteboard::content_hash("hello");
        let c = SystemPasteboard::content_hash("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

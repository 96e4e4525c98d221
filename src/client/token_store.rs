//! Durable storage for the session token.
//!
//! Stands in for the browser's local storage: one fixed slot, written
//! on login, cleared on logout or any failed session check. Storage
//! failures are logged and otherwise swallowed, like a full or
//! disabled local storage would be.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

const TOKEN_FILE: &str = ".taskdeck_token";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// File-backed store for real use.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new(TOKEN_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        match fs::read_to_string(&self.path) {
            Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("failed to read stored token: {e}");
                None
            }
        }
    }

    fn save(&self, token: &str) {
        if let Err(e) = fs::write(&self.path, token) {
            warn!("failed to persist token: {e}");
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("failed to clear stored token: {e}");
            }
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn save(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }
}

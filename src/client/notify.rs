//! Transient user-visible notifications (the web UI's toasts).

use std::sync::Mutex;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: Notice, message: &str);

    fn success(&self, message: &str) {
        self.notify(Notice::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(Notice::Error, message);
    }
}

/// Default sink: log events stand in for on-screen toasts.
#[derive(Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: Notice, message: &str) {
        match kind {
            Notice::Success => info!(target: "taskdeck::toast", "{message}"),
            Notice::Error => warn!(target: "taskdeck::toast", "{message}"),
        }
    }
}

/// Test double recording every notification in order.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(Notice, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(Notice, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(Notice, String)> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: Notice, message: &str) {
        self.notices.lock().unwrap().push((kind, message.to_string()));
    }
}

//! Client-side state layer: the browser app's auth session, task
//! cache and Kanban board, speaking to the server over HTTP.
//!
//! Dependencies (the HTTP client, the durable token store and the
//! notification sink) are injected at construction, so tests swap in
//! in-memory doubles and drive the whole stack against a local server.

pub mod api;
pub mod board;
pub mod cache;
pub mod notify;
pub mod session;
pub mod token_store;

pub use api::{ApiClient, ClientError};
pub use board::{Board, DragError, DragMove, DragOutcome};
pub use cache::TaskCache;
pub use notify::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use session::AuthSession;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::store::{TaskStore, UserStore};

/// Shared handles injected into every handler. Stores are trait
/// objects so the Postgres and in-memory backends are interchangeable.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub signer: TokenSigner,
}

//! Task-management service and client-side state layer.
//!
//! The server half is an axum API over Postgres: JWT-authenticated
//! users own tasks they can create, list (with filters and sorting),
//! update and delete. The [`client`] module mirrors the browser state
//! layer (auth session, task cache, Kanban board) for programmatic
//! consumers and end-to-end tests.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;

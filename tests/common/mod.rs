//! Shared fixture: the full router over the in-memory store, served
//! on an ephemeral port. Dropping the server aborts it.

#![allow(dead_code)]

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use taskdeck::auth::TokenSigner;
use taskdeck::routes;
use taskdeck::state::AppState;
use taskdeck::store::memory::MemoryStore;

pub struct TestServer {
    pub url: String,
    server: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            users: store.clone(),
            tasks: store,
            signer: TokenSigner::new("test-secret"),
        };
        let app = routes::routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            url: format!("http://{addr}"),
            server,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Register a user, asserting success; returns `{id,name,email,token}`.
pub async fn register(client: &reqwest::Client, base: &str, name: &str, email: &str) -> Value {
    let response = client
        .post(format!("{base}/api/users/register"))
        .json(&json!({ "name": name, "email": email, "password": "correct horse battery" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

/// Create a task as the given user, asserting success.
pub async fn create_task(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    body: Value,
) -> Value {
    let response = client
        .post(format!("{base}/api/tasks"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

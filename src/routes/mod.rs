//! Router assembly. Register and login stay public; everything else
//! under `/api` sits behind the bearer-token middleware.

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

mod health;
pub mod middleware_auth;
mod tasks;
mod users;

use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let task_router = Router::new()
        .route("/", post(tasks::create).get(tasks::list))
        .route("/{id}", put(tasks::update).delete(tasks::delete));

    let api = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .merge(
            Router::new()
                .route("/users/me", get(users::me))
                .nest("/tasks", task_router)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    middleware_auth::require_auth,
                )),
        );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .nest("/api", api)
        // the consumer is a browser app served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Welcome to the Taskdeck API"
}

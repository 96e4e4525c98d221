use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: u16,
}

/// Liveness probe; no auth, no dependencies.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: StatusCode::OK.as_u16(),
    })
}

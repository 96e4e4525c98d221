//! Registration, login and the current-user endpoint.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use crate::auth;
use crate::error::{Error, Result};
use crate::model::user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, UserProfile};
use crate::routes::middleware_auth::CurrentUser;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(Error::Validation("Name and email are required".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(Error::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;

    // duplicates surface from the store's unique constraint, not a
    // lookup beforehand
    let user = state
        .users
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_string(),
            password_hash,
        })
        .await?;

    let token = state.signer.issue(user.id)?;
    info!(user = %user.id, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    // unknown email and wrong password answer identically
    let invalid = || Error::Unauthorized("Invalid email or password".to_string());

    let user = state
        .users
        .user_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = state.signer.issue(user.id)?;

    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

pub async fn me(CurrentUser(profile): CurrentUser) -> Json<UserProfile> {
    Json(profile)
}

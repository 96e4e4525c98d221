//! Bearer-token middleware guarding the authenticated `/api` routes.
//!
//! Returning `Result<Response, Error>` means every request gets
//! exactly one response: either the rejection or whatever `next`
//! produced, never both.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{Error, Result};
use crate::model::user::UserProfile;
use crate::state::AppState;

/// Identity resolved by [`require_auth`]. Handlers take it as an
/// extractor; the credential hash never travels with it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Not authorized, no token.".to_string()))
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| Error::Unauthorized("Not authorized, no token.".to_string()))?;

    let user_id = state.signer.verify(token)?;

    // the subject may no longer resolve, e.g. a token outliving its
    // user row; that is the same failure as a bad token
    let user = state
        .users
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized("Not authorized, token failed.".to_string()))?;

    req.extensions_mut().insert(CurrentUser(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
    }));

    Ok(next.run(req).await)
}

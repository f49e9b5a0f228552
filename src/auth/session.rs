use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    auth::token::{decode_token, Claims},
    error::{AppError, AppResult},
    model::user::User,
    state::AppState,
};

/// The caller of an authenticated route, resolved fresh from the store on
/// every request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub claims: Claims,
}

/// An [`AuthenticatedUser`] that is also an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

/// Turns a raw session token into the user behind it. Rejects bad
/// signatures, expired or revoked tokens, and tokens of deleted users.
pub async fn resolve_session(state: &AppState, token: &str) -> AppResult<AuthenticatedUser> {
    let claims = decode_token(&state.jwt_secret, token)
        .map_err(|_| AppError::unauthorized("invalid or expired token"))?;

    if state.db.is_token_revoked(&claims.jti).await? {
        return Err(AppError::unauthorized("session has ended"));
    }

    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::unauthorized("invalid or expired token"))?;
    let user = state
        .db
        .load_user(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("account no longer exists"))?;

    Ok(AuthenticatedUser { user, claims })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
}

/// Session of the request if it carries a valid one.
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<AuthenticatedUser> {
    let token = bearer_token(headers)?;
    resolve_session(state, &token).await.ok()
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;
        resolve_session(state, &token).await
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let caller = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !caller.user.is_admin() {
            return Err(AppError::forbidden("admin role required"));
        }
        Ok(AdminUser(caller))
    }
}

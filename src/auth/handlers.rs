use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    auth::{
        password::{has_default_password, hash_password, verify_password},
        session::{current_session, AuthenticatedUser},
        token::issue_token,
        types::*,
    },
    error::{AppError, AppResult},
    model::user::{compose_address, NewUser, UserRole},
    state::AppState,
};

pub const CHANGE_PASSWORD_WARNING: &str = "change-password";

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());

pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !EMAIL_SHAPE.is_match(&email) {
        return Err(AppError::invalid("invalid email address"));
    }
    Ok(email)
}

pub(crate) fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    if current_session(&state, &headers).await.is_some() {
        return Err(AppError::invalid("already logged in"));
    }

    let name = required("name", &req.name)?;
    let email = normalize_email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::invalid("password is required"));
    }

    let new = NewUser {
        name,
        email: email.clone(),
        password_hash: hash_password(&req.password)?,
        phone: optional(req.phone.as_deref()),
        address: compose_address(&req.street, &req.housenumber, &req.postcode, &req.place),
        role: UserRole::Client,
    };

    let user = state
        .db
        .create_user(new)
        .await?
        .ok_or_else(|| AppError::invalid("email already registered"))?;

    info!(user_id = user.id, email = email.as_str(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.profile(),
        }),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if current_session(&state, &headers).await.is_some() {
        return Err(AppError::invalid("already logged in"));
    }

    let invalid = || AppError::unauthorized("invalid email or password");

    let email = req.email.trim().to_lowercase();
    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&user.password_hash, &req.password)? {
        warn!(user_id = user.id, "failed login");
        return Err(invalid());
    }

    let warning = has_default_password(&user)?.then_some(CHANGE_PASSWORD_WARNING);

    let (token, _) = issue_token(&state.jwt_secret, user.id, state.token_ttl_secs)?;
    info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.profile(),
        warning,
    }))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<Json<Value>> {
    state
        .db
        .revoke_token(&caller.claims.jti, caller.claims.exp as i64)
        .await?;
    info!(user_id = caller.user.id, "user logged out");
    Ok(Json(json!({ "error": "ok" })))
}

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    api::types::{SearchUserRequest, SetRoleRequest},
    auth::{password::default_password_hash, session::AdminUser},
    error::{AppError, AppResult},
    model::user::{User, UserProfile},
    state::AppState,
};

async fn load_user_or_404(state: &AppState, id: u64) -> AppResult<User> {
    state
        .db
        .load_user(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no user with id {id}")))
}

/// Writes `user` back, failing when the store refused it.
async fn save_user(state: &AppState, user: &User) -> AppResult<()> {
    if !state.db.update_user(user).await? {
        return Err(AppError::invalid("email already registered"));
    }
    Ok(())
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.iter().map(User::profile).collect()))
}

pub async fn search_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<SearchUserRequest>,
) -> AppResult<Json<UserProfile>> {
    let name = req.username.trim();
    let user = state
        .db
        .find_user_by_name(name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no users found with the name: {name}")))?;
    Ok(Json(user.profile()))
}

pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<u64>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(load_user_or_404(&state, id).await?.profile()))
}

pub async fn set_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<u64>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<Json<UserProfile>> {
    let mut user = load_user_or_404(&state, id).await?;
    user.role = req.role;
    save_user(&state, &user).await?;

    info!(admin_id = admin.user.id, user_id = id, role = ?user.role, "role changed");
    Ok(Json(user.profile()))
}

/// Sets the password back to the user's own email.
pub async fn reset_password(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<u64>,
) -> AppResult<Json<UserProfile>> {
    let mut user = load_user_or_404(&state, id).await?;
    user.password_hash = default_password_hash(&user.email)?;
    save_user(&state, &user).await?;

    info!(admin_id = admin.user.id, user_id = id, "password reset to default");
    Ok(Json(user.profile()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<u64>,
) -> AppResult<Json<Value>> {
    let user = state
        .db
        .delete_user(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no user with id {id}")))?;

    if let Err(err) = state.storage.remove_picture(&user.image_file).await {
        warn!(?err, user_id = id, "failed to remove picture of deleted user");
    }

    info!(admin_id = admin.user.id, user_id = id, "user deleted");
    Ok(Json(json!({ "id": id, "deleted": true })))
}

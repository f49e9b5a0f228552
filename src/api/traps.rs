use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    api::types::{ClaimTrapRequest, TrapsResponse, UpdateTrapRequest},
    auth::session::AuthenticatedUser,
    error::AppResult,
    model::trap::Trap,
    state::AppState,
    traps::ownership,
};

pub async fn list_traps(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
) -> AppResult<Json<TrapsResponse>> {
    let traps = ownership::list_traps(&state.db).await?;
    Ok(Json(TrapsResponse { traps }))
}

pub async fn claim_trap(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<ClaimTrapRequest>,
) -> AppResult<Json<Trap>> {
    let trap = ownership::claim_trap(&state.db, caller.user.id, &req.mac).await?;
    Ok(Json(trap))
}

pub async fn get_trap(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(mac): Path<String>,
) -> AppResult<Json<Trap>> {
    Ok(Json(ownership::get_trap(&state.db, &mac).await?))
}

pub async fn update_trap(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(mac): Path<String>,
    Json(req): Json<UpdateTrapRequest>,
) -> AppResult<Json<Trap>> {
    let trap = ownership::rename_trap(
        &state.db,
        &mac,
        req.name.as_deref(),
        req.owner_email.as_deref(),
    )
    .await?;
    Ok(Json(trap))
}

pub async fn delete_trap(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(mac): Path<String>,
) -> AppResult<Json<Value>> {
    ownership::delete_trap(&state.db, &mac).await?;
    Ok(Json(json!({ "mac": mac, "deleted": true })))
}

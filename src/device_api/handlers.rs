use axum::{body::Bytes, extract::State};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::{
    device_api::types::{DeviceStatus, SearchConnectRequest, UpdateStatusRequest},
    error::AppResult,
    state::AppState,
    traps::ingest,
};

// parsed by hand so a bad body still gets the device reply shape
fn parse<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(v) => Some(v),
        Err(err) => {
            debug!(%err, "rejected device payload");
            None
        }
    }
}

fn reply<T>(result: AppResult<T>) -> DeviceStatus {
    match result {
        Ok(_) => DeviceStatus::Ok,
        Err(err) => {
            let status = DeviceStatus::from(&err);
            if status == DeviceStatus::Internal {
                error!(error = ?err, "device call failed");
            }
            status
        }
    }
}

/// Device self-registration.
pub async fn search_connect(State(state): State<AppState>, body: Bytes) -> DeviceStatus {
    let Some(req) = parse::<SearchConnectRequest>(&body) else {
        return DeviceStatus::InvalidJson;
    };
    reply(ingest::register_device(&state.db, &req.mac).await)
}

/// Caught/armed report.
pub async fn update_status(State(state): State<AppState>, body: Bytes) -> DeviceStatus {
    let Some(req) = parse::<UpdateStatusRequest>(&body) else {
        return DeviceStatus::InvalidJson;
    };
    reply(ingest::report_status(&state.db, &state.hub, &req.mac, req.status).await)
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SearchConnectRequest {
    pub mac: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub mac: String,
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct DeviceReply {
    pub error: &'static str,
}

/// Outcome of a device call. The reason string is the contract; the status
/// code mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Ok,
    NotFound,
    InvalidJson,
    Internal,
}

impl DeviceStatus {
    pub fn reason(&self) -> &'static str {
        match self {
            DeviceStatus::Ok => "ok",
            DeviceStatus::NotFound => "not-found",
            DeviceStatus::InvalidJson => "invalid-json",
            DeviceStatus::Internal => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            DeviceStatus::Ok => StatusCode::OK,
            DeviceStatus::NotFound => StatusCode::NOT_FOUND,
            DeviceStatus::InvalidJson => StatusCode::BAD_REQUEST,
            DeviceStatus::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&AppError> for DeviceStatus {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::InvalidRequest(_) => DeviceStatus::InvalidJson,
            AppError::NotFound(_) => DeviceStatus::NotFound,
            AppError::Unauthorized(_) | AppError::Forbidden(_) | AppError::Internal(_) => {
                DeviceStatus::Internal
            }
        }
    }
}

impl IntoResponse for DeviceStatus {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(DeviceReply {
                error: self.reason(),
            }),
        )
            .into_response()
    }
}

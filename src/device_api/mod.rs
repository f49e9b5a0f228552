//! Endpoints called by the traps themselves. No session: a device has no
//! account. Every outcome, failures included, is a `{"error": <reason>}` body.

use axum::{routing::post, Router};

use crate::state::AppState;

pub mod handlers;
pub mod types;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search_connect", post(handlers::search_connect))
        .route("/update_status", post(handlers::update_status))
}

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod account;
pub mod traps;
pub mod types;

/// Routes for logged-in users. Every handler takes an `AuthenticatedUser`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/user/self",
            get(account::get_account).put(account::update_account),
        )
        .route("/api/user/self/picture", post(account::upload_picture))
        .route("/api/contact", get(account::contact))
        .route("/api/traps", get(traps::list_traps))
        .route("/api/traps/claim", post(traps::claim_trap))
        .route(
            "/api/traps/{mac}",
            get(traps::get_trap)
                .put(traps::update_trap)
                .delete(traps::delete_trap),
        )
}

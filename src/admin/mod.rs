use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub mod bootstrap;
pub mod handlers;

/// User management. Every handler takes an `AdminUser`, so a non-admin caller
/// is turned away before anything is read or written.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/search", post(handlers::search_user))
        .route(
            "/api/user/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/api/user/{id}/role", put(handlers::set_role))
        .route("/api/user/{id}/reset", post(handlers::reset_password))
}

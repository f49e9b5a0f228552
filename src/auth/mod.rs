pub mod handlers;
pub mod password;
pub mod session;
pub mod token;
pub mod types;

use axum::{routing::post, Router};

use crate::state::AppState;
use handlers::{login_handler, logout_handler, register_handler};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
}

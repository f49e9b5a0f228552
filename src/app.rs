use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{admin, api, auth, device_api, state::AppState, ws};

pub fn build_router(state: AppState) -> Router {
    let pictures = ServeDir::new(state.storage.root());

    Router::new()
        // Device ingestion (unauthenticated)
        .merge(device_api::router())
        // Accounts
        .merge(auth::router())
        .merge(api::router())
        .merge(admin::router())
        // Push notifications
        .merge(ws::ws_router())
        .nest_service("/static/profile_pics", pictures)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

use axum::extract::ws::{rejection::WebSocketUpgradeRejection, Message as WsMessage, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::{
    auth::session::resolve_session,
    notify::Subscription,
    state::AppState,
};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

// ------------------------------------------------------------
// TYPES
// ------------------------------------------------------------
#[derive(Deserialize, Debug)]
pub struct WsParams {
    /// Browsers cannot set headers on a websocket upgrade, so the session
    /// token travels in the query string.
    pub token: String,
}

// ------------------------------------------------------------
// ROUTER
// ------------------------------------------------------------
pub fn ws_router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

// The session is checked before the upgrade headers so a bad token is a 401
// whatever the request looks like.
async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let caller = match resolve_session(&state, &params.token).await {
        Ok(caller) => caller,
        Err(err) => return err.into_response(),
    };
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let user_id = caller.user.id;
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

// ------------------------------------------------------------
// WEBSOCKET HANDLER (SPLIT SOCKET)
// ------------------------------------------------------------
async fn handle_socket(socket: WebSocket, state: AppState, user_id: u64) {
    let (mut ws_sender, mut receiver) = socket.split();
    let Subscription { id, mut rx } = state.hub.subscribe(user_id).await;

    // Writer task forwards hub notifications to the socket.
    let mut writer = tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            match timeout(SEND_TIMEOUT, ws_sender.send(WsMessage::Text(json.into()))).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => break,
                Err(_) => continue,
            }
        }
    });

    // Incoming frames carry nothing; drain until the client goes away.
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, WsMessage::Close(_)) {
                break;
            }
            debug!(user_id, "ignoring client frame");
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    state.hub.unsubscribe(user_id, id).await;
    let remaining = state.hub.connection_count().await;
    info!(user_id, connection_id = %id, remaining, "websocket closed");
}

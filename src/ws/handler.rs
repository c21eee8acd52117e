use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use uuid::Uuid;

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Raw WebSockets carry no client-visible id,
/// so the server assigns a connection id at upgrade and reports it to the
/// client in a `connected` event.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let connection_id = Uuid::now_v7().to_string();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Hand the upgraded socket to the per-connection actor.
async fn handle_socket(socket: WebSocket, state: AppState, connection_id: String) {
    actor::run_connection(socket, state, connection_id).await;
}

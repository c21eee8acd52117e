//! Broadcast helpers for the live room.

use crate::state::AppState;
use crate::ws::protocol::ServerEvent;

/// Send the current presence snapshot to every joined connection.
/// The frame is serialized once and cloned per receiver. Sends to peers
/// whose writer has already gone away are ignored; their own disconnect
/// path removes them from the registries.
pub fn broadcast_live_users(state: &AppState) {
    let snapshot = state.presence.snapshot();
    let event = ServerEvent::LiveUsers(snapshot.clone());
    let Some(msg) = event.to_message() else {
        return;
    };

    for live_user in &snapshot {
        if let Some(sender) = state.connections.get(&live_user.connection_id) {
            let _ = sender.send(msg.clone());
        }
    }
}

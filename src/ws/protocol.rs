//! JSON event protocol for the realtime channel.
//!
//! Frames are text messages of the shape {"event": ..., "data": ...}.
//! Inbound: joinRoom (alias joinLive). Outbound: connected, liveUsers.
//! Malformed or unknown inbound frames are dropped without a reply — a
//! long-lived connection handler must not surface per-event failures.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

use crate::presence::LiveUser;
use crate::state::AppState;
use crate::users::store;
use crate::ws::broadcast::broadcast_live_users;

/// Events a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "joinRoom", alias = "joinLive")]
    JoinRoom(JoinPayload),
}

/// Payload of a join event: either a bare persisted-user id to resolve
/// server-side, or a claimed email + display name sent directly.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JoinPayload {
    UserId(String),
    #[serde(rename_all = "camelCase")]
    Identity {
        #[serde(default)]
        email: String,
        #[serde(default)]
        display_name: String,
    },
}

/// Events the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Sent once at socket open so the client learns its connection id.
    #[serde(rename = "connected")]
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: String,
    },
    /// Current live membership, sent to every joined connection whenever
    /// membership changes.
    #[serde(rename = "liveUsers")]
    LiveUsers(Vec<LiveUser>),
}

impl ServerEvent {
    /// Encode as a text WebSocket message.
    pub fn to_message(&self) -> Option<Message> {
        serde_json::to_string(self).ok().map(|s| Message::Text(s.into()))
    }
}

/// Handle an incoming text frame: decode the event and dispatch.
pub async fn handle_text_message(text: &str, connection_id: &str, state: &AppState) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection_id,
                error = %e,
                "Dropping malformed realtime event"
            );
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom(payload) => {
            handle_join(payload, connection_id, state).await;
        }
    }
}

/// Process a join: resolve the claimed identity, record it in the presence
/// registry, and broadcast the new snapshot. Joins that resolve to an empty
/// email or display name are ignored, as are ids of unknown users.
async fn handle_join(payload: JoinPayload, connection_id: &str, state: &AppState) {
    let (email, display_name) = match payload {
        JoinPayload::Identity {
            email,
            display_name,
        } => (email, display_name),
        JoinPayload::UserId(user_id) => {
            let db = state.db.clone();
            let resolved = tokio::task::spawn_blocking(move || {
                let conn = db.lock().ok()?;
                store::find_user_by_id(&conn, &user_id).ok()
            })
            .await
            .ok()
            .flatten();

            match resolved {
                Some(user) => {
                    let name = user.display_name();
                    (user.email_id, name)
                }
                None => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Join event for unknown user id, ignoring"
                    );
                    return;
                }
            }
        }
    };

    if state.presence.join(connection_id, &email, &display_name) {
        tracing::info!(
            connection_id = %connection_id,
            email = %email,
            "Connection joined live room"
        );
        broadcast_live_users(state);
    } else {
        tracing::debug!(
            connection_id = %connection_id,
            "Join event with empty identity, ignoring"
        );
    }
}

use crate::{
    auth::extractor::authenticate,
    error::{ApiError, ApiResult},
    realtime::{Room, events, frame, rooms_for},
    state::SharedState,
};
use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use chrono::Utc;
use database::{entities::users, services::chat::ChatService};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use utoipa::IntoParams;
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(connect))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConnectParams {
    /// Access token, browsers cannot set headers on WebSocket requests
    pub token: Option<String>,
}

/// Frames a client may send
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum ClientFrame {
    Typing {
        #[serde(rename = "chatId")]
        chat_id: Uuid,
        #[serde(rename = "isTyping", default = "typing_default")]
        is_typing: bool,
    },
    Ping,
}

fn typing_default() -> bool {
    true
}

/// Upgrades to the real-time channel
#[utoipa::path(
    get,
    path = "/api/ws",
    params(ConnectParams),
    responses(
        (status = 101, description = "Switching to WebSocket"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Account is inactive")
    ),
    tag = "Realtime"
)]
pub async fn connect(
    State(state): State<SharedState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let token = params.token.ok_or_else(ApiError::unauthorized)?;
    let user = authenticate(&state, token.trim()).await?;
    Ok(ws.on_upgrade(move |socket| session(socket, state, user)))
}

async fn session(socket: WebSocket, state: SharedState, user: users::Model) {
    let rooms = rooms_for(user.id, user.role, user.department_id);
    let mut deliveries = state.hub.subscribe();
    let (mut sender, mut receiver) = socket.split();

    if state.hub.connect(user.id).await {
        announce(&state, &user, true);
    }
    info!("WebSocket opened for {}", user.id);

    loop {
        tokio::select! {
            delivery = deliveries.recv() => match delivery {
                Ok(delivery) if rooms.contains(&delivery.room) => {
                    if sender.send(Message::Text(delivery.payload.to_string().into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Connection of {} lagged, {skipped} events dropped", user.id);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_frame(&state, &user, text.as_str()).await
                        && sender.send(Message::Text(reply.to_string().into())).await.is_err()
                    {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket error for {}: {e}", user.id);
                    break;
                }
            },
        }
    }

    if state.hub.disconnect(user.id).await {
        announce(&state, &user, false);
    }
    info!("WebSocket closed for {}", user.id);
}

/// Presence goes to the user's department room
fn announce(state: &SharedState, user: &users::Model, online: bool) {
    if let Some(department_id) = user.department_id {
        let status = if online { "online" } else { "offline" };
        state.hub.emit(
            Room::Department(department_id),
            events::PRESENCE,
            &json!({ "userId": user.id, "name": user.name, "status": status }),
        );
    }
}

/// Handles one client frame, returning a direct reply if any
async fn handle_frame(state: &SharedState, user: &users::Model, text: &str) -> Option<Arc<str>> {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(ClientFrame::Ping) => Some(frame(events::PONG, &json!({ "at": Utc::now() }))),
        Ok(ClientFrame::Typing { chat_id, is_typing }) => {
            match ChatService::participant_ids(&state.db, chat_id).await {
                Ok(ids) if ids.contains(&user.id) => {
                    let others = ids.into_iter().filter(|id| *id != user.id);
                    state.hub.emit_to_users(
                        others,
                        events::TYPING,
                        &json!({ "chatId": chat_id, "userId": user.id, "isTyping": is_typing }),
                    );
                }
                Ok(_) => debug!("{} is not in chat {chat_id}", user.id),
                Err(e) => warn!("Typing relay failed for chat {chat_id}: {e}"),
            }
            None
        }
        Err(e) => {
            debug!("Ignoring frame from {}: {e}", user.id);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_typing_frame() {
        let id = Uuid::new_v4();
        let frame: ClientFrame =
            serde_json::from_str(&format!(r#"{{"event":"typing","chatId":"{id}"}}"#)).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Typing {
                chat_id: id,
                is_typing: true
            }
        );
    }

    #[test]
    fn test_parse_stopped_typing() {
        let id = Uuid::new_v4();
        let frame: ClientFrame = serde_json::from_str(&format!(
            r#"{{"event":"typing","chatId":"{id}","isTyping":false}}"#
        ))
        .unwrap();
        assert!(matches!(frame, ClientFrame::Typing { is_typing: false, .. }));
    }

    #[test]
    fn test_parse_ping() {
        let frame: ClientFrame = serde_json::from_str(r#"{"event":"ping"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Ping);
    }

    #[rstest]
    #[case(r#"{"event":"dance"}"#)]
    #[case(r#"{"event":"typing"}"#)]
    #[case("not json")]
    fn test_rejects_unknown_frames(#[case] raw: &str) {
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }
}

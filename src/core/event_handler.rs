//! Inbound event dispatch
//!
//! Parses raw text frames into `ClientEvent` and routes them to the server
//! manager. A malformed frame is dropped with a warning; it never tears
//! down the connection or leaks into other rooms.

use log::warn;
use std::sync::Arc;

use crate::core::events::ClientEvent;
use crate::core::server::SharedServerManager;

pub struct EventHandler {
    server: SharedServerManager,
}

impl EventHandler {
    pub fn new(server: SharedServerManager) -> Self {
        Self { server }
    }

    pub async fn handle_event(&self, connection_id: &str, raw: &str) {
        let event = match serde_json::from_str::<ClientEvent>(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping unparseable frame from {}: {}", connection_id, e);
                return;
            }
        };

        match event {
            ClientEvent::Join {
                room_id,
                username,
                avatar,
            } => {
                self.server
                    .join_room(connection_id, &room_id, username, avatar)
                    .await;
            }
            ClientEvent::Chat {
                room_id,
                text,
                time,
                sender_id,
                username,
            } => {
                self.server
                    .chat(connection_id, &room_id, text, time, sender_id, username)
                    .await;
            }
            ClientEvent::Typing { room_id, username } => {
                Arc::clone(&self.server)
                    .typing(connection_id, &room_id, username)
                    .await;
            }
            ClientEvent::StopTyping { room_id, username } => {
                self.server
                    .stop_typing(connection_id, &room_id, username)
                    .await;
            }
            ClientEvent::CursorMove {
                room_id,
                id,
                x,
                y,
                username,
            } => {
                self.server
                    .cursor_move(connection_id, &room_id, id, x, y, username)
                    .await;
            }
            ClientEvent::RemoveCursor { id } => {
                self.server.remove_cursor(connection_id, id).await;
            }
            ClientEvent::Draw { room_id, segment } => {
                self.server.draw(connection_id, &room_id, segment).await;
            }
            ClientEvent::Clear { room_id } => {
                self.server.clear(connection_id, &room_id).await;
            }
            ClientEvent::CallRequest {
                room_id,
                caller_id,
                caller_name,
                user_to_call,
            } => {
                self.server
                    .call_request(&room_id, &caller_id, &caller_name, &user_to_call)
                    .await;
            }
            ClientEvent::CallAccepted {
                caller_id, signal, ..
            } => {
                self.server
                    .call_accepted(connection_id, &caller_id, signal)
                    .await;
            }
            ClientEvent::CallDeclined { caller_id, .. } => {
                self.server.call_declined(connection_id, &caller_id).await;
            }
            ClientEvent::SendingSignal {
                user_to_signal,
                caller_id,
                signal,
            } => {
                self.server
                    .sending_signal(&user_to_signal, caller_id, signal)
                    .await;
            }
            ClientEvent::ReturningSignal { caller_id, signal } => {
                self.server
                    .returning_signal(connection_id, &caller_id, signal)
                    .await;
            }
            ClientEvent::LeaveVideo { room_id } => {
                self.server.leave_video(connection_id, &room_id).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::server::ServerManager;
    use tokio::sync::mpsc;
    use warp::ws::Message;

    async fn setup() -> (
        EventHandler,
        SharedServerManager,
        mpsc::UnboundedReceiver<Message>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let server: SharedServerManager = Arc::new(ServerManager::new());
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        server.register_connection("a".to_string(), tx_a).await;
        server.register_connection("b".to_string(), tx_b).await;
        (EventHandler::new(server.clone()), server, rx_a, rx_b)
    }

    fn next_json(rx: &mut mpsc::UnboundedReceiver<Message>) -> Option<serde_json::Value> {
        rx.try_recv()
            .ok()
            .map(|m| serde_json::from_str(m.to_str().unwrap()).unwrap())
    }

    #[tokio::test]
    async fn test_join_frame_routes_to_room() {
        let (handler, server, mut rx_a, _rx_b) = setup().await;

        handler
            .handle_event("a", r#"{"type":"join","roomId":"r1","username":"alice"}"#)
            .await;

        assert!(server.members_of("r1").await.contains("a"));
        let seeded = next_json(&mut rx_a).unwrap();
        assert_eq!(seeded["type"], "all-users");
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped() {
        let (handler, server, mut rx_a, mut rx_b) = setup().await;

        handler.handle_event("a", "not json at all").await;
        handler.handle_event("a", r#"{"type":"no-such-event"}"#).await;

        assert_eq!(server.room_count().await, 0);
        assert!(next_json(&mut rx_a).is_none());
        assert!(next_json(&mut rx_b).is_none());
    }

    #[tokio::test]
    async fn test_draw_frame_relays_to_peers() {
        let (handler, _server, mut rx_a, mut rx_b) = setup().await;
        handler
            .handle_event("a", r#"{"type":"join","roomId":"r1"}"#)
            .await;
        handler
            .handle_event("b", r#"{"type":"join","roomId":"r1"}"#)
            .await;
        while next_json(&mut rx_a).is_some() {}
        while next_json(&mut rx_b).is_some() {}

        handler
            .handle_event(
                "a",
                r##"{"type":"draw","roomId":"r1","offsetX":10.0,"offsetY":10.0,"prevX":0.0,"prevY":0.0,"color":"#000","brushSize":3.0}"##,
            )
            .await;

        let draw = next_json(&mut rx_b).unwrap();
        assert_eq!(draw["type"], "draw");
        assert_eq!(draw["color"], "#000");
        assert!(next_json(&mut rx_a).is_none());
    }
}

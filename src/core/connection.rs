//! WebSocket connection state
//! Holds the outbound channel and the participant's declared identity

use log::warn;
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::Message;

use crate::constants::{DEFAULT_AVATAR, DEFAULT_USERNAME};

/// A single participant: transport channel plus identity
pub struct Connection {
    pub id: String,
    pub sender: mpsc::UnboundedSender<Message>,
    /// Display name, defaulted until the first join declares one
    pub username: String,
    /// Avatar URL, defaulted until the first join declares one
    pub avatar: String,
    /// Room the connection currently belongs to, if any
    pub current_room: Option<String>,
}

impl Connection {
    /// Create a new connection with a unique ID
    pub fn new(sender: mpsc::UnboundedSender<Message>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), sender)
    }

    /// Create a connection with a caller-supplied ID
    pub fn with_id(id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            sender,
            username: DEFAULT_USERNAME.to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            current_room: None,
        }
    }

    /// Send a text frame through this connection.
    /// Returns false when the receive side is gone; the event is simply lost.
    pub fn send_text(&self, text: &str) -> bool {
        match self.sender.send(Message::text(text)) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to send message to client {}", self.id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_gets_default_identity() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = Connection::new(tx);
        assert!(!conn.id.is_empty());
        assert_eq!(conn.username, DEFAULT_USERNAME);
        assert_eq!(conn.avatar, DEFAULT_AVATAR);
        assert!(conn.current_room.is_none());
    }

    #[test]
    fn test_send_text_reports_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection::with_id("c1".to_string(), tx);
        assert!(conn.send_text("hello"));
        drop(rx);
        assert!(!conn.send_text("hello again"));
    }
}

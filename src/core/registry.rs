//! Connection registry: identity bookkeeping keyed by connection id
//!
//! The registry is the only owner of `Connection` values. Every other
//! component refers to connections by id and must tolerate a lookup miss.

use std::collections::HashMap;

use tokio::sync::mpsc;
use warp::ws::Message;

use crate::core::connection::Connection;

/// Manages all registered connections and their identities
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Register a new connection with default identity
    pub fn register(&mut self, id: String, sender: mpsc::UnboundedSender<Message>) {
        let connection = Connection::with_id(id.clone(), sender);
        self.connections.insert(id, connection);
    }

    /// Overwrite the declared identity. Joins may repeat; the last one wins.
    pub fn set_identity(&mut self, id: &str, username: String, avatar: String) {
        if let Some(connection) = self.connections.get_mut(id) {
            connection.username = username;
            connection.avatar = avatar;
        }
    }

    /// Record the room a connection currently belongs to
    pub fn set_room(&mut self, id: &str, room_id: Option<String>) {
        if let Some(connection) = self.connections.get_mut(id) {
            connection.current_room = room_id;
        }
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn room_of(&self, id: &str) -> Option<String> {
        self.connections.get(id).and_then(|c| c.current_room.clone())
    }

    /// Remove a connection. Idempotent: teardown may race an explicit leave.
    pub fn unregister(&mut self, id: &str) {
        self.connections.remove(id);
    }

    pub fn count(&self) -> usize {
        self.connections.len()
    }

    /// All registered connections, for broadcast targets
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_USERNAME;

    fn sender() -> mpsc::UnboundedSender<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver leaks into the test; sends just succeed silently.
        std::mem::forget(rx);
        tx
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ConnectionRegistry::new();
        registry.register("c1".to_string(), sender());

        let conn = registry.get("c1").unwrap();
        assert_eq!(conn.username, DEFAULT_USERNAME);
        assert_eq!(registry.count(), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_set_identity_overwrites() {
        let mut registry = ConnectionRegistry::new();
        registry.register("c1".to_string(), sender());

        registry.set_identity("c1", "alice".to_string(), "a.png".to_string());
        registry.set_identity("c1", "alice2".to_string(), "b.png".to_string());

        let conn = registry.get("c1").unwrap();
        assert_eq!(conn.username, "alice2");
        assert_eq!(conn.avatar, "b.png");
    }

    #[test]
    fn test_set_identity_on_unknown_id_is_noop() {
        let mut registry = ConnectionRegistry::new();
        registry.set_identity("ghost", "x".to_string(), "y".to_string());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        registry.register("c1".to_string(), sender());

        registry.unregister("c1");
        registry.unregister("c1");
        assert_eq!(registry.count(), 0);
    }
}

//! Room directory: membership keyed by client-supplied room ids
//!
//! Rooms are created lazily on first join and deleted the instant they
//! empty; an empty room never lingers in the directory.

use std::collections::{HashMap, HashSet};

/// Manages all active rooms and their member sets
#[derive(Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, HashSet<String>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Add a connection to a room, creating the room if absent.
    /// Returns the member count after the join.
    pub fn join(&mut self, room_id: &str, connection_id: &str) -> usize {
        let members = self.rooms.entry(room_id.to_string()).or_default();
        members.insert(connection_id.to_string());
        members.len()
    }

    /// Remove a connection from a room. The room entry is dropped the
    /// moment it empties. Returns the remaining member count, or None
    /// when the room did not exist or the connection was not a member.
    pub fn leave(&mut self, room_id: &str, connection_id: &str) -> Option<usize> {
        let members = self.rooms.get_mut(room_id)?;
        if !members.remove(connection_id) {
            return None;
        }
        let remaining = members.len();
        if remaining == 0 {
            self.rooms.remove(room_id);
        }
        Some(remaining)
    }

    /// Member ids of a room; empty when the room does not exist
    pub fn members_of(&self, room_id: &str) -> HashSet<String> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    /// Iterate members without cloning, for fan-out
    pub fn members_iter(&self, room_id: &str) -> impl Iterator<Item = &String> {
        self.rooms.get(room_id).into_iter().flatten()
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map(|m| m.len()).unwrap_or(0)
    }

    pub fn contains(&self, room_id: &str, connection_id: &str) -> bool {
        self.rooms
            .get(room_id)
            .map(|m| m.contains(connection_id))
            .unwrap_or(false)
    }

    pub fn room_exists(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_creates_room_lazily() {
        let mut directory = RoomDirectory::new();
        assert!(!directory.room_exists("r1"));

        assert_eq!(directory.join("r1", "a"), 1);
        assert_eq!(directory.join("r1", "b"), 2);
        assert!(directory.room_exists("r1"));
        assert_eq!(directory.member_count("r1"), 2);
    }

    #[test]
    fn test_join_is_idempotent_per_member() {
        let mut directory = RoomDirectory::new();
        directory.join("r1", "a");
        assert_eq!(directory.join("r1", "a"), 1);
    }

    #[test]
    fn test_room_deleted_when_last_member_leaves() {
        let mut directory = RoomDirectory::new();
        directory.join("r3", "d");

        assert_eq!(directory.leave("r3", "d"), Some(0));
        assert!(!directory.room_exists("r3"));
        assert!(directory.members_of("r3").is_empty());
        assert_eq!(directory.room_count(), 0);
    }

    #[test]
    fn test_room_survives_partial_leave() {
        let mut directory = RoomDirectory::new();
        directory.join("r2", "a");
        directory.join("r2", "b");
        directory.join("r2", "c");

        assert_eq!(directory.leave("r2", "a"), Some(2));
        assert!(directory.room_exists("r2"));
        assert!(!directory.contains("r2", "a"));
        assert!(directory.contains("r2", "b"));
    }

    #[test]
    fn test_leave_unknown_room_or_member_is_none() {
        let mut directory = RoomDirectory::new();
        assert_eq!(directory.leave("nope", "a"), None);

        directory.join("r1", "a");
        assert_eq!(directory.leave("r1", "b"), None);
        assert!(directory.room_exists("r1"));
    }

    #[test]
    fn test_members_of_missing_room_is_empty_set() {
        let directory = RoomDirectory::new();
        assert!(directory.members_of("ghost").is_empty());
        assert_eq!(directory.member_count("ghost"), 0);
    }
}

//! Presence notifications derived from room membership
//!
//! Stateless over the registry and directory: every join/leave recomputes
//! the member count from the directory rather than tracking its own.

use crate::core::events::{PeerInfo, ServerEvent};
use crate::core::registry::ConnectionRegistry;
use crate::core::relay::{relay, RelayTarget};
use crate::core::room::RoomDirectory;

/// Emit the current member count to the whole room, joiner included
pub fn broadcast_member_count(
    registry: &ConnectionRegistry,
    rooms: &RoomDirectory,
    room_id: &str,
) {
    let count = rooms.member_count(room_id);
    relay(
        registry,
        rooms,
        &ServerEvent::UserCount { count },
        RelayTarget::Room {
            room_id,
            exclude: None,
        },
    );
}

/// Announce a new member to everyone already in the room
pub fn announce_join(
    registry: &ConnectionRegistry,
    rooms: &RoomDirectory,
    room_id: &str,
    joiner: &PeerInfo,
) {
    relay(
        registry,
        rooms,
        &ServerEvent::UserJoined {
            id: joiner.id.clone(),
            username: joiner.username.clone(),
            avatar: joiner.avatar.clone(),
        },
        RelayTarget::Room {
            room_id,
            exclude: Some(&joiner.id),
        },
    );
}

/// Tell remaining members that a connection is gone, so they can drop any
/// cursor overlays or call state keyed by its id
pub fn announce_departure(
    registry: &ConnectionRegistry,
    rooms: &RoomDirectory,
    room_id: &str,
    connection_id: &str,
) {
    broadcast_member_count(registry, rooms, room_id);
    relay(
        registry,
        rooms,
        &ServerEvent::UserDisconnected {
            id: connection_id.to_string(),
        },
        RelayTarget::Room {
            room_id,
            exclude: None,
        },
    );
}

//! Fire-and-forget event fan-out
//!
//! Delivery is at-most-once: no acknowledgment, no retry, no buffering for
//! absent targets. Sends are synchronous pushes onto unbounded channels, so
//! two events from the same sender to the same receiver arrive in send order.

use log::{trace, warn};

use crate::core::events::ServerEvent;
use crate::core::registry::ConnectionRegistry;
use crate::core::room::RoomDirectory;

/// Where a relayed event goes
#[derive(Debug, Clone, Copy)]
pub enum RelayTarget<'a> {
    /// Every current member of a room, optionally excluding one connection
    Room {
        room_id: &'a str,
        exclude: Option<&'a str>,
    },
    /// One connection; silently dropped when it is not registered
    Single(&'a str),
    /// Every registered connection, optionally excluding one
    Broadcast { exclude: Option<&'a str> },
}

/// Deliver an event to the target set. Returns the number of successful sends.
pub fn relay(
    registry: &ConnectionRegistry,
    rooms: &RoomDirectory,
    event: &ServerEvent,
    target: RelayTarget<'_>,
) -> usize {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize event for relay: {}", e);
            return 0;
        }
    };

    let sent = match target {
        RelayTarget::Room { room_id, exclude } => {
            let mut sent = 0;
            for member_id in rooms.members_iter(room_id) {
                if exclude == Some(member_id.as_str()) {
                    continue;
                }
                if let Some(connection) = registry.get(member_id) {
                    if connection.send_text(&text) {
                        sent += 1;
                    }
                }
            }
            trace!("Relayed event to {} members of room {}", sent, room_id);
            sent
        }
        RelayTarget::Single(connection_id) => match registry.get(connection_id) {
            Some(connection) => connection.send_text(&text) as usize,
            None => {
                trace!("Dropped event for unknown connection {}", connection_id);
                0
            }
        },
        RelayTarget::Broadcast { exclude } => {
            let mut sent = 0;
            for connection in registry.connections() {
                if exclude == Some(connection.id.as_str()) {
                    continue;
                }
                if connection.send_text(&text) {
                    sent += 1;
                }
            }
            sent
        }
    };

    sent
}

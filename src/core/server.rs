//! Integrated server manager that coordinates connections, rooms and calls
//!
//! Registry and directory share one coarse lock so a join's read-modify-write
//! and its identity snapshot form a single critical section. Lock order is
//! always state before calls; the typing timer map stands alone.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use warp::ws::Message as WsMessage;

use crate::constants::{DEFAULT_AVATAR, DEFAULT_TYPING_WINDOW_MS, DEFAULT_USERNAME};
use crate::core::call::{CallCoordinator, CallState};
use crate::core::events::{DrawSegment, PeerInfo, ServerEvent};
use crate::core::presence;
use crate::core::registry::ConnectionRegistry;
use crate::core::relay::{relay, RelayTarget};
use crate::core::room::RoomDirectory;

struct CoordinatorState {
    registry: ConnectionRegistry,
    rooms: RoomDirectory,
}

/// Owns all shared session state; every operation goes through here
pub struct ServerManager {
    state: RwLock<CoordinatorState>,
    calls: Mutex<CallCoordinator>,
    typing_timers: Mutex<HashMap<String, JoinHandle<()>>>,
    typing_window: Duration,
}

// Shared reference to the server manager
pub type SharedServerManager = Arc<ServerManager>;

impl Default for ServerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerManager {
    pub fn new() -> Self {
        Self::with_typing_window(Duration::from_millis(DEFAULT_TYPING_WINDOW_MS))
    }

    pub fn with_typing_window(typing_window: Duration) -> Self {
        Self {
            state: RwLock::new(CoordinatorState {
                registry: ConnectionRegistry::new(),
                rooms: RoomDirectory::new(),
            }),
            calls: Mutex::new(CallCoordinator::new()),
            typing_timers: Mutex::new(HashMap::new()),
            typing_window,
        }
    }

    /// Register a freshly connected client
    pub async fn register_connection(
        &self,
        connection_id: String,
        sender: mpsc::UnboundedSender<WsMessage>,
    ) {
        let mut state = self.state.write().await;
        state.registry.register(connection_id, sender);
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.registry.count()
    }

    /// Join a room. Missing identity fields fall back to defaults; a join is
    /// never rejected. Returns the identities of everyone already there,
    /// which is also what gets relayed back to the joiner as `all-users`.
    pub async fn join_room(
        &self,
        connection_id: &str,
        room_id: &str,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Vec<PeerInfo> {
        let username = username
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let avatar = avatar
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

        let mut state = self.state.write().await;

        // Moving to a different room counts as leaving the old one
        if let Some(previous) = state.registry.room_of(connection_id) {
            if previous != room_id {
                if let Some(remaining) = state.rooms.leave(&previous, connection_id) {
                    if remaining > 0 {
                        presence::announce_departure(
                            &state.registry,
                            &state.rooms,
                            &previous,
                            connection_id,
                        );
                    }
                }
            }
        }

        state
            .registry
            .set_identity(connection_id, username.clone(), avatar.clone());
        state
            .registry
            .set_room(connection_id, Some(room_id.to_string()));
        state.rooms.join(room_id, connection_id);

        let others: Vec<PeerInfo> = state
            .rooms
            .members_iter(room_id)
            .filter(|id| id.as_str() != connection_id)
            .filter_map(|id| state.registry.get(id))
            .map(|c| PeerInfo {
                id: c.id.clone(),
                username: c.username.clone(),
                avatar: c.avatar.clone(),
            })
            .collect();

        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::AllUsers {
                users: others.clone(),
            },
            RelayTarget::Single(connection_id),
        );

        let joiner = PeerInfo {
            id: connection_id.to_string(),
            username,
            avatar,
        };
        presence::announce_join(&state.registry, &state.rooms, room_id, &joiner);
        presence::broadcast_member_count(&state.registry, &state.rooms, room_id);

        info!(
            "{} ({}) joined room {}",
            joiner.username, connection_id, room_id
        );
        others
    }

    /// Chat goes back to the whole room, sender included. The username falls
    /// back to the registry's record, then to a generic placeholder.
    pub async fn chat(
        &self,
        connection_id: &str,
        room_id: &str,
        text: String,
        time: Option<String>,
        sender_id: String,
        username: Option<String>,
    ) {
        let state = self.state.read().await;
        let username = username
            .filter(|u| !u.is_empty())
            .or_else(|| state.registry.get(connection_id).map(|c| c.username.clone()))
            .unwrap_or_else(|| "User".to_string());
        let time = time.unwrap_or_else(|| Utc::now().to_rfc3339());

        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::Chat {
                text,
                time,
                sender_id,
                username,
            },
            RelayTarget::Room {
                room_id,
                exclude: None,
            },
        );
    }

    /// Relay a typing indicator and arm the watchdog that retracts it if the
    /// client never follows up within the window.
    pub async fn typing(
        self: Arc<Self>,
        connection_id: &str,
        room_id: &str,
        username: Option<String>,
    ) {
        let username = {
            let state = self.state.read().await;
            let username = self.resolve_username(&state.registry, connection_id, username);
            relay(
                &state.registry,
                &state.rooms,
                &ServerEvent::Typing {
                    username: username.clone(),
                },
                RelayTarget::Room {
                    room_id,
                    exclude: Some(connection_id),
                },
            );
            username
        };

        let manager = Arc::clone(&self);
        let window = self.typing_window;
        let id = connection_id.to_string();
        let room = room_id.to_string();
        let name = username.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            manager.expire_typing(&id, &room, &name).await;
        });

        // Re-arming replaces and cancels any earlier timer
        let mut timers = self.typing_timers.lock().await;
        if let Some(previous) = timers.insert(connection_id.to_string(), handle) {
            previous.abort();
        }
    }

    pub async fn stop_typing(
        &self,
        connection_id: &str,
        room_id: &str,
        username: Option<String>,
    ) {
        if let Some(handle) = self.typing_timers.lock().await.remove(connection_id) {
            handle.abort();
        }

        let state = self.state.read().await;
        let username = self.resolve_username(&state.registry, connection_id, username);
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::StopTyping { username },
            RelayTarget::Room {
                room_id,
                exclude: Some(connection_id),
            },
        );
    }

    async fn expire_typing(&self, connection_id: &str, room_id: &str, username: &str) {
        self.typing_timers.lock().await.remove(connection_id);

        let state = self.state.read().await;
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::StopTyping {
                username: username.to_string(),
            },
            RelayTarget::Room {
                room_id,
                exclude: Some(connection_id),
            },
        );
    }

    pub async fn cursor_move(
        &self,
        connection_id: &str,
        room_id: &str,
        cursor_id: String,
        x: f64,
        y: f64,
        username: Option<String>,
    ) {
        let state = self.state.read().await;
        let username = self.resolve_username(&state.registry, connection_id, username);
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::CursorMove {
                id: cursor_id,
                x,
                y,
                username,
            },
            RelayTarget::Room {
                room_id,
                exclude: Some(connection_id),
            },
        );
    }

    /// Cursor overlays may outlive room membership on remote screens, so
    /// removal goes to everyone rather than just the sender's room.
    pub async fn remove_cursor(&self, connection_id: &str, cursor_id: String) {
        let state = self.state.read().await;
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::RemoveCursor { id: cursor_id },
            RelayTarget::Broadcast {
                exclude: Some(connection_id),
            },
        );
    }

    pub async fn draw(&self, connection_id: &str, room_id: &str, segment: DrawSegment) {
        let state = self.state.read().await;
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::Draw { segment },
            RelayTarget::Room {
                room_id,
                exclude: Some(connection_id),
            },
        );
    }

    pub async fn clear(&self, connection_id: &str, room_id: &str) {
        let state = self.state.read().await;
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::Clear,
            RelayTarget::Room {
                room_id,
                exclude: Some(connection_id),
            },
        );
    }

    /// Start a call. The room claim is checked: a request for a callee that
    /// is not in the claimed room is dropped without a reply, and the caller
    /// recovers on its own. A request involving a peer with a live session
    /// supersedes it; the displaced side hears `call-ended`.
    pub async fn call_request(
        &self,
        room_id: &str,
        caller_id: &str,
        caller_name: &str,
        user_to_call: &str,
    ) {
        let state = self.state.read().await;
        if !state.rooms.contains(room_id, user_to_call) {
            warn!(
                "Call request dropped: {} is not a member of room {}",
                user_to_call, room_id
            );
            return;
        }

        let displaced = self.calls.lock().await.request(caller_id, user_to_call);
        for peer in &displaced {
            relay(
                &state.registry,
                &state.rooms,
                &ServerEvent::CallEnded,
                RelayTarget::Single(peer),
            );
        }

        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::CallRequest {
                caller_id: caller_id.to_string(),
                caller_name: caller_name.to_string(),
            },
            RelayTarget::Single(user_to_call),
        );
    }

    pub async fn call_accepted(&self, connection_id: &str, caller_id: &str, signal: Value) {
        let state = self.state.read().await;
        if !self.calls.lock().await.accept(connection_id, caller_id) {
            warn!(
                "Stale call accept from {} for caller {}",
                connection_id, caller_id
            );
            return;
        }

        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::CallAccepted {
                caller_id: caller_id.to_string(),
                signal,
            },
            RelayTarget::Single(caller_id),
        );
    }

    pub async fn call_declined(&self, connection_id: &str, caller_id: &str) {
        let state = self.state.read().await;
        if !self.calls.lock().await.decline(connection_id, caller_id) {
            warn!(
                "Stale call decline from {} for caller {}",
                connection_id, caller_id
            );
            return;
        }

        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::CallDeclined {
                caller_id: caller_id.to_string(),
            },
            RelayTarget::Single(caller_id),
        );
    }

    /// Opaque offer payload, caller to callee; no state transition
    pub async fn sending_signal(&self, user_to_signal: &str, caller_id: String, signal: Value) {
        let state = self.state.read().await;
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::UserSignal { signal, caller_id },
            RelayTarget::Single(user_to_signal),
        );
    }

    /// Opaque answer payload, callee back to caller; no state transition
    pub async fn returning_signal(&self, connection_id: &str, caller_id: &str, signal: Value) {
        let state = self.state.read().await;
        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::ReceivingReturnedSignal {
                signal,
                id: connection_id.to_string(),
            },
            RelayTarget::Single(caller_id),
        );
    }

    /// Hang up: every session involving the connection ends, the room hears
    /// `call-ended`, and any displaced peer outside the room is told directly
    pub async fn leave_video(&self, connection_id: &str, room_id: &str) {
        let state = self.state.read().await;
        let peers = self.calls.lock().await.end_involving(connection_id);

        relay(
            &state.registry,
            &state.rooms,
            &ServerEvent::CallEnded,
            RelayTarget::Room {
                room_id,
                exclude: Some(connection_id),
            },
        );

        for peer in peers {
            if !state.rooms.contains(room_id, &peer) {
                relay(
                    &state.registry,
                    &state.rooms,
                    &ServerEvent::CallEnded,
                    RelayTarget::Single(&peer),
                );
            }
        }
    }

    /// Transport teardown. Invoked exactly once per connection; safe even
    /// when the connection never joined a room or placed a call.
    pub async fn disconnect(&self, connection_id: &str) {
        if let Some(handle) = self.typing_timers.lock().await.remove(connection_id) {
            handle.abort();
        }

        let mut state = self.state.write().await;
        let mut calls = self.calls.lock().await;

        if let Some(room_id) = state.registry.room_of(connection_id) {
            if let Some(remaining) = state.rooms.leave(&room_id, connection_id) {
                if remaining > 0 {
                    presence::announce_departure(
                        &state.registry,
                        &state.rooms,
                        &room_id,
                        connection_id,
                    );
                } else {
                    info!("Room {} is now empty, deleting", room_id);
                }
            }
        }

        for peer in calls.end_involving(connection_id) {
            relay(
                &state.registry,
                &state.rooms,
                &ServerEvent::CallEnded,
                RelayTarget::Single(&peer),
            );
        }

        state.registry.unregister(connection_id);
        info!("Client disconnected: {}", connection_id);
    }

    fn resolve_username(
        &self,
        registry: &ConnectionRegistry,
        connection_id: &str,
        claimed: Option<String>,
    ) -> String {
        claimed
            .filter(|u| !u.is_empty())
            .or_else(|| registry.get(connection_id).map(|c| c.username.clone()))
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
    }

    // Introspection used by tests and the health surface

    pub async fn members_of(&self, room_id: &str) -> HashSet<String> {
        self.state.read().await.rooms.members_of(room_id)
    }

    pub async fn room_exists(&self, room_id: &str) -> bool {
        self.state.read().await.rooms.room_exists(room_id)
    }

    pub async fn room_count(&self) -> usize {
        self.state.read().await.rooms.room_count()
    }

    pub async fn call_state(&self, a: &str, b: &str) -> Option<CallState> {
        self.calls.lock().await.state_of(a, b)
    }
}

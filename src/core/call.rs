//! Call signaling state machine
//!
//! Tracks at most one session per unordered peer pair. The coordinator
//! never inspects negotiation payloads; it only sequences the
//! request/accept/decline/end protocol around the relay.

use std::collections::HashMap;

/// Lifecycle of a two-party call session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Caller sent a request and is waiting on the callee
    Requested,
    /// Callee accepted; peers now exchange opaque signals through the relay
    Active,
}

/// The same two peers map to the same key regardless of who dialed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey(String, String);

impl PairKey {
    fn new(a: &str, b: &str) -> Self {
        if a <= b {
            PairKey(a.to_string(), b.to_string())
        } else {
            PairKey(b.to_string(), a.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallSession {
    pub caller_id: String,
    pub callee_id: String,
    pub state: CallState,
}

impl CallSession {
    fn peer_of(&self, connection_id: &str) -> &str {
        if self.caller_id == connection_id {
            &self.callee_id
        } else {
            &self.caller_id
        }
    }
}

/// Per-pair call session tracking
#[derive(Default)]
pub struct CallCoordinator {
    sessions: HashMap<PairKey, CallSession>,
}

impl CallCoordinator {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Register a new REQUESTED session. A live session involving either
    /// peer is superseded; the displaced counterparts (neither the caller
    /// nor the callee themselves) are returned so the server can tell them
    /// their call is over.
    pub fn request(&mut self, caller_id: &str, callee_id: &str) -> Vec<String> {
        let mut displaced = Vec::new();
        for participant in [caller_id, callee_id] {
            for peer in self.end_involving(participant) {
                if peer != caller_id && peer != callee_id && !displaced.contains(&peer) {
                    displaced.push(peer);
                }
            }
        }

        self.sessions.insert(
            PairKey::new(caller_id, callee_id),
            CallSession {
                caller_id: caller_id.to_string(),
                callee_id: callee_id.to_string(),
                state: CallState::Requested,
            },
        );

        displaced
    }

    /// REQUESTED -> ACTIVE. Returns false for a stale accept (no session,
    /// or the accepting side is not the callee of record).
    pub fn accept(&mut self, callee_id: &str, caller_id: &str) -> bool {
        let key = PairKey::new(callee_id, caller_id);
        match self.sessions.get_mut(&key) {
            Some(session)
                if session.state == CallState::Requested && session.callee_id == callee_id =>
            {
                session.state = CallState::Active;
                true
            }
            _ => false,
        }
    }

    /// Discard the session entirely; a later request between the same pair
    /// starts clean. Returns false when there was nothing to decline.
    pub fn decline(&mut self, callee_id: &str, caller_id: &str) -> bool {
        self.sessions
            .remove(&PairKey::new(callee_id, caller_id))
            .is_some()
    }

    /// End every session involving the connection, returning the peer ids
    /// left hanging
    pub fn end_involving(&mut self, connection_id: &str) -> Vec<String> {
        let keys: Vec<PairKey> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.caller_id == connection_id || s.callee_id == connection_id)
            .map(|(k, _)| k.clone())
            .collect();

        let mut peers = Vec::new();
        for key in keys {
            if let Some(session) = self.sessions.remove(&key) {
                peers.push(session.peer_of(connection_id).to_string());
            }
        }
        peers
    }

    pub fn state_of(&self, a: &str, b: &str) -> Option<CallState> {
        self.sessions.get(&PairKey::new(a, b)).map(|s| s.state)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

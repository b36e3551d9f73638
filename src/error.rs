use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SketchRelayError {
    // Connection errors
    ConnectionNotFound(String),
    ConnectionClosed,

    // Room errors
    PeerNotInRoom { peer_id: String, room_id: String },

    // Message errors
    MessageParseError(String),

    // Configuration errors
    ConfigError(String),
}

impl fmt::Display for SketchRelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionNotFound(id) => write!(f, "Connection not found: {}", id),
            Self::ConnectionClosed => write!(f, "Connection closed unexpectedly"),
            Self::PeerNotInRoom { peer_id, room_id } => {
                write!(f, "Peer {} is not a member of room {}", peer_id, room_id)
            }
            Self::MessageParseError(msg) => write!(f, "Message parse error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for SketchRelayError {}

// Generic result type for Sketch Relay
pub type Result<T> = std::result::Result<T, SketchRelayError>;

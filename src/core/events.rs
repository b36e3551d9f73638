//! Wire vocabulary for the collaborative canvas protocol
//!
//! Every frame is a JSON object tagged by `type`. Field names follow the
//! client protocol exactly (camelCase, `callerID`, `userToCall`, ...), so
//! the serde renames below are load-bearing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity snapshot used to seed a joiner's peer list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: String,
    pub username: String,
    pub avatar: String,
}

/// One freehand stroke segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSegment {
    pub offset_x: f64,
    pub offset_y: f64,
    pub prev_x: f64,
    pub prev_y: f64,
    pub color: String,
    pub brush_size: f64,
}

/// Client-to-server events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Join a room, optionally declaring a display name and avatar
    #[serde(rename = "join")]
    Join {
        #[serde(rename = "roomId")]
        room_id: String,
        username: Option<String>,
        avatar: Option<String>,
    },

    /// Chat message for the whole room (sender included on the way back)
    #[serde(rename = "chat")]
    Chat {
        #[serde(rename = "roomId")]
        room_id: String,
        text: String,
        time: Option<String>,
        #[serde(rename = "senderId")]
        sender_id: String,
        username: Option<String>,
    },

    #[serde(rename = "typing")]
    Typing {
        #[serde(rename = "roomId")]
        room_id: String,
        username: Option<String>,
    },

    #[serde(rename = "stop-typing")]
    StopTyping {
        #[serde(rename = "roomId")]
        room_id: String,
        username: Option<String>,
    },

    #[serde(rename = "cursor-move")]
    CursorMove {
        #[serde(rename = "roomId")]
        room_id: String,
        id: String,
        x: f64,
        y: f64,
        username: Option<String>,
    },

    /// Drop a cursor overlay everywhere, not just in the sender's room
    #[serde(rename = "remove-cursor")]
    RemoveCursor { id: String },

    #[serde(rename = "draw")]
    Draw {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        segment: DrawSegment,
    },

    #[serde(rename = "clear")]
    Clear {
        #[serde(rename = "roomId")]
        room_id: String,
    },

    /// Ask a room member for a call; the coordinator verifies the room claim
    #[serde(rename = "call-request")]
    CallRequest {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "callerID")]
        caller_id: String,
        #[serde(rename = "callerName")]
        caller_name: String,
        #[serde(rename = "userToCall")]
        user_to_call: String,
    },

    #[serde(rename = "call-accepted")]
    CallAccepted {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "callerID")]
        caller_id: String,
        signal: Value,
    },

    #[serde(rename = "call-declined")]
    CallDeclined {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "callerID")]
        caller_id: String,
    },

    /// Opaque negotiation payload, caller to callee
    #[serde(rename = "sending-signal")]
    SendingSignal {
        #[serde(rename = "userToSignal")]
        user_to_signal: String,
        #[serde(rename = "callerID")]
        caller_id: String,
        signal: Value,
    },

    /// Opaque negotiation payload, callee back to caller
    #[serde(rename = "returning-signal")]
    ReturningSignal {
        #[serde(rename = "callerID")]
        caller_id: String,
        signal: Value,
    },

    #[serde(rename = "leave-video")]
    LeaveVideo {
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

/// Server-to-client events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Reply to `join`: everyone already in the room
    #[serde(rename = "all-users")]
    AllUsers { users: Vec<PeerInfo> },

    #[serde(rename = "user-joined")]
    UserJoined {
        id: String,
        username: String,
        avatar: String,
    },

    #[serde(rename = "user-count")]
    UserCount { count: usize },

    #[serde(rename = "user-disconnected")]
    UserDisconnected { id: String },

    #[serde(rename = "chat")]
    Chat {
        text: String,
        time: String,
        #[serde(rename = "senderId")]
        sender_id: String,
        username: String,
    },

    #[serde(rename = "typing")]
    Typing { username: String },

    #[serde(rename = "stop-typing")]
    StopTyping { username: String },

    #[serde(rename = "cursor-move")]
    CursorMove {
        id: String,
        x: f64,
        y: f64,
        username: String,
    },

    #[serde(rename = "remove-cursor")]
    RemoveCursor { id: String },

    #[serde(rename = "draw")]
    Draw {
        #[serde(flatten)]
        segment: DrawSegment,
    },

    #[serde(rename = "clear")]
    Clear,

    #[serde(rename = "call-request")]
    CallRequest {
        #[serde(rename = "callerID")]
        caller_id: String,
        #[serde(rename = "callerName")]
        caller_name: String,
    },

    #[serde(rename = "call-accepted")]
    CallAccepted {
        #[serde(rename = "callerID")]
        caller_id: String,
        signal: Value,
    },

    #[serde(rename = "call-declined")]
    CallDeclined {
        #[serde(rename = "callerID")]
        caller_id: String,
    },

    /// Delivery name for `sending-signal`
    #[serde(rename = "user-signal")]
    UserSignal {
        signal: Value,
        #[serde(rename = "callerID")]
        caller_id: String,
    },

    /// Delivery name for `returning-signal`; `id` is the responder
    #[serde(rename = "receiving-returned-signal")]
    ReceivingReturnedSignal { signal: Value, id: String },

    #[serde(rename = "call-ended")]
    CallEnded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_event_wire_format() {
        let raw = r#"{"type":"join","roomId":"r1","username":"alice","avatar":null}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::Join {
                room_id,
                username,
                avatar,
            } => {
                assert_eq!(room_id, "r1");
                assert_eq!(username.as_deref(), Some("alice"));
                assert!(avatar.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_draw_event_flattens_segment() {
        let raw = r##"{"type":"draw","roomId":"r1","offsetX":10.0,"offsetY":10.0,"prevX":0.0,"prevY":0.0,"color":"#000","brushSize":3.0}"##;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::Draw { room_id, segment } => {
                assert_eq!(room_id, "r1");
                assert_eq!(segment.offset_x, 10.0);
                assert_eq!(segment.color, "#000");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_call_request_uses_original_field_names() {
        let raw = r#"{"type":"call-request","roomId":"r1","callerID":"a","callerName":"Alice","userToCall":"b"}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::CallRequest {
                caller_id,
                user_to_call,
                ..
            } => {
                assert_eq!(caller_id, "a");
                assert_eq!(user_to_call, "b");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_serializes_tag_and_renames() {
        let event = ServerEvent::UserSignal {
            signal: serde_json::json!({"sdp": "offer"}),
            caller_id: "a".to_string(),
        };
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "user-signal");
        assert_eq!(value["callerID"], "a");
    }

    #[test]
    fn test_unit_variant_carries_only_tag() {
        let value: serde_json::Value = serde_json::to_value(&ServerEvent::CallEnded).unwrap();
        assert_eq!(value, serde_json::json!({"type": "call-ended"}));
    }
}

//! Sketch Relay - real-time session coordination for a collaborative canvas
//!
//! This library tracks which connections belong to which room, fans out
//! draw/chat/cursor events to the right subset of connections, and drives
//! the two-party call signaling handshake.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;

// Re-export main components
pub use config::*;
pub use constants::*;

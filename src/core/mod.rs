//! Core session coordination: registry, rooms, relay, presence and calls

pub mod call;
pub mod connection;
pub mod event_handler;
pub mod events;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod room;
pub mod server;

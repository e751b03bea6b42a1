//! Realtime relay modules.
//!
//! - `client`: websocket transport, keepalive, and outbound sender.
//! - `events`: typed dispatch of inbound frames.
//! - `proto`: envelope and payload types shared with the hub.

/// Websocket connection and command sender.
pub mod client;
/// Inbound frame dispatch and the relay event type.
pub mod events;
/// Relay protocol messages.
pub mod proto;

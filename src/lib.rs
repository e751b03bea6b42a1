//! Rust SDK for the CraftHub relay: player statistics over HTTP and a
//! realtime channel that relays chat, join/leave, kill/death, and
//! advancement events between Minecraft servers, Discord bridges, and
//! the hub.
//!
//! The crate is organized by transport surface:
//! - `api`: HTTP client for player statistics, chat logs, and social
//!   metadata; optionally owns a relay connection.
//! - `relay`: realtime websocket client, protocol types, and event
//!   dispatch.

/// Statistics API client and request/response types.
pub mod api;
/// Realtime relay client, protocol types, and event dispatch.
pub mod relay;

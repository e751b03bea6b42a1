//! Typed dispatch of inbound relay frames.
//!
//! Every text frame maps to exactly one [`RelayEvent`], in arrival
//! order. Unknown actions and undecodable frames are surfaced as events
//! of their own rather than dropped.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::relay::proto::{
    ActionTag, AdvancementMsg, DiscordChatMsg, Envelope, MinecraftChatMsg, NewNameMsg, NewUserMsg,
    PlayerDeathMsg, PlayerJoinMsg, PlayerKillMsg, PlayerLeaveMsg, PlayerListMsg,
};

/// Event emitted by the relay connection.
///
/// Payload variants mirror the hub's action tags one-to-one; the
/// remaining variants cover connection lifecycle and the two
/// never-dropped catch-alls.
#[derive(Clone, Debug, PartialEq)]
pub enum RelayEvent {
    /// Transport is open and keepalive has started.
    Open,
    /// Transport closed; the connection will not redial.
    Closed { reason: Option<String> },
    /// Transport-level failure, reported verbatim.
    TransportError(String),
    /// Frame that could not be decoded against the protocol.
    ProtocolError(String),
    MinecraftChat(MinecraftChatMsg),
    DiscordChat(DiscordChatMsg),
    PlayerList(PlayerListMsg),
    Advancement(AdvancementMsg),
    PlayerJoin(PlayerJoinMsg),
    PlayerLeave(PlayerLeaveMsg),
    PlayerKill(PlayerKillMsg),
    PlayerDeath(PlayerDeathMsg),
    NewName(NewNameMsg),
    NewUser(NewUserMsg),
    /// Hub accepted the presented credential.
    KeyAccepted(Value),
    /// Hub-reported error, data carried verbatim.
    HubError(Value),
    /// Action outside the closed tag set; the full envelope is kept.
    Unknown(Envelope),
}

/// Maps one inbound text frame to its event.
pub fn dispatch(frame: &str) -> RelayEvent {
    let envelope = match Envelope::from_text(frame) {
        Ok(envelope) => envelope,
        Err(err) => return RelayEvent::ProtocolError(format!("malformed frame: {err}")),
    };

    let Some(tag) = ActionTag::from_wire(&envelope.action) else {
        return RelayEvent::Unknown(envelope);
    };

    match tag {
        ActionTag::InboundMinecraftChat => payload(envelope, RelayEvent::MinecraftChat),
        ActionTag::InboundDiscordChat => payload(envelope, RelayEvent::DiscordChat),
        ActionTag::SendUpdatePlayerList => payload(envelope, RelayEvent::PlayerList),
        ActionTag::MinecraftAdvancement => payload(envelope, RelayEvent::Advancement),
        ActionTag::MinecraftPlayerJoin => payload(envelope, RelayEvent::PlayerJoin),
        ActionTag::MinecraftPlayerLeave => payload(envelope, RelayEvent::PlayerLeave),
        ActionTag::MinecraftPlayerKill => payload(envelope, RelayEvent::PlayerKill),
        ActionTag::MinecraftPlayerDeath => payload(envelope, RelayEvent::PlayerDeath),
        ActionTag::NewName => payload(envelope, RelayEvent::NewName),
        ActionTag::NewUser => payload(envelope, RelayEvent::NewUser),
        ActionTag::Error => RelayEvent::HubError(envelope.data),
        ActionTag::KeyAccepted => RelayEvent::KeyAccepted(envelope.data),
    }
}

fn payload<T, F>(envelope: Envelope, into: F) -> RelayEvent
where
    T: DeserializeOwned,
    F: FnOnce(T) -> RelayEvent,
{
    match serde_json::from_value(envelope.data) {
        Ok(decoded) => into(decoded),
        Err(err) => RelayEvent::ProtocolError(format!(
            "bad `{}` payload: {err}",
            envelope.action
        )),
    }
}

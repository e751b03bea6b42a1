use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action tags understood by the hub relay protocol.
///
/// The set is closed: a frame whose `action` is not listed here is
/// surfaced through the unknown-message path, never dropped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ActionTag {
    InboundMinecraftChat,
    InboundDiscordChat,
    SendUpdatePlayerList,
    MinecraftAdvancement,
    MinecraftPlayerJoin,
    MinecraftPlayerLeave,
    MinecraftPlayerKill,
    MinecraftPlayerDeath,
    NewName,
    NewUser,
    Error,
    KeyAccepted,
}

impl ActionTag {
    /// Every tag in the closed set.
    pub const ALL: [ActionTag; 12] = [
        ActionTag::InboundMinecraftChat,
        ActionTag::InboundDiscordChat,
        ActionTag::SendUpdatePlayerList,
        ActionTag::MinecraftAdvancement,
        ActionTag::MinecraftPlayerJoin,
        ActionTag::MinecraftPlayerLeave,
        ActionTag::MinecraftPlayerKill,
        ActionTag::MinecraftPlayerDeath,
        ActionTag::NewName,
        ActionTag::NewUser,
        ActionTag::Error,
        ActionTag::KeyAccepted,
    ];

    /// Wire spelling of the tag.
    pub fn as_wire(&self) -> &'static str {
        match self {
            ActionTag::InboundMinecraftChat => "inbound_minecraft_chat",
            ActionTag::InboundDiscordChat => "inbound_discord_chat",
            ActionTag::SendUpdatePlayerList => "send_update_player_list",
            ActionTag::MinecraftAdvancement => "minecraft_advancement",
            ActionTag::MinecraftPlayerJoin => "minecraft_player_join",
            ActionTag::MinecraftPlayerLeave => "minecraft_player_leave",
            ActionTag::MinecraftPlayerKill => "minecraft_player_kill",
            ActionTag::MinecraftPlayerDeath => "minecraft_player_death",
            ActionTag::NewName => "new_name",
            ActionTag::NewUser => "new_user",
            ActionTag::Error => "error",
            ActionTag::KeyAccepted => "key-accepted",
        }
    }

    /// Resolves a wire spelling back to a tag, `None` for unknown actions.
    pub fn from_wire(action: &str) -> Option<ActionTag> {
        ActionTag::ALL.iter().copied().find(|tag| tag.as_wire() == action)
    }
}

/// Raw relay frame: `{"action": <tag>, "data": <payload>}`.
///
/// `data` stays opaque here; pairing it with a payload type happens at
/// the dispatch site keyed on `action`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Envelope {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MinecraftChatMsg {
    pub name: String,
    pub message: String,
    pub date: String,
    pub mc_server: String,
    pub uuid: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DiscordChatMsg {
    pub message: String,
    pub username: String,
    pub timestamp: String,
    pub mc_server: String,
    pub channel_id: String,
    pub guild_id: String,
    pub guild_name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AdvancementMsg {
    pub username: String,
    pub advancement: String,
    pub time: i64,
    pub mc_server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub uuid: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerJoinMsg {
    pub username: String,
    pub uuid: String,
    pub timestamp: String,
    pub server: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerLeaveMsg {
    pub username: String,
    pub uuid: String,
    pub timestamp: String,
    pub server: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerKillMsg {
    pub username: String,
    pub uuid: String,
    pub timestamp: String,
    pub server: String,
}

/// Discriminates environment deaths from player-versus-player deaths.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathKind {
    Pve,
    Pvp,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerDeathMsg {
    pub victim: String,
    pub death_message: String,
    /// Killer username, present on pvp deaths only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub murderer: Option<String>,
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: DeathKind,
    pub mc_server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "victimUUID")]
    pub victim_uuid: String,
    #[serde(rename = "murdererUUID", default, skip_serializing_if = "Option::is_none")]
    pub murderer_uuid: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerEntryMsg {
    pub username: String,
    pub uuid: String,
    pub latency: u32,
    pub server: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerListMsg {
    pub players: Vec<PlayerEntryMsg>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NewNameMsg {
    pub old_name: String,
    pub new_name: String,
    pub server: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NewUserMsg {
    pub user: String,
    pub server: String,
}

/// Messages the client publishes to the hub.
///
/// There is intentionally no kill variant: kill events arrive inbound
/// only, relayed by the hub.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    InboundMinecraftChat(MinecraftChatMsg),
    InboundDiscordChat(DiscordChatMsg),
    SendUpdatePlayerList(PlayerListMsg),
    MinecraftAdvancement(AdvancementMsg),
    MinecraftPlayerJoin(PlayerJoinMsg),
    MinecraftPlayerLeave(PlayerLeaveMsg),
    MinecraftPlayerDeath(PlayerDeathMsg),
}

impl OutboundMessage {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Wire tag this message serializes under.
    pub fn action(&self) -> ActionTag {
        match self {
            OutboundMessage::InboundMinecraftChat(_) => ActionTag::InboundMinecraftChat,
            OutboundMessage::InboundDiscordChat(_) => ActionTag::InboundDiscordChat,
            OutboundMessage::SendUpdatePlayerList(_) => ActionTag::SendUpdatePlayerList,
            OutboundMessage::MinecraftAdvancement(_) => ActionTag::MinecraftAdvancement,
            OutboundMessage::MinecraftPlayerJoin(_) => ActionTag::MinecraftPlayerJoin,
            OutboundMessage::MinecraftPlayerLeave(_) => ActionTag::MinecraftPlayerLeave,
            OutboundMessage::MinecraftPlayerDeath(_) => ActionTag::MinecraftPlayerDeath,
        }
    }
}

impl Envelope {
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn chat() -> MinecraftChatMsg {
        MinecraftChatMsg {
            name: "Steve".to_string(),
            message: "hello over there".to_string(),
            date: "2024-03-01T12:00:00Z".to_string(),
            mc_server: "survival".to_string(),
            uuid: "069a79f4-44e9-4726-a5be-fca90e38aaf5".to_string(),
        }
    }

    fn round_trip<T>(value: T)
    where
        T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
    {
        let encoded = serde_json::to_string(&value).expect("serialize");
        let decoded: T = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(value, decoded);
    }

    #[test]
    fn action_tags_round_trip_through_wire_spelling() {
        for tag in ActionTag::ALL {
            assert_eq!(ActionTag::from_wire(tag.as_wire()), Some(tag));
        }
        assert_eq!(ActionTag::KeyAccepted.as_wire(), "key-accepted");
        assert_eq!(ActionTag::from_wire("minecraft_chat"), None);
    }

    #[test]
    fn outbound_envelope_carries_action_and_data_fields_only() {
        let message = OutboundMessage::InboundMinecraftChat(chat());
        let value = serde_json::to_value(&message).expect("serialize");

        assert_eq!(
            value.get("action").and_then(Value::as_str),
            Some("inbound_minecraft_chat")
        );
        assert_eq!(
            value.pointer("/data/mc_server").and_then(Value::as_str),
            Some("survival")
        );
        assert!(
            value.get("client_id").is_none(),
            "header-based identity carries no client_id field"
        );
        assert_eq!(value.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn outbound_variants_serialize_under_their_closed_set_tag() {
        let join = PlayerJoinMsg {
            username: "Steve".to_string(),
            uuid: "u-1".to_string(),
            timestamp: "t".to_string(),
            server: "survival".to_string(),
        };

        let messages = vec![
            OutboundMessage::InboundMinecraftChat(chat()),
            OutboundMessage::SendUpdatePlayerList(PlayerListMsg { players: vec![] }),
            OutboundMessage::MinecraftPlayerJoin(join.clone()),
            OutboundMessage::MinecraftPlayerLeave(PlayerLeaveMsg {
                username: join.username.clone(),
                uuid: join.uuid.clone(),
                timestamp: join.timestamp.clone(),
                server: join.server.clone(),
            }),
        ];

        for message in messages {
            let value = serde_json::to_value(&message).expect("serialize");
            assert_eq!(
                value.get("action").and_then(Value::as_str),
                Some(message.action().as_wire())
            );
        }
    }

    #[test]
    fn pve_death_omits_killer_fields() {
        let death = PlayerDeathMsg {
            victim: "Steve".to_string(),
            death_message: "Steve fell from a high place".to_string(),
            murderer: None,
            time: 1_700_000_000,
            kind: DeathKind::Pve,
            mc_server: "survival".to_string(),
            id: None,
            victim_uuid: "u-1".to_string(),
            murderer_uuid: None,
        };

        let value = serde_json::to_value(&death).expect("serialize");
        assert_eq!(value.get("type").and_then(Value::as_str), Some("pve"));
        assert!(value.get("murderer").is_none());
        assert!(value.get("murdererUUID").is_none());
        assert_eq!(
            value.get("victimUUID").and_then(Value::as_str),
            Some("u-1")
        );
        round_trip(death);
    }

    #[test]
    fn pvp_death_round_trips_killer_identity() {
        let death = PlayerDeathMsg {
            victim: "Steve".to_string(),
            death_message: "Steve was slain by Alex".to_string(),
            murderer: Some("Alex".to_string()),
            time: 1_700_000_000,
            kind: DeathKind::Pvp,
            mc_server: "survival".to_string(),
            id: Some(9),
            victim_uuid: "u-1".to_string(),
            murderer_uuid: Some("u-2".to_string()),
        };

        let value = serde_json::to_value(&death).expect("serialize");
        assert_eq!(value.get("type").and_then(Value::as_str), Some("pvp"));
        assert_eq!(
            value.get("murdererUUID").and_then(Value::as_str),
            Some("u-2")
        );
        round_trip(death);
    }

    #[test]
    fn player_list_wraps_entries_under_players_key() {
        let message = OutboundMessage::SendUpdatePlayerList(PlayerListMsg {
            players: vec![PlayerEntryMsg {
                username: "Steve".to_string(),
                uuid: "u-1".to_string(),
                latency: 42,
                server: "survival".to_string(),
            }],
        });

        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(
            value.pointer("/data/players/0/latency").and_then(Value::as_u64),
            Some(42)
        );
    }

    #[test]
    fn envelope_tolerates_missing_data_field() {
        let envelope = Envelope::from_text(r#"{"action":"key-accepted"}"#).expect("parse");
        assert_eq!(envelope.action, "key-accepted");
        assert_eq!(envelope.data, Value::Null);
    }

    #[test]
    fn envelope_round_trip_preserves_unknown_payloads() {
        let envelope = Envelope {
            action: "totally_new_action".to_string(),
            data: json!({"k": [1, 2, 3]}),
        };
        let encoded = envelope.to_text().expect("encode");
        assert_eq!(Envelope::from_text(&encoded).expect("decode"), envelope);
    }

    #[test]
    fn discord_chat_round_trip() {
        round_trip(DiscordChatMsg {
            message: "hi from discord".to_string(),
            username: "alex#0001".to_string(),
            timestamp: "2024-03-01T12:00:00Z".to_string(),
            mc_server: "survival".to_string(),
            channel_id: "123".to_string(),
            guild_id: "456".to_string(),
            guild_name: "the guild".to_string(),
        });
    }

    #[test]
    fn advancement_id_defaults_to_none_when_absent() {
        let advancement: AdvancementMsg = serde_json::from_value(json!({
            "username": "Steve",
            "advancement": "story/mine_diamond",
            "time": 1_700_000_000,
            "mc_server": "survival",
            "uuid": "u-1"
        }))
        .expect("deserialize");
        assert_eq!(advancement.id, None);
    }
}

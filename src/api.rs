//! HTTP client for the hub's player statistics and social metadata API.
//!
//! Helpers are one-shot request/response mappings. Any failure —
//! connect, non-2xx status, undecodable body — is swallowed into `None`
//! (optionally logged), so callers cannot distinguish "not found" from
//! "unreachable"; that trade-off is part of the API contract. Nothing
//! is retried.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::relay::client::{ClientType, RelayClient, RelayConnection, RelayError, RelaySender};
use crate::relay::events::RelayEvent;

/// Configuration for [`ApiClient::connect`].
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the hub's HTTP API.
    pub api_url: String,
    /// Credential stamped onto every request as `x-api-key`.
    pub api_key: SecretString,
    /// Logical Minecraft server this client acts for.
    pub mc_server: String,
    /// Log swallowed HTTP failures at `warn` level.
    pub log_errors: bool,
    /// When set, a realtime relay connection is opened alongside the
    /// HTTP client.
    pub relay: Option<RelayConfig>,
}

/// Realtime channel options within [`ApiConfig`].
#[derive(Clone)]
pub struct RelayConfig {
    /// Base websocket URL of the hub.
    pub websocket_url: String,
    /// Whether this client bridges a Minecraft server or a Discord bot.
    pub client_type: ClientType,
}

/// Errors surfaced while constructing an [`ApiClient`].
///
/// Request-time failures never use this type; they are contained inside
/// the `Option`-returning helpers.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay channel could not be opened.
    #[error("failed to open relay channel: {0}")]
    Relay(#[from] RelayError),
}

#[derive(Debug, Error)]
enum ApiError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("http status {status}")]
    HttpStatus { status: StatusCode },

    #[error("failed to decode response: {0}")]
    Decode(reqwest::Error),
}

/// Client for the hub API, optionally owning a relay connection.
pub struct ApiClient {
    http: Client,
    api_url: String,
    api_key: SecretString,
    mc_server: String,
    log_errors: bool,
    relay: Option<RelayConnection>,
}

impl ApiClient {
    /// Builds the HTTP client and, when configured, opens the relay
    /// channel in the same step.
    pub async fn connect(config: ApiConfig) -> Result<Self, ApiClientError> {
        let http = Client::builder().build().map_err(ApiClientError::Http)?;

        let relay = match &config.relay {
            Some(relay_config) => {
                let client = RelayClient::new(
                    relay_config.websocket_url.clone(),
                    config.api_key.clone(),
                    config.mc_server.clone(),
                    relay_config.client_type,
                );
                Some(client.connect().await?)
            }
            None => None,
        };

        Ok(Self {
            http,
            api_url: config.api_url.trim_end().to_string(),
            api_key: config.api_key,
            mc_server: config.mc_server,
            log_errors: config.log_errors,
            relay,
        })
    }

    /// Logical Minecraft server this client acts for.
    pub fn mc_server(&self) -> &str {
        &self.mc_server
    }

    /// Receives the next relay event; `None` when no relay is
    /// configured or the stream is drained after close.
    pub async fn recv_event(&mut self) -> Option<RelayEvent> {
        self.relay.as_mut()?.recv().await
    }

    /// Returns an outbound sender for the relay channel, when open.
    pub fn relay_sender(&self) -> Option<RelaySender> {
        self.relay.as_ref().map(RelayConnection::sender)
    }

    /// Whether the relay transport is currently open.
    pub fn is_relay_connected(&self) -> bool {
        self.relay
            .as_ref()
            .is_some_and(RelayConnection::is_connected)
    }

    /// Total playtime for a player on a server.
    pub async fn playtime(&self, uuid: &str, server: &str) -> Option<Playtime> {
        self.fetch(&format!("playtime/{uuid}/{server}")).await
    }

    /// First-seen date for a player on a server.
    pub async fn joindate(&self, uuid: &str, server: &str) -> Option<Joindate> {
        self.fetch(&format!("joindate/{uuid}/{server}")).await
    }

    /// Number of joins for a player on a server.
    pub async fn join_count(&self, uuid: &str, server: &str) -> Option<JoinCount> {
        self.fetch(&format!("joincount/{uuid}/{server}")).await
    }

    /// Last time a player was seen on a server.
    pub async fn last_seen(&self, uuid: &str, server: &str) -> Option<LastSeen> {
        self.fetch(&format!("lastseen/{uuid}/{server}")).await
    }

    /// Kill and death counters for a player on a server.
    pub async fn kd(&self, uuid: &str, server: &str) -> Option<Kd> {
        self.fetch(&format!("kd/{uuid}/{server}")).await
    }

    /// Recent deaths for a player.
    pub async fn deaths(
        &self,
        uuid: &str,
        server: &str,
        limit: u32,
        order: SortOrder,
    ) -> Option<Vec<DeathRecord>> {
        self.fetch::<DeathsResponse>(&format!(
            "deaths/{uuid}/{server}/{limit}/{}",
            order.as_path()
        ))
        .await
        .map(|response| response.deaths)
    }

    /// Recent kills for a player.
    pub async fn kills(
        &self,
        uuid: &str,
        server: &str,
        limit: u32,
        order: SortOrder,
    ) -> Option<Vec<KillRecord>> {
        self.fetch::<KillsResponse>(&format!(
            "kills/{uuid}/{server}/{limit}/{}",
            order.as_path()
        ))
        .await
        .map(|response| response.kills)
    }

    /// Recent chat messages for a player.
    pub async fn messages(
        &self,
        username: &str,
        server: &str,
        limit: u32,
        order: SortOrder,
    ) -> Option<Vec<ChatRecord>> {
        self.fetch::<MessagesResponse>(&format!(
            "messages/{username}/{server}/{limit}/{}",
            order.as_path()
        ))
        .await
        .map(|response| response.messages)
    }

    /// Recent advancements for a player.
    pub async fn advancements(
        &self,
        uuid: &str,
        server: &str,
        limit: u32,
        order: SortOrder,
    ) -> Option<Vec<AdvancementRecord>> {
        self.fetch::<AdvancementsResponse>(&format!(
            "advancements/{uuid}/{server}/{limit}/{}",
            order.as_path()
        ))
        .await
        .map(|response| response.advancements)
    }

    /// Total chat message count for a player on a server.
    pub async fn message_count(&self, username: &str, server: &str) -> Option<MessageCount> {
        self.fetch(&format!("messagecount/{username}/{server}")).await
    }

    /// How often a player has said a word on a server.
    pub async fn word_occurrence(
        &self,
        username: &str,
        server: &str,
        word: &str,
    ) -> Option<WordOccurence> {
        self.fetch(&format!("wordoccurence/{username}/{server}/{word}"))
            .await
    }

    /// Resolves a username to its identity record.
    pub async fn name_lookup(&self, username: &str) -> Option<NameLookup> {
        self.fetch(&format!("namefinder/{username}")).await
    }

    /// Whether a player is currently online anywhere.
    pub async fn online(&self, username: &str) -> Option<OnlineCheck> {
        self.fetch(&format!("online/{username}")).await
    }

    /// Profile description lines for a player.
    pub async fn whois(&self, username: &str) -> Option<WhoIs> {
        self.fetch(&format!("whois/{username}")).await
    }

    /// Converts a username to a uuid.
    pub async fn uuid_for(&self, username: &str) -> Option<UuidLookup> {
        self.fetch(&format!("convert-to-uuid/{username}")).await
    }

    /// Random saved chat quote for a player on a server.
    pub async fn random_quote(&self, username: &str, server: &str) -> Option<Quote> {
        self.fetch(&format!("quote/{username}/{server}")).await
    }

    /// Hourly login activity per weekday for a player.
    pub async fn activity_by_hour(
        &self,
        uuid: &str,
        server: &str,
    ) -> Option<Vec<WeekdayHourlyActivity>> {
        self.fetch::<ActivityByHourResponse>(&format!("activity-by-hour/{uuid}/{server}"))
            .await
            .map(|response| response.player_activity_by_hour)
    }

    /// Aggregate login activity per weekday for a player.
    pub async fn activity_by_week_day(
        &self,
        uuid: &str,
        server: &str,
    ) -> Option<WeekdayActivity> {
        self.fetch::<ActivityByWeekDayResponse>(&format!("activity-by-week-day/{uuid}/{server}"))
            .await
            .map(|response| response.player_activity_by_week_day)
    }

    fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.api_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.try_fetch(path).await {
            Ok(value) => Some(value),
            Err(err) => {
                if self.log_errors {
                    warn!(%path, error = %err, "hub api request failed");
                }
                None
            }
        }
    }

    async fn try_fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .header("x-api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus { status });
        }

        response.json::<T>().await.map_err(ApiError::Decode)
    }
}

fn join_endpoint(base: &str, path: &str) -> String {
    format!("{}/{path}", base.trim_end_matches('/'))
}

/// Sort order for list queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    Desc,
    Asc,
}

impl SortOrder {
    /// Path-segment spelling used by the hub routes.
    pub fn as_path(&self) -> &'static str {
        match self {
            SortOrder::Desc => "DESC",
            SortOrder::Asc => "ASC",
        }
    }
}

/// Instant that the hub reports either as an epoch number or as
/// preformatted text, depending on the route and data age.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TimeValue {
    Epoch(i64),
    Text(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Playtime {
    pub playtime: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Joindate {
    pub joindate: TimeValue,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JoinCount {
    pub joincount: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LastSeen {
    pub lastseen: TimeValue,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Kd {
    pub kills: u64,
    pub deaths: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DeathRecord {
    pub death_message: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct KillRecord {
    pub kill_message: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChatRecord {
    pub username: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AdvancementRecord {
    pub advancement: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MessageCount {
    pub messagecount: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WordOccurence {
    pub word: String,
    pub count: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NameLookup {
    pub uuid: String,
    pub username: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OnlineCheck {
    pub online: bool,
    #[serde(default)]
    pub server: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WhoIs {
    pub description: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UuidLookup {
    pub uuid: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Quote {
    pub name: String,
    pub message: String,
    pub date: String,
    pub mc_server: String,
    pub uuid: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HourlyActivity {
    pub hour: u8,
    pub logins: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WeekdayHourlyActivity {
    pub weekday: u8,
    pub activity: Vec<HourlyActivity>,
}

/// Aggregate login counts keyed by weekday; the hub reports the days
/// with capitalized names.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeekdayActivity {
    pub monday: u64,
    pub tuesday: u64,
    pub wednesday: u64,
    pub thursday: u64,
    pub friday: u64,
    pub saturday: u64,
    pub sunday: u64,
}

#[derive(Debug, Deserialize)]
struct DeathsResponse {
    deaths: Vec<DeathRecord>,
}

#[derive(Debug, Deserialize)]
struct KillsResponse {
    kills: Vec<KillRecord>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<ChatRecord>,
}

#[derive(Debug, Deserialize)]
struct AdvancementsResponse {
    advancements: Vec<AdvancementRecord>,
}

#[derive(Debug, Deserialize)]
struct ActivityByHourResponse {
    player_activity_by_hour: Vec<WeekdayHourlyActivity>,
}

#[derive(Debug, Deserialize)]
struct ActivityByWeekDayResponse {
    player_activity_by_week_day: WeekdayActivity,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn time_value_accepts_epoch_numbers_and_text() {
        let epoch: LastSeen = serde_json::from_value(json!({"lastseen": 1_700_000_000}))
            .expect("epoch form");
        assert_eq!(epoch.lastseen, TimeValue::Epoch(1_700_000_000));

        let text: LastSeen =
            serde_json::from_value(json!({"lastseen": "3 days ago"})).expect("text form");
        assert_eq!(text.lastseen, TimeValue::Text("3 days ago".to_string()));
    }

    #[test]
    fn endpoint_join_tolerates_trailing_slash() {
        assert_eq!(
            join_endpoint("http://hub.example:5000/", "playtime/u-1/survival"),
            "http://hub.example:5000/playtime/u-1/survival"
        );
        assert_eq!(
            join_endpoint("http://hub.example:5000", "kd/u-1/survival"),
            "http://hub.example:5000/kd/u-1/survival"
        );
    }

    #[test]
    fn sort_order_path_spellings() {
        assert_eq!(SortOrder::Desc.as_path(), "DESC");
        assert_eq!(SortOrder::Asc.as_path(), "ASC");
    }

    #[test]
    fn online_check_tolerates_missing_server() {
        let offline: OnlineCheck =
            serde_json::from_value(json!({"online": false})).expect("decode");
        assert_eq!(offline.server, None);

        let online: OnlineCheck =
            serde_json::from_value(json!({"online": true, "server": "survival"}))
                .expect("decode");
        assert_eq!(online.server.as_deref(), Some("survival"));
    }

    #[test]
    fn list_responses_unwrap_their_collection_key() {
        let response: DeathsResponse = serde_json::from_value(json!({
            "deaths": [{"death_message": "Steve drowned", "timestamp": 1_700_000_000}]
        }))
        .expect("decode");
        assert_eq!(response.deaths.len(), 1);
        assert_eq!(response.deaths[0].death_message, "Steve drowned");
    }

    #[test]
    fn weekday_activity_uses_capitalized_day_names() {
        let activity: WeekdayActivity = serde_json::from_value(json!({
            "Monday": 1, "Tuesday": 2, "Wednesday": 3, "Thursday": 4,
            "Friday": 5, "Saturday": 6, "Sunday": 7
        }))
        .expect("decode");
        assert_eq!(activity.monday, 1);
        assert_eq!(activity.sunday, 7);
    }
}

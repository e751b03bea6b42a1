//! Relay websocket client and outbound command sender.
//!
//! The client authenticates with connection-time headers, then hands the
//! socket to a background worker that dispatches inbound frames and runs
//! the keepalive timer. There is no reconnect: once the transport
//! closes, the connection stays closed and the host must open a new one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::relay::events::{dispatch, RelayEvent};
use crate::relay::proto::{
    AdvancementMsg, DiscordChatMsg, MinecraftChatMsg, OutboundMessage, PlayerDeathMsg,
    PlayerEntryMsg, PlayerJoinMsg, PlayerLeaveMsg, PlayerListMsg,
};

/// Keepalive period used while the connection is open.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);
/// Payload carried by every keepalive ping frame.
pub const KEEPALIVE_PAYLOAD: &[u8] = b"pingdata";
/// Path appended to the hub base URL when opening the relay channel.
pub const CONNECT_PATH: &str = "/websocket/connect";

/// Which kind of bridge this connection represents to the hub.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClientType {
    Minecraft,
    Discord,
}

impl ClientType {
    /// Value sent in the `client-type` connect header.
    pub fn as_header(&self) -> &'static str {
        match self {
            ClientType::Minecraft => "minecraft",
            ClientType::Discord => "discord",
        }
    }
}

/// Entry point for opening relay connections.
#[derive(Clone)]
pub struct RelayClient {
    websocket_url: String,
    api_key: SecretString,
    mc_server: String,
    client_type: ClientType,
    ping_interval: Duration,
}

impl RelayClient {
    /// Creates a relay client for the given hub.
    ///
    /// Inputs are not validated locally; a malformed URL or rejected key
    /// surfaces as a connection error from [`RelayClient::connect`].
    pub fn new(
        websocket_url: impl Into<String>,
        api_key: SecretString,
        mc_server: impl Into<String>,
        client_type: ClientType,
    ) -> Self {
        Self {
            websocket_url: websocket_url.into().trim_end().to_string(),
            api_key,
            mc_server: mc_server.into(),
            client_type,
            ping_interval: KEEPALIVE_INTERVAL,
        }
    }

    /// Overrides the keepalive period. Defaults to [`KEEPALIVE_INTERVAL`].
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    fn connect_url(&self) -> String {
        format!(
            "{}{CONNECT_PATH}",
            self.websocket_url.trim_end_matches('/')
        )
    }

    /// Opens the relay channel.
    ///
    /// Identity is asserted entirely through connect-time headers
    /// (`x-api-key`, `client-type`, `mc_server`); there is no follow-up
    /// handshake and no server-assigned connection id. On success a
    /// background worker owns the socket and [`RelayEvent::Open`] is the
    /// first event on the returned connection.
    pub async fn connect(&self) -> Result<RelayConnection, RelayError> {
        let mut request = self.connect_url().into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("x-api-key", self.api_key.expose_secret().parse()?);
        headers.insert("client-type", self.client_type.as_header().parse()?);
        headers.insert("mc_server", self.mc_server.parse()?);

        let (socket, _) = connect_async(request).await?;
        debug!(url = %self.connect_url(), client_type = self.client_type.as_header(), "relay connected");

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let _ = event_tx.send(RelayEvent::Open);

        tokio::spawn(relay_worker(
            socket,
            outbound_rx,
            event_tx,
            Arc::clone(&connected),
            self.ping_interval,
        ));

        Ok(RelayConnection {
            sender: RelaySender { tx: outbound_tx },
            events: event_rx,
            connected,
        })
    }
}

/// Active relay connection: event stream plus outbound sender.
#[derive(Debug)]
pub struct RelayConnection {
    sender: RelaySender,
    events: mpsc::UnboundedReceiver<RelayEvent>,
    connected: Arc<AtomicBool>,
}

impl RelayConnection {
    /// Returns a cloneable sender for outbound messages.
    pub fn sender(&self) -> RelaySender {
        self.sender.clone()
    }

    /// Whether the underlying transport is still open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Receives the next relay event, `None` once the stream is drained
    /// after close.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        self.events.recv().await
    }

    /// Splits into sender and raw event receiver.
    pub fn split(self) -> (RelaySender, mpsc::UnboundedReceiver<RelayEvent>) {
        (self.sender, self.events)
    }
}

/// Cloneable handle publishing messages to the hub.
///
/// Sends are fire-and-forget: `Ok` means the frame was handed to the
/// connection worker, not that the hub received it. Once the connection
/// has closed every send fails with [`RelayError::ChannelClosed`];
/// nothing is queued for a later reconnect.
#[derive(Clone, Debug)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl RelaySender {
    /// Sends a raw outbound message.
    pub fn send(&self, message: OutboundMessage) -> Result<(), RelayError> {
        self.tx.send(message).map_err(|_| RelayError::ChannelClosed)
    }

    /// Publishes a Minecraft chat line.
    pub fn send_minecraft_chat(&self, message: MinecraftChatMsg) -> Result<(), RelayError> {
        self.send(OutboundMessage::InboundMinecraftChat(message))
    }

    /// Publishes a Discord chat line.
    pub fn send_discord_chat(&self, message: DiscordChatMsg) -> Result<(), RelayError> {
        self.send(OutboundMessage::InboundDiscordChat(message))
    }

    /// Publishes the current player list.
    ///
    /// The hub derives playtime from these updates, so bridges should
    /// send one roughly every minute.
    pub fn send_player_list(&self, players: Vec<PlayerEntryMsg>) -> Result<(), RelayError> {
        self.send(OutboundMessage::SendUpdatePlayerList(PlayerListMsg {
            players,
        }))
    }

    /// Publishes an advancement.
    pub fn send_advancement(&self, message: AdvancementMsg) -> Result<(), RelayError> {
        self.send(OutboundMessage::MinecraftAdvancement(message))
    }

    /// Publishes a player join.
    pub fn send_player_join(&self, message: PlayerJoinMsg) -> Result<(), RelayError> {
        self.send(OutboundMessage::MinecraftPlayerJoin(message))
    }

    /// Publishes a player leave.
    pub fn send_player_leave(&self, message: PlayerLeaveMsg) -> Result<(), RelayError> {
        self.send(OutboundMessage::MinecraftPlayerLeave(message))
    }

    /// Publishes a player death.
    ///
    /// Kills have no outbound counterpart: the hub derives and relays
    /// kill events itself, so they only ever arrive inbound.
    pub fn send_player_death(&self, message: PlayerDeathMsg) -> Result<(), RelayError> {
        self.send(OutboundMessage::MinecraftPlayerDeath(message))
    }
}

/// Errors produced by relay transport handling.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Websocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] WsError),

    /// A connect header value could not be encoded.
    #[error("invalid connect header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// The connection has closed; outbound messages are not queued.
    #[error("relay channel is closed")]
    ChannelClosed,
}

async fn relay_worker(
    mut socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    event_tx: mpsc::UnboundedSender<RelayEvent>,
    connected: Arc<AtomicBool>,
    ping_interval: Duration,
) {
    let mut keepalive = tokio::time::interval_at(
        tokio::time::Instant::now() + ping_interval,
        ping_interval,
    );
    let mut close_reason: Option<String> = None;

    loop {
        tokio::select! {
            _ = keepalive.tick() => {
                if let Err(err) = socket.send(Message::Ping(KEEPALIVE_PAYLOAD.to_vec())).await {
                    let _ = event_tx.send(RelayEvent::TransportError(err.to_string()));
                    break;
                }
            }
            maybe_outbound = outbound_rx.recv() => {
                match maybe_outbound {
                    Some(message) => {
                        let text = match message.to_text() {
                            Ok(text) => text,
                            Err(err) => {
                                warn!(error = %err, "failed to encode outbound message");
                                continue;
                            }
                        };
                        if let Err(err) = socket.send(Message::Text(text)).await {
                            let _ = event_tx.send(RelayEvent::TransportError(err.to_string()));
                            break;
                        }
                    }
                    None => {
                        let _ = socket.close(None).await;
                        break;
                    }
                }
            }
            maybe_inbound = socket.next() => {
                match maybe_inbound {
                    Some(Ok(Message::Text(text))) => {
                        let _ = event_tx.send(dispatch(&text));
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    // No pong-timeout tracking: a hub that stops
                    // answering is only noticed through the transport.
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        close_reason = frame
                            .map(|frame| frame.reason.into_owned())
                            .filter(|reason| !reason.is_empty());
                        break;
                    }
                    Some(Ok(_)) => {
                        let _ = event_tx.send(RelayEvent::ProtocolError(
                            "non-text frame on a text-only channel".to_string(),
                        ));
                    }
                    Some(Err(err)) => {
                        let _ = event_tx.send(RelayEvent::TransportError(err.to_string()));
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
    debug!(reason = close_reason.as_deref(), "relay closed");
    let _ = event_tx.send(RelayEvent::Closed {
        reason: close_reason,
    });
}

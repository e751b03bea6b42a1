use std::error::Error;

use crafthub_sdk::relay::client::{ClientType, RelayClient};
use crafthub_sdk::relay::events::RelayEvent;
use secrecy::SecretString;

fn env_or(name: &str, fallback: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| fallback.to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let websocket_url = env_or("CRAFTHUB_WS_URL", "ws://localhost:5000");
    let api_key = env_or("CRAFTHUB_API_KEY", "REPLACE_WITH_API_KEY");
    let mc_server = env_or("CRAFTHUB_MC_SERVER", "survival");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let client = RelayClient::new(
            websocket_url,
            SecretString::new(api_key),
            mc_server,
            ClientType::Minecraft,
        );
        let mut connection = client.connect().await?;

        while let Some(event) = connection.recv().await {
            match event {
                RelayEvent::Open => println!("relay open"),
                RelayEvent::MinecraftChat(chat) => {
                    println!("[{}] <{}> {}", chat.mc_server, chat.name, chat.message);
                }
                RelayEvent::DiscordChat(chat) => {
                    println!("[discord:{}] <{}> {}", chat.guild_name, chat.username, chat.message);
                }
                RelayEvent::PlayerJoin(join) => {
                    println!("[{}] {} joined", join.server, join.username);
                }
                RelayEvent::PlayerLeave(leave) => {
                    println!("[{}] {} left", leave.server, leave.username);
                }
                RelayEvent::PlayerDeath(death) => {
                    println!("[{}] {}", death.mc_server, death.death_message);
                }
                RelayEvent::Closed { reason } => {
                    println!("relay closed (reason: {reason:?})");
                    break;
                }
                other => println!("{other:?}"),
            }
        }

        Ok(())
    })
}

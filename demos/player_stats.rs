use std::error::Error;

use crafthub_sdk::api::{ApiClient, ApiConfig, SortOrder};
use secrecy::SecretString;

fn env_or(name: &str, fallback: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| fallback.to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_url = env_or("CRAFTHUB_API_URL", "http://localhost:5000");
    let api_key = env_or("CRAFTHUB_API_KEY", "REPLACE_WITH_API_KEY");
    let server = env_or("CRAFTHUB_MC_SERVER", "survival");
    let uuid = env_or("CRAFTHUB_PLAYER_UUID", "069a79f4-44e9-4726-a5be-fca90e38aaf5");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let client = ApiClient::connect(ApiConfig {
            api_url,
            api_key: SecretString::new(api_key),
            mc_server: server.clone(),
            log_errors: true,
            relay: None,
        })
        .await?;

        match client.playtime(&uuid, &server).await {
            Some(playtime) => println!("playtime: {} ticks", playtime.playtime),
            None => println!("playtime: unavailable"),
        }

        if let Some(kd) = client.kd(&uuid, &server).await {
            println!("kills/deaths: {}/{}", kd.kills, kd.deaths);
        }

        if let Some(deaths) = client.deaths(&uuid, &server, 5, SortOrder::Desc).await {
            println!("recent deaths:");
            for death in deaths {
                println!("  {} ({})", death.death_message, death.timestamp);
            }
        }

        Ok(())
    })
}

use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use std::sync::Arc;
use tracing::{error, info};

mod bot;
mod config;
mod fun;
mod player;
mod resolver;
mod storage;
mod tts;
mod ui;
mod voice;

use crate::bot::DenliBot;
use crate::config::Config;
use crate::storage::JsonStorage;
use songbird::SerenityInit;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("denli=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎤 Iniciando Denli Bot v{}", env!("CARGO_PKG_VERSION"));

    // Health check sin tocar Discord
    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check().await;
    }

    // Cargar configuración
    let config = Config::load()?;
    info!("{}", config.summary());

    // Inicializar almacenamiento JSON
    let storage = Arc::new(tokio::sync::Mutex::new(
        JsonStorage::new(config.data_dir.clone()).await?,
    ));

    // Intents mínimos: voz y guilds; los comandos llegan por interacciones
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;

    let token = config.discord_token.clone();
    let handler = DenliBot::new(config, storage)?;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .register_songbird()
        .await?;

    // Shutdown graceful
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Error al registrar Ctrl+C");
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        std::process::exit(0);
    });

    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}

/// Verifica las dependencias externas del bot: extractor de audio,
/// sintetizador TTS y ffmpeg.
async fn health_check() -> Result<()> {
    let yt_dlp = async_process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .await?;

    let edge_tts = async_process::Command::new("edge-tts")
        .arg("--list-voices")
        .output()
        .await?;

    let ffmpeg = async_process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await?;

    if yt_dlp.status.success() && edge_tts.status.success() && ffmpeg.status.success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("Dependencias faltantes (yt-dlp, edge-tts o ffmpeg)");
    }
}

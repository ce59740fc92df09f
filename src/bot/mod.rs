//! Núcleo del bot de Discord.
//!
//! [`DenliBot`] implementa el [`EventHandler`] de serenity y reúne las
//! piezas del proceso: configuración, sesiones de reproducción por guild,
//! conexión de voz, motor TTS, almacenamiento JSON y clientes de APIs
//! externas. Los eventos entran por aquí y se despachan a `handlers`.

use anyhow::Result;
use serenity::{
    all::{Context, EventHandler, GuildId, Interaction, Ready, VoiceState},
    async_trait,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub mod commands;
pub mod handlers;

use crate::{
    config::Config,
    player::PlayerRegistry,
    resolver::{SpotifyClient, YtDlpResolver},
    storage::JsonStorage,
    tts::TtsEngine,
    voice::VoiceManager,
};

/// Cada cuánto corre la pasada de mantenimiento.
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Antigüedad a partir de la cual un temporal de TTS se considera huérfano.
const TTS_STALE_AFTER: Duration = Duration::from_secs(45 * 60);

/// Estado compartido del bot. Todo es `Arc` o `Sync`: serenity invoca los
/// eventos concurrentemente.
pub struct DenliBot {
    pub config: Arc<Config>,
    pub storage: Arc<tokio::sync::Mutex<JsonStorage>>,
    pub players: Arc<PlayerRegistry>,
    pub voice: VoiceManager,
    pub tts: Arc<TtsEngine>,
    pub spotify: Option<Arc<SpotifyClient>>,
    pub http: reqwest::Client,
}

impl DenliBot {
    pub fn new(config: Config, storage: Arc<tokio::sync::Mutex<JsonStorage>>) -> Result<Self> {
        let config = Arc::new(config);

        let resolver = Arc::new(YtDlpResolver::new()?);
        let players = Arc::new(PlayerRegistry::new(
            resolver,
            config.queue_limit,
            config.default_volume,
        ));

        let voice = VoiceManager::new(config.voice_retry_attempts, config.voice_retry_delay());
        let tts = Arc::new(TtsEngine::new(config.temp_dir.clone(), config.max_text)?);

        let spotify = match (&config.spotify_client_id, &config.spotify_client_secret) {
            (Some(id), Some(secret)) => {
                info!("🎧 Expansión de Spotify habilitada");
                Some(Arc::new(SpotifyClient::new(id.clone(), secret.clone())?))
            }
            _ => {
                info!("🎧 Sin credenciales de Spotify, expansión deshabilitada");
                None
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            config,
            storage,
            players,
            voice,
            tts,
            spotify,
            http,
        })
    }

    /// Registra los comandos slash, por guild (desarrollo) o globales.
    async fn register_commands(&self, ctx: &Context) -> Result<()> {
        info!("📝 Registrando comandos slash...");

        match self.config.guild_id {
            Some(guild_id) => {
                let guild_id = GuildId::new(guild_id);
                commands::register_guild_commands(ctx, guild_id).await?;
                info!("✅ Comandos registrados para guild {}", guild_id);
            }
            None => {
                commands::register_global_commands(ctx).await?;
                info!("✅ Comandos globales registrados");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for DenliBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("Error al registrar comandos: {:?}", e);
        }

        let tts = self.tts.clone();
        tokio::spawn(async move {
            maintenance_tasks(tts).await;
        });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                if let Err(e) = handlers::handle_command(&ctx, command, self).await {
                    error!("Error manejando comando: {:?}", e);
                }
            }
            Interaction::Component(component) => {
                if let Err(e) = handlers::handle_component(&ctx, component, self).await {
                    error!("Error manejando componente: {:?}", e);
                }
            }
            _ => {}
        }
    }

    /// Si alguien desconecta al bot a mano, la sesión se detiene para que
    /// el estado no quede apuntando a una conexión muerta.
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let current_user_id = ctx.cache.current_user().id;
        if new.user_id != current_user_id {
            return;
        }
        if old.is_some() && new.channel_id.is_none() {
            if let Some(guild_id) = new.guild_id {
                info!("🔌 Bot desconectado del canal de voz en guild {}", guild_id);
                if let Some(session) = self.players.peek(guild_id) {
                    session.stop();
                }
            }
        }
    }
}

/// Limpieza periódica de temporales TTS huérfanos (procesos caídos a mitad
/// de síntesis, eventos de fin que nunca llegaron).
async fn maintenance_tasks(tts: Arc<TtsEngine>) {
    let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);

    loop {
        interval.tick().await;
        let removed = tts.cleanup_old(TTS_STALE_AFTER).await;
        if removed > 0 {
            warn!("🧹 {} temporales TTS huérfanos limpiados", removed);
        }
    }
}

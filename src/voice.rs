//! Gestión del ciclo de vida de la conexión de voz, una por guild:
//! conexión con reintentos acotados, movimiento de canal sin reconexión
//! completa cuando es posible y desconexión idempotente.

use serenity::model::id::{ChannelId, GuildId};
use songbird::{error::JoinError, Call, Songbird};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// La conexión de voz falló tras agotar los reintentos. Se comunica al
/// usuario una sola vez; no se reintenta automáticamente.
#[derive(Debug, Error)]
#[error("no se pudo conectar al canal de voz tras {attempts} intentos")]
pub struct ConnectError {
    pub attempts: usize,
}

/// Administrador de conexiones de voz. Cantidad fija de intentos con
/// espera fija entre ellos (no exponencial).
pub struct VoiceManager {
    attempts: usize,
    retry_delay: Duration,
}

impl VoiceManager {
    pub fn new(attempts: usize, retry_delay: Duration) -> Self {
        Self {
            attempts,
            retry_delay,
        }
    }

    /// Conecta al canal indicado. Cada intento fallido se registra; al
    /// agotar los reintentos el llamador debe avisar al usuario.
    pub async fn connect(
        &self,
        songbird: &Songbird,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<Mutex<Call>>, ConnectError> {
        for attempt in 1..=self.attempts {
            match songbird.join(guild_id, channel_id).await {
                Ok(call) => {
                    info!(
                        "🔊 Conectado al canal de voz {} en guild {} (intento {})",
                        channel_id, guild_id, attempt
                    );
                    return Ok(call);
                }
                Err(e) => {
                    warn!(
                        "⚠️ Intento de conexión {}/{} falló en guild {}: {}",
                        attempt, self.attempts, guild_id, e
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(ConnectError {
            attempts: self.attempts,
        })
    }

    /// Reutiliza la conexión viva si ya está en el canal pedido; si no,
    /// vuelve a unirse (songbird mueve la conexión existente sin rehacer
    /// el handshake completo cuando puede).
    pub async fn move_or_reconnect(
        &self,
        songbird: &Songbird,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<Mutex<Call>>, ConnectError> {
        if let Some(call) = songbird.get(guild_id) {
            let current = { call.lock().await.current_channel() };
            if current == Some(channel_id.into()) {
                // El handle dice que ya está conectado ahí; se le cree.
                return Ok(call);
            }
        }
        self.connect(songbird, guild_id, channel_id).await
    }

    /// Desconexión idempotente: sobre una guild ya desconectada es un
    /// no-op, nunca un error.
    pub async fn disconnect(&self, songbird: &Songbird, guild_id: GuildId) {
        match songbird.remove(guild_id).await {
            Ok(()) => info!("👋 Desconectado del canal de voz en guild {}", guild_id),
            Err(JoinError::NoCall) => {
                debug!("Sin conexión activa en guild {}, nada que hacer", guild_id)
            }
            Err(e) => warn!("⚠️ Error al desconectar en guild {}: {}", guild_id, e),
        }
    }
}

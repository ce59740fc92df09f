//! Sesiones de reproducción por guild.
//!
//! Cada guild tiene a lo sumo una [`PlaybackSession`] que posee la cola,
//! el historial, la pista actual y la máquina de estados del reproductor.
//! El registro procesal [`PlayerRegistry`] crea las sesiones de forma
//! perezosa y vive lo que vive el proceso.

pub mod queue;
pub mod session;

use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use thiserror::Error;

pub use queue::{PlayedEntry, TrackQueue, TrackRequest};
pub use session::{EnqueueOutcome, PlaybackSession, PlaybackState};

use crate::resolver::TrackResolver;

/// Fallos con significado para el usuario; la máquina de estados nunca
/// lanza, solo devuelve estos marcadores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no hay nada reproduciéndose")]
    NothingPlaying,
    #[error("la operación no aplica en el estado actual")]
    InvalidState,
    #[error("no existe una pista con ese número")]
    NotFound,
    #[error("la cola está vacía")]
    EmptyQueue,
    #[error("la cola está llena (máximo {0})")]
    QueueFull(usize),
    #[error("no se pudo resolver la pista")]
    ResolutionFailed,
    #[error("la acción fue reemplazada por otra más reciente")]
    Superseded,
}

/// Registro procesal de sesiones, una por guild.
pub struct PlayerRegistry {
    sessions: DashMap<GuildId, Arc<PlaybackSession>>,
    resolver: Arc<dyn TrackResolver>,
    queue_limit: usize,
    default_volume: f32,
}

impl PlayerRegistry {
    pub fn new(resolver: Arc<dyn TrackResolver>, queue_limit: usize, default_volume: f32) -> Self {
        Self {
            sessions: DashMap::new(),
            resolver,
            queue_limit,
            default_volume,
        }
    }

    /// Obtiene la sesión de la guild, creándola si es la primera vez.
    pub fn session(&self, guild_id: GuildId) -> Arc<PlaybackSession> {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                Arc::new(PlaybackSession::new(
                    guild_id,
                    self.resolver.clone(),
                    self.queue_limit,
                    self.default_volume,
                ))
            })
            .clone()
    }

    /// Sesión existente sin crearla (para callbacks de desconexión).
    pub fn peek(&self, guild_id: GuildId) -> Option<Arc<PlaybackSession>> {
        self.sessions.get(&guild_id).map(|s| s.clone())
    }
}

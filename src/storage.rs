//! Almacenamiento plano en JSON: bloqueos de canal por guild y
//! estadísticas de canciones por usuario. Se carga al arranque y se
//! reescribe completo en cada cambio.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

const CHANNEL_SETTINGS_FILE: &str = "channel_settings.json";
const USER_SONGS_FILE: &str = "user_songs.json";

/// Bloqueos de canal por guild: dónde se permiten los comandos de música
/// y dónde los de diversión.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ChannelSettings {
    music_channels: HashMap<u64, u64>,
    fun_channels: HashMap<u64, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongStats {
    pub play_count: u32,
    pub first_played: i64,
    pub last_played: i64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserSongs {
    pub username: String,
    pub songs: HashMap<String, SongStats>,
}

/// Manager de almacenamiento basado en archivos JSON.
pub struct JsonStorage {
    data_dir: PathBuf,
    channels: ChannelSettings,
    user_songs: HashMap<u64, UserSongs>,
}

impl JsonStorage {
    pub async fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir).await?;

        let channels = Self::load_json(&data_dir.join(CHANNEL_SETTINGS_FILE)).await;
        let user_songs = Self::load_json(&data_dir.join(USER_SONGS_FILE)).await;

        info!("📁 Storage inicializado en: {}", data_dir.display());
        Ok(Self {
            data_dir,
            channels,
            user_songs,
        })
    }

    /// Canal de música bloqueado para la guild, si existe. El panel de
    /// "reproduciendo ahora" solo se publica cuando está configurado.
    pub fn music_channel(&self, guild_id: u64) -> Option<u64> {
        self.channels.music_channels.get(&guild_id).copied()
    }

    pub async fn set_music_channel(&mut self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.channels.music_channels.insert(guild_id, channel_id);
        self.save_channels().await?;
        info!(
            "📌 Canal de música fijado en guild {}: {}",
            guild_id, channel_id
        );
        Ok(())
    }

    pub async fn clear_music_channel(&mut self, guild_id: u64) -> Result<bool> {
        let removed = self.channels.music_channels.remove(&guild_id).is_some();
        if removed {
            self.save_channels().await?;
        }
        Ok(removed)
    }

    pub fn fun_channel(&self, guild_id: u64) -> Option<u64> {
        self.channels.fun_channels.get(&guild_id).copied()
    }

    pub async fn set_fun_channel(&mut self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.channels.fun_channels.insert(guild_id, channel_id);
        self.save_channels().await?;
        Ok(())
    }

    pub async fn clear_fun_channel(&mut self, guild_id: u64) -> Result<bool> {
        let removed = self.channels.fun_channels.remove(&guild_id).is_some();
        if removed {
            self.save_channels().await?;
        }
        Ok(removed)
    }

    /// Registra una reproducción pedida por un usuario y devuelve cuántas
    /// veces ha pedido esa canción.
    pub async fn track_user_song(
        &mut self,
        user_id: u64,
        username: &str,
        title: &str,
    ) -> Result<u32> {
        let now = chrono::Utc::now().timestamp();
        let user = self.user_songs.entry(user_id).or_default();
        user.username = username.to_string();

        let stats = user
            .songs
            .entry(title.to_string())
            .and_modify(|s| {
                s.play_count += 1;
                s.last_played = now;
            })
            .or_insert(SongStats {
                play_count: 1,
                first_played: now,
                last_played: now,
            });
        let count = stats.play_count;

        self.save_user_songs().await?;
        Ok(count)
    }

    pub fn user_stats(&self, user_id: u64) -> Option<&UserSongs> {
        self.user_songs.get(&user_id)
    }

    // Métodos privados

    async fn load_json<T: Default + for<'de> Deserialize<'de>>(path: &PathBuf) -> T {
        match fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Error parseando {}: {}", path.display(), e);
                    T::default()
                }
            },
            Err(_) => T::default(),
        }
    }

    async fn save_channels(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.channels)?;
        fs::write(self.data_dir.join(CHANNEL_SETTINGS_FILE), content).await?;
        Ok(())
    }

    async fn save_user_songs(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.user_songs)?;
        fs::write(self.data_dir.join(USER_SONGS_FILE), content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn channel_settings_survive_reload() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut storage = JsonStorage::new(dir.path().to_path_buf()).await.unwrap();
            storage.set_music_channel(10, 555).await.unwrap();
            storage.set_fun_channel(10, 777).await.unwrap();
        }

        let storage = JsonStorage::new(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(storage.music_channel(10), Some(555));
        assert_eq!(storage.fun_channel(10), Some(777));
        assert_eq!(storage.music_channel(11), None);
    }

    #[tokio::test]
    async fn clearing_unset_channel_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path().to_path_buf()).await.unwrap();
        assert!(!storage.clear_music_channel(99).await.unwrap());
    }

    #[tokio::test]
    async fn user_song_counter_increments_and_persists() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut storage = JsonStorage::new(dir.path().to_path_buf()).await.unwrap();
            assert_eq!(
                storage.track_user_song(1, "ana", "Gurenge").await.unwrap(),
                1
            );
            assert_eq!(
                storage.track_user_song(1, "ana", "Gurenge").await.unwrap(),
                2
            );
            assert_eq!(
                storage.track_user_song(1, "ana", "Homura").await.unwrap(),
                1
            );
        }

        let storage = JsonStorage::new(dir.path().to_path_buf()).await.unwrap();
        let stats = storage.user_stats(1).unwrap();
        assert_eq!(stats.username, "ana");
        assert_eq!(stats.songs["Gurenge"].play_count, 2);
        assert_eq!(stats.songs["Homura"].play_count, 1);
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub application_id: u64,
    pub guild_id: Option<u64>, // Para comandos de desarrollo

    // Audio
    pub default_volume: f32,
    pub tts_volume: f32,
    pub queue_limit: usize,
    pub max_text: usize,

    // Voz
    pub voice_retry_attempts: usize,
    pub voice_retry_delay_secs: u64,

    // Paths
    pub data_dir: PathBuf,
    pub temp_dir: PathBuf,

    // APIs (opcionales)
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub tenor_api_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN")?,
            application_id: std::env::var("APPLICATION_ID")?.parse()?,
            guild_id: std::env::var("GUILD_ID").ok().and_then(|s| s.parse().ok()),

            // Audio (la música con un leve boost, el TTS más alto para
            // que se entienda)
            default_volume: std::env::var("DEFAULT_VOLUME")
                .unwrap_or_else(|_| "1.15".to_string())
                .parse()?,
            tts_volume: std::env::var("TTS_VOLUME")
                .unwrap_or_else(|_| "1.5".to_string())
                .parse()?,
            queue_limit: std::env::var("QUEUE_LIMIT")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            max_text: std::env::var("MAX_TEXT")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,

            // Voz
            voice_retry_attempts: std::env::var("VOICE_RETRY_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            voice_retry_delay_secs: std::env::var("VOICE_RETRY_DELAY_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,

            // Paths
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            temp_dir: std::env::var("TEMP_DIR")
                .unwrap_or_else(|_| "temp_tts".to_string())
                .into(),

            // APIs
            spotify_client_id: std::env::var("SPOTIFY_CLIENT_ID").ok(),
            spotify_client_secret: std::env::var("SPOTIFY_CLIENT_SECRET").ok(),
            tenor_api_key: std::env::var("TENOR_API_KEY").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn voice_retry_delay(&self) -> Duration {
        Duration::from_secs(self.voice_retry_delay_secs)
    }

    /// Chequeos de sanidad sobre los valores cargados.
    pub fn validate(&self) -> Result<()> {
        if !(0.1..=2.0).contains(&self.default_volume) {
            anyhow::bail!(
                "DEFAULT_VOLUME debe estar entre 0.1 y 2.0, se recibió: {}",
                self.default_volume
            );
        }
        if !(0.1..=2.0).contains(&self.tts_volume) {
            anyhow::bail!(
                "TTS_VOLUME debe estar entre 0.1 y 2.0, se recibió: {}",
                self.tts_volume
            );
        }
        if self.queue_limit == 0 {
            anyhow::bail!("QUEUE_LIMIT debe ser mayor que 0");
        }
        if self.max_text == 0 {
            anyhow::bail!("MAX_TEXT debe ser mayor que 0");
        }
        if self.voice_retry_attempts == 0 {
            anyhow::bail!("VOICE_RETRY_ATTEMPTS debe ser mayor que 0");
        }
        Ok(())
    }

    /// Resumen para el log de arranque, sin datos sensibles.
    pub fn summary(&self) -> String {
        format!(
            "Config: app {} (guild: {}), vol música {}%, vol TTS {}%, \
             cola máx {}, texto máx {}, voz {}x{}s, spotify={}, tenor={}",
            self.application_id,
            self.guild_id
                .map_or("global".to_string(), |id| id.to_string()),
            (self.default_volume * 100.0) as u32,
            (self.tts_volume * 100.0) as u32,
            self.queue_limit,
            self.max_text,
            self.voice_retry_attempts,
            self.voice_retry_delay_secs,
            self.spotify_client_id.is_some(),
            self.tenor_api_key.is_some(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            application_id: 0,
            guild_id: None,
            default_volume: 1.15,
            tts_volume: 1.5,
            queue_limit: 100,
            max_text: 300,
            voice_retry_attempts: 3,
            voice_retry_delay_secs: 3,
            data_dir: "data".into(),
            temp_dir: "temp_tts".into(),
            spotify_client_id: None,
            spotify_client_secret: None,
            tenor_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_volume_is_rejected() {
        let mut config = Config::default();
        config.default_volume = 3.0;
        assert!(config.validate().is_err());

        config.default_volume = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_queue_limit_is_rejected() {
        let mut config = Config::default();
        config.queue_limit = 0;
        assert!(config.validate().is_err());
    }
}

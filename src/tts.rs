//! Sesión TTS: hermana simple del reproductor. Sintetiza texto a un mp3
//! temporal con el CLI de `edge-tts`, lo reproduce una vez a través del
//! mismo administrador de voz y borra el archivo al terminar. Comparte la
//! conexión, no la cola.

use anyhow::Result;
use songbird::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Perfil de voz por personaje: voz neural, tono y velocidad.
#[derive(Debug, Clone, Copy)]
pub struct VoiceProfile {
    pub voice: &'static str,
    pub pitch: &'static str,
    pub rate: &'static str,
}

/// Personajes disponibles, en el orden en que se ofrecen en el comando.
pub const CHARACTERS: &[&str] = &[
    "tanji", "nezuko", "zenitsu", "inosuke", "muzan", "giyu", "girl", "boy", "child", "hindi",
    "hindim", "telugu", "telugum",
];

/// Mapa personaje → perfil. Desconocido cae en el perfil de "girl".
pub fn profile(character: &str) -> VoiceProfile {
    match character {
        "tanji" => VoiceProfile { voice: "en-US-BrandonNeural", pitch: "+4Hz", rate: "+6%" },
        "nezuko" => VoiceProfile { voice: "ja-JP-NanamiNeural", pitch: "+20Hz", rate: "-12%" },
        "zenitsu" => VoiceProfile { voice: "en-US-GuyNeural", pitch: "+15Hz", rate: "+10%" },
        "inosuke" => VoiceProfile { voice: "en-US-ChristopherNeural", pitch: "-14Hz", rate: "-6%" },
        "muzan" => VoiceProfile { voice: "en-US-ChristopherNeural", pitch: "-24Hz", rate: "-8%" },
        "giyu" => VoiceProfile { voice: "en-US-GuyNeural", pitch: "-10Hz", rate: "-8%" },
        "boy" => VoiceProfile { voice: "en-US-BrandonNeural", pitch: "-4Hz", rate: "0%" },
        "child" => VoiceProfile { voice: "en-US-AriaNeural", pitch: "+22Hz", rate: "+10%" },
        "hindi" => VoiceProfile { voice: "hi-IN-SwaraNeural", pitch: "+0Hz", rate: "+0%" },
        "hindim" => VoiceProfile { voice: "hi-IN-MadhurNeural", pitch: "+0Hz", rate: "+0%" },
        "telugu" => VoiceProfile { voice: "te-IN-ShrutiNeural", pitch: "+0Hz", rate: "+0%" },
        "telugum" => VoiceProfile { voice: "te-IN-MohanNeural", pitch: "+0Hz", rate: "+0%" },
        _ => VoiceProfile { voice: "en-US-JennyNeural", pitch: "+12Hz", rate: "+4%" },
    }
}

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("edge-tts terminó con error: {0}")]
    Synthesis(String),
    #[error("no se pudo ejecutar edge-tts: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("el archivo de audio quedó vacío")]
    EmptyOutput,
}

/// Motor de síntesis sobre archivos temporales.
pub struct TtsEngine {
    temp_dir: PathBuf,
    max_text: usize,
}

impl TtsEngine {
    pub fn new(temp_dir: PathBuf, max_text: usize) -> Result<Self> {
        std::fs::create_dir_all(&temp_dir)?;
        Ok(Self { temp_dir, max_text })
    }

    /// Sintetiza `text` con la voz del personaje y devuelve la ruta del
    /// mp3 temporal. El texto se recorta a `max_text` caracteres.
    pub async fn synthesize(&self, text: &str, character: &str) -> Result<PathBuf, TtsError> {
        let text = truncate_text(text, self.max_text);
        let cfg = profile(character);

        let out = self.temp_dir.join(format!(
            "tts_{}_{}.mp3",
            character,
            chrono::Utc::now().timestamp_millis()
        ));

        let output = tokio::process::Command::new("edge-tts")
            .args(["--voice", cfg.voice, "--pitch", cfg.pitch, "--rate", cfg.rate])
            .args(["--text", &text])
            .arg("--write-media")
            .arg(&out)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TtsError::Synthesis(stderr));
        }

        // Verificar que el archivo exista y tenga contenido
        match tokio::fs::metadata(&out).await {
            Ok(meta) if meta.len() >= 10 => {
                info!("🗣️ TTS generado: {} ({} bytes)", out.display(), meta.len());
                Ok(out)
            }
            _ => Err(TtsError::EmptyOutput),
        }
    }

    /// Borra archivos temporales con más de `older_than` de antigüedad.
    pub async fn cleanup_old(&self, older_than: Duration) -> usize {
        let mut removed = 0;
        let Ok(mut entries) = tokio::fs::read_dir(&self.temp_dir).await else {
            return 0;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "mp3") {
                continue;
            }
            let stale = entry
                .metadata()
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
                .map_or(false, |age| age > older_than);
            if stale && tokio::fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("🧹 {} archivos TTS temporales eliminados", removed);
        }
        removed
    }
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    }
}

/// Borra el mp3 temporal exactamente una vez al terminar la reproducción
/// (fin natural o error).
pub struct TtsCleanup {
    pub path: PathBuf,
}

#[async_trait::async_trait]
impl VoiceEventHandler for TtsCleanup {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("🗑️ TTS temporal borrado: {}", self.path.display()),
            Err(e) => warn!("No se pudo borrar {}: {}", self.path.display(), e),
        }
        None
    }
}

/// Eventos del sink que deben disparar la limpieza del temporal.
pub fn cleanup_events() -> [Event; 2] {
    [
        Event::Track(TrackEvent::End),
        Event::Track(TrackEvent::Error),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_character_has_its_voice() {
        assert_eq!(profile("nezuko").voice, "ja-JP-NanamiNeural");
        assert_eq!(profile("muzan").pitch, "-24Hz");
    }

    #[test]
    fn unknown_character_falls_back_to_girl() {
        assert_eq!(profile("quien-sabe").voice, "en-US-JennyNeural");
        assert_eq!(profile("girl").voice, "en-US-JennyNeural");
    }

    #[test]
    fn text_is_truncated_with_ellipsis() {
        let long = "a".repeat(400);
        let cut = truncate_text(&long, 300);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));

        assert_eq!(truncate_text("hola", 300), "hola");
    }

    #[tokio::test]
    async fn cleanup_removes_only_stale_mp3s() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TtsEngine::new(dir.path().to_path_buf(), 300).unwrap();

        let fresh = dir.path().join("tts_girl_1.mp3");
        tokio::fs::write(&fresh, b"audio").await.unwrap();
        let other = dir.path().join("notas.txt");
        tokio::fs::write(&other, b"texto").await.unwrap();

        // Nada es lo bastante viejo todavía.
        assert_eq!(engine.cleanup_old(Duration::from_secs(3600)).await, 0);
        // Con umbral cero, solo el mp3 cae.
        assert_eq!(engine.cleanup_old(Duration::from_secs(0)).await, 1);
        assert!(!fresh.exists());
        assert!(other.exists());
    }
}

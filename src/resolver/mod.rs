//! Frontera con el extractor de audio: una consulta libre o URL entra,
//! sale un stream reproducible con título y miniatura. Un fallo aquí
//! nunca es fatal para la sesión: la entrada se salta y se sigue.

pub mod spotify;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use songbird::input::{HttpRequest, Input};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use spotify::SpotifyClient;

/// Una entrada de cola resuelta a audio. Propiedad exclusiva de la sesión
/// durante una reproducción; nunca se reutiliza (replay re-resuelve).
pub struct ResolvedTrack {
    pub title: String,
    pub thumbnail: Option<String>,
    pub input: Input,
}

/// Una entrada de cola no pudo convertirse en audio. Se registra, la
/// entrada se salta y el avance continúa con la siguiente.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("yt-dlp terminó con error: {0}")]
    Extraction(String),
    #[error("no se pudo ejecutar yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("metadata de yt-dlp inválida: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("yt-dlp no devolvió URL de stream")]
    MissingStream,
}

/// Contrato del resolutor de pistas. Debe tolerar texto libre, URLs de
/// plataforma y consultas ya expandidas desde playlists.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<ResolvedTrack, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct YtDlpMetadata {
    title: String,
    url: Option<String>,
    thumbnail: Option<String>,
}

/// Resolutor de producción: extrae con `yt-dlp -j` y envuelve la URL del
/// stream en un input HTTP de songbird.
pub struct YtDlpResolver {
    http: reqwest::Client,
}

impl YtDlpResolver {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    /// Texto libre pasa por búsqueda de YouTube; las URLs van tal cual.
    fn extraction_target(query: &str) -> String {
        let is_url = url::Url::parse(query)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if is_url {
            query.to_string()
        } else {
            format!("ytsearch1:{query}")
        }
    }
}

#[async_trait]
impl TrackResolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> Result<ResolvedTrack, ResolveError> {
        let target = Self::extraction_target(query);
        debug!("🔍 Resolviendo '{}' via yt-dlp", target);

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "-j",
                "--no-playlist",
                "-f",
                "bestaudio[ext=m4a]/bestaudio[ext=webm]/bestaudio/best",
                "--no-warnings",
                "--quiet",
            ])
            .arg(&target)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ResolveError::Extraction(stderr));
        }

        let meta: YtDlpMetadata = serde_json::from_slice(&output.stdout)?;
        let stream_url = meta.url.ok_or(ResolveError::MissingStream)?;

        let input = Input::from(HttpRequest::new(self.http.clone(), stream_url));
        Ok(ResolvedTrack {
            title: meta.title,
            thumbnail: meta.thumbnail,
            input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn free_text_goes_through_search() {
        assert_eq!(
            YtDlpResolver::extraction_target("lofi beats"),
            "ytsearch1:lofi beats"
        );
    }

    #[test]
    fn non_http_schemes_go_through_search() {
        assert_eq!(
            YtDlpResolver::extraction_target("spotify:track:abc"),
            "ytsearch1:spotify:track:abc"
        );
    }

    #[test]
    fn urls_pass_unchanged() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(YtDlpResolver::extraction_target(url), url);
    }

    #[test]
    fn metadata_parses_partial_fields() {
        let meta: YtDlpMetadata =
            serde_json::from_str(r#"{"title":"Una Canción","url":"https://cdn/a.m4a"}"#).unwrap();
        assert_eq!(meta.title, "Una Canción");
        assert_eq!(meta.thumbnail, None);
    }
}

//! Proveedor de metadata: expande enlaces de Spotify (pista, álbum,
//! playlist) en consultas de texto plano ANTES de encolar; cada consulta
//! se resuelve después de forma independiente.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Margen para renovar el token antes de su expiración real.
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Track,
    Album,
    Playlist,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Cliente de Spotify con flujo client-credentials. Sin credenciales el
/// bot arranca igual, solo que sin expansión de playlists.
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    link: Regex,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    name: String,
    artists: Vec<ArtistRef>,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackObject>,
}

impl SpotifyClient {
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let link = Regex::new(r"open\.spotify\.com/(track|album|playlist)/([A-Za-z0-9]+)")
            .context("regex de enlaces de Spotify")?;
        Ok(Self {
            http,
            client_id,
            client_secret,
            link,
            token: Mutex::new(None),
        })
    }

    pub fn is_spotify_url(url: &str) -> bool {
        url.contains("open.spotify.com")
    }

    /// Clasifica un enlace y extrae su id, o `None` si no es de Spotify.
    pub fn parse_link(&self, url: &str) -> Option<(LinkKind, String)> {
        let caps = self.link.captures(url)?;
        let kind = match &caps[1] {
            "track" => LinkKind::Track,
            "album" => LinkKind::Album,
            "playlist" => LinkKind::Playlist,
            _ => return None,
        };
        Some((kind, caps[2].to_string()))
    }

    /// Expande un enlace en consultas `"título artista"` listas para el
    /// resolutor. Un enlace irreconocible devuelve lista vacía.
    pub async fn expand(&self, url: &str) -> Result<Vec<String>> {
        let Some((kind, id)) = self.parse_link(url) else {
            return Ok(Vec::new());
        };

        let queries = match kind {
            LinkKind::Track => {
                let track: TrackObject = self.get(&format!("{API_BASE}/tracks/{id}")).await?;
                vec![Self::query_for(&track)]
            }
            LinkKind::Album => {
                let page: Paging<TrackObject> = self
                    .get(&format!("{API_BASE}/albums/{id}/tracks?limit=50"))
                    .await?;
                page.items.iter().map(Self::query_for).collect()
            }
            LinkKind::Playlist => {
                let page: Paging<PlaylistItem> = self
                    .get(&format!("{API_BASE}/playlists/{id}/tracks?limit=100"))
                    .await?;
                page.items
                    .iter()
                    .filter_map(|item| item.track.as_ref())
                    .map(Self::query_for)
                    .collect()
            }
        };

        info!("🎧 Spotify expandió {:?} {} en {} consultas", kind, id, queries.len());
        Ok(queries)
    }

    fn query_for(track: &TrackObject) -> String {
        match track.artists.first() {
            Some(artist) => format!("{} {}", track.name, artist.name),
            None => track.name.clone(),
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let token = self.token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()
            .context("respuesta de la API de Spotify")?;
        Ok(response.json().await?)
    }

    /// Token client-credentials con cache y renovación anticipada.
    async fn token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        debug!("🔑 Renovando token de Spotify");
        let auth = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {auth}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()
            .context("autenticación con Spotify")?
            .json()
            .await?;

        let expires_at = Instant::now() + Duration::from_secs(response.expires_in)
            - TOKEN_MARGIN;
        let value = response.access_token.clone();
        *cached = Some(CachedToken {
            value: response.access_token,
            expires_at,
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> SpotifyClient {
        SpotifyClient::new("id".into(), "secret".into()).unwrap()
    }

    #[test]
    fn parses_track_album_and_playlist_links() {
        let c = client();
        assert_eq!(
            c.parse_link("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT?si=x"),
            Some((LinkKind::Track, "4cOdK2wGLETKBW3PvgPWqT".to_string()))
        );
        assert_eq!(
            c.parse_link("https://open.spotify.com/album/1ATL5GLyefJaxhQzSPVrLX"),
            Some((LinkKind::Album, "1ATL5GLyefJaxhQzSPVrLX".to_string()))
        );
        assert_eq!(
            c.parse_link("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc"),
            Some((LinkKind::Playlist, "37i9dQZF1DXcBWIGoYBM5M".to_string()))
        );
    }

    #[test]
    fn rejects_non_spotify_links() {
        let c = client();
        assert_eq!(c.parse_link("https://www.youtube.com/watch?v=x"), None);
        assert!(!SpotifyClient::is_spotify_url("https://youtu.be/x"));
        assert!(SpotifyClient::is_spotify_url(
            "https://open.spotify.com/track/abc"
        ));
    }

    #[test]
    fn query_includes_first_artist() {
        let track = TrackObject {
            name: "Gurenge".into(),
            artists: vec![
                ArtistRef { name: "LiSA".into() },
                ArtistRef { name: "Otro".into() },
            ],
        };
        assert_eq!(SpotifyClient::query_for(&track), "Gurenge LiSA");
    }
}

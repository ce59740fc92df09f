//! Comandos de diversión: frases de anime y GIFs de reacción via Tenor.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

const TENOR_SEARCH: &str = "https://tenor.googleapis.com/v2/search";

pub const ANIME_QUOTES: &[&str] = &[
    "'If you don't take risks, you can't create a future!' - Monkey D. Luffy",
    "'Hard work is worthless for those that don't believe in themselves.' - Naruto",
    "'Keep moving forward.' - Eren Yeager",
    "'I'll destroy that wall!' - Tanjiro Kamado",
    "'The only one who can beat me is me.' - Saitama",
    "'Believe in the me that believes in you!' - Kamina",
    "'A person can change, at the moment when the person wishes to change.' - Haruhi",
    "'If you don't like your destiny, don't accept it.' - Naruto",
    "'I'm not gonna run away, I never go back on my word!' - Naruto",
    "'The world isn't perfect, but it's there for us trying the best it can.' - Roy Mustang",
];

/// Términos de búsqueda por reacción; se elige uno al azar por invocación.
pub const HUG_SEARCHES: &[&str] = &[
    "anime hug",
    "demon slayer hug",
    "naruto hug",
    "one piece hug",
];

pub fn random_quote() -> &'static str {
    ANIME_QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(ANIME_QUOTES[0])
}

pub fn random_hug_search() -> &'static str {
    HUG_SEARCHES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(HUG_SEARCHES[0])
}

#[derive(Debug, Deserialize)]
struct TenorResponse {
    results: Vec<TenorResult>,
}

#[derive(Debug, Deserialize)]
struct TenorResult {
    media_formats: MediaFormats,
}

#[derive(Debug, Deserialize)]
struct MediaFormats {
    gif: Option<MediaObject>,
}

#[derive(Debug, Deserialize)]
struct MediaObject {
    url: String,
}

/// Busca un GIF en Tenor y devuelve la URL de uno al azar entre los
/// primeros 20 resultados, o `None` si no hubo resultados utilizables.
pub async fn tenor_gif(
    http: &reqwest::Client,
    api_key: &str,
    query: &str,
) -> Result<Option<String>> {
    let url = format!(
        "{TENOR_SEARCH}?q={}&key={}&limit=20&media_filter=gif",
        urlencoding::encode(query),
        api_key
    );

    let response: TenorResponse = http
        .get(&url)
        .send()
        .await?
        .error_for_status()
        .context("respuesta de la API de Tenor")?
        .json()
        .await?;

    let picked = response
        .results
        .choose(&mut rand::thread_rng())
        .and_then(|r| r.media_formats.gif.as_ref())
        .map(|g| g.url.clone());

    debug!("🖼️ Tenor '{}': {} resultados", query, response.results.len());
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn random_quote_comes_from_the_list() {
        for _ in 0..20 {
            assert!(ANIME_QUOTES.contains(&random_quote()));
        }
    }

    #[test]
    fn hug_search_comes_from_the_list() {
        for _ in 0..20 {
            assert!(HUG_SEARCHES.contains(&random_hug_search()));
        }
    }

    #[test]
    fn tenor_payload_parses_missing_gif_format() {
        let raw = r#"{"results":[{"media_formats":{}},{"media_formats":{"gif":{"url":"https://t/a.gif"}}}]}"#;
        let parsed: TenorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert!(parsed.results[0].media_formats.gif.is_none());
        assert_eq!(
            parsed.results[1].media_formats.gif.as_ref().unwrap().url,
            "https://t/a.gif"
        );
    }
}

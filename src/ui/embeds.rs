use serenity::all::Timestamp;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::player::queue::{PlayedEntry, TrackRequest};
use crate::storage::UserSongs;

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const WARNING_ORANGE: Colour = Colour::from_rgb(255, 193, 7);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
    pub const MUSIC_PURPLE: Colour = Colour::from_rgb(138, 43, 226);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎤 Denli Bot";

/// Embed del panel de "reproduciendo ahora".
pub fn now_playing(entry: &PlayedEntry, queue_len: usize, volume: f32) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("🎵 Reproduciendo Ahora")
        .description(format!("**{}**", entry.title))
        .color(colors::MUSIC_PURPLE)
        .field("#️⃣ Número", format!("`{}`", entry.index), true)
        .field("👤 Pedida por", format!("<@{}>", entry.requester_id), true)
        .field("🔊 Volumen", format!("{}%", (volume * 100.0) as u32), true)
        .field("📋 En cola", queue_len.to_string(), true);

    if entry.play_count > 1 {
        embed = embed.field(
            "🔁 Repeticiones",
            format!("{}ª vez en esta sesión", entry.play_count),
            true,
        );
    }

    if let Some(thumbnail) = &entry.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed de la cola pendiente: primeras 10 entradas, el resto resumido
/// en el footer.
pub fn queue(pending: &[TrackRequest], now: Option<&PlayedEntry>) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("📋 Cola de Reproducción")
        .color(colors::INFO_BLUE);

    if let Some(entry) = now {
        embed = embed.description(format!("▶️ **{}** (#{})", entry.title, entry.index));
    }

    if pending.is_empty() {
        embed = embed.field("Pendientes", "La cola está vacía", false);
    } else {
        let listing = pending
            .iter()
            .take(10)
            .enumerate()
            .map(|(i, req)| format!("`{}.` {} — <@{}>", i + 1, req.query, req.requester_id))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field(format!("Pendientes ({})", pending.len()), listing, false);
    }

    let footer = if pending.len() > 10 {
        format!("... y {} más • {}", pending.len() - 10, STANDARD_FOOTER)
    } else {
        STANDARD_FOOTER.to_string()
    };

    embed
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(footer))
}

/// Embed con las canciones más pedidas por un usuario.
pub fn user_stats(stats: &UserSongs) -> CreateEmbed {
    let mut songs: Vec<_> = stats.songs.iter().collect();
    songs.sort_by(|a, b| b.1.play_count.cmp(&a.1.play_count));

    let listing = if songs.is_empty() {
        "Todavía no has pedido ninguna canción".to_string()
    } else {
        songs
            .iter()
            .take(10)
            .enumerate()
            .map(|(i, (title, s))| format!("`{}.` {} — {} veces", i + 1, title, s.play_count))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CreateEmbed::default()
        .title(format!("📊 Canciones de {}", stats.username))
        .description(listing)
        .color(colors::SUCCESS_GREEN)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Aviso corto de éxito.
pub fn notice(title: &str, text: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title(title.to_string())
        .description(text.to_string())
        .color(colors::SUCCESS_GREEN)
}

/// Aviso corto de error.
pub fn error_notice(text: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title("❌ Error")
        .description(text.to_string())
        .color(colors::ERROR_RED)
}

/// Aviso corto de advertencia.
pub fn warning_notice(text: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title("⚠️ Atención")
        .description(text.to_string())
        .color(colors::WARNING_ORANGE)
}

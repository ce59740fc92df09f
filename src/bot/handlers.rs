//! Despacho de comandos slash y botones del panel.
//!
//! Todo handler responde SIEMPRE algo al usuario: los errores esperables
//! ([`SessionError`]) se traducen a avisos efímeros, nunca a un pánico ni
//! a una interacción colgada.

use anyhow::Result;
use serenity::{
    builder::{
        CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
        EditInteractionResponse,
    },
    model::{
        application::{CommandDataOptionValue, CommandInteraction, ComponentInteraction},
        id::{ChannelId, GuildId, UserId},
    },
    prelude::Context,
};
use songbird::Call;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::{
    bot::DenliBot,
    fun,
    player::{EnqueueOutcome, PlaybackSession, PlaybackState, SessionError, TrackRequest},
    resolver::SpotifyClient,
    tts,
    ui::{buttons::PanelAction, embeds, PanelControls},
};

/// Maneja comandos slash
pub async fn handle_command(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
) -> Result<()> {
    let guild_id = command
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Comando usado fuera de un servidor"))?;

    info!(
        "📝 Comando /{} usado por {} en guild {}",
        command.data.name, command.user.name, guild_id
    );

    match command.data.name.as_str() {
        "play" => handle_play(ctx, command, bot, guild_id).await?,
        "skip" => handle_skip(ctx, command, bot, guild_id).await?,
        "stop" => handle_stop(ctx, command, bot, guild_id).await?,
        "pause" => handle_pause(ctx, command, bot, guild_id).await?,
        "resume" => handle_resume(ctx, command, bot, guild_id).await?,
        "queue" => handle_queue(ctx, command, bot, guild_id).await?,
        "shuffle" => handle_shuffle(ctx, command, bot, guild_id).await?,
        "replay" => handle_replay(ctx, command, bot, guild_id).await?,
        "leave" => handle_leave(ctx, command, bot, guild_id).await?,
        "say" => handle_say(ctx, command, bot, guild_id).await?,
        "setmusicchannel" => handle_set_music_channel(ctx, command, bot, guild_id).await?,
        "clearmusicchannel" => handle_clear_music_channel(ctx, command, bot, guild_id).await?,
        "setfunchannel" => handle_set_fun_channel(ctx, command, bot, guild_id).await?,
        "clearfunchannel" => handle_clear_fun_channel(ctx, command, bot, guild_id).await?,
        "mystats" => handle_my_stats(ctx, command, bot).await?,
        "animequote" => handle_anime_quote(ctx, command, bot, guild_id).await?,
        "hug" => handle_hug(ctx, command, bot, guild_id).await?,
        _ => {
            ephemeral(ctx, &command, "❌ Comando no reconocido").await?;
        }
    }

    Ok(())
}

/// Maneja los botones del panel de control
pub async fn handle_component(
    ctx: &Context,
    component: ComponentInteraction,
    bot: &DenliBot,
) -> Result<()> {
    let guild_id = component
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Componente usado fuera de un servidor"))?;

    let Some(action) = PanelAction::from_custom_id(&component.data.custom_id) else {
        // Botón de un mensaje viejo de otra versión; se ignora con aviso.
        return component_notice(ctx, &component, "❌ Acción no reconocida").await;
    };

    info!(
        "🔘 Botón {:?} presionado por {} en guild {}",
        action, component.user.name, guild_id
    );

    let session = bot.players.session(guild_id);

    let text = match action {
        PanelAction::PauseResume => match session.state() {
            PlaybackState::Playing => match session.pause() {
                Ok(()) => "⏸️ Pausado".to_string(),
                Err(e) => friendly(&e),
            },
            PlaybackState::Paused => match session.resume() {
                Ok(()) => "▶️ Reanudado".to_string(),
                Err(e) => friendly(&e),
            },
            _ => friendly(&SessionError::NothingPlaying),
        },
        PanelAction::Skip => match session.skip() {
            Ok(()) => "⏭️ Saltado".to_string(),
            Err(e) => friendly(&e),
        },
        PanelAction::Stop => {
            session.stop();
            "⏹️ Detenido y cola limpiada".to_string()
        }
        PanelAction::Shuffle => match session.shuffle() {
            Ok(n) => format!("🔀 {} canciones mezcladas", n),
            Err(e) => friendly(&e),
        },
        PanelAction::VolumeUp => {
            let v = session.adjust_volume(0.1);
            format!("🔊 Volumen: {}%", (v * 100.0) as u32)
        }
        PanelAction::VolumeDown => {
            let v = session.adjust_volume(-0.1);
            format!("🔉 Volumen: {}%", (v * 100.0) as u32)
        }
        PanelAction::Replay => {
            // Re-resolver tarda más que la ventana de respuesta del botón.
            component
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Defer(
                        CreateInteractionResponseMessage::new().ephemeral(true),
                    ),
                )
                .await?;
            let text = match guild_call(ctx, guild_id).await {
                Some(call) => match session.replay(None, call).await {
                    Ok(entry) => format!("🔁 Repitiendo: {}", entry.title),
                    Err(e) => friendly(&e),
                },
                None => "❌ No estoy conectado a un canal de voz".to_string(),
            };
            component
                .edit_response(&ctx.http, EditInteractionResponse::new().content(text))
                .await?;
            return Ok(());
        }
        PanelAction::ShowQueue => {
            let embed = embeds::queue(&session.queue_snapshot(), session.now_playing().as_ref());
            return component
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .embed(embed)
                            .ephemeral(true),
                    ),
                )
                .await
                .map_err(Into::into);
        }
        PanelAction::Leave => {
            session.stop();
            if let Some(songbird) = songbird::get(ctx).await {
                bot.voice.disconnect(&songbird, guild_id).await;
            }
            "👋 Hasta luego!".to_string()
        }
    };

    component_notice(ctx, &component, &text).await
}

// Handlers de música

async fn handle_play(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let query = command
        .data
        .options
        .iter()
        .find(|opt| opt.name == "query")
        .and_then(|opt| opt.value.as_str())
        .ok_or_else(|| anyhow::anyhow!("Query no proporcionado"))?
        .to_string();

    // Resolver y conectar puede tardar más que la ventana de respuesta.
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let Some(voice_channel) = user_voice_channel(ctx, guild_id, command.user.id) else {
        return edit_with_embed(
            ctx,
            &command,
            embeds::warning_notice("Debes estar en un canal de voz para pedir música"),
        )
        .await;
    };

    let session = bot.players.session(guild_id);

    let songbird = songbird::get(ctx)
        .await
        .ok_or_else(|| anyhow::anyhow!("Songbird no inicializado"))?;
    let call = match bot
        .voice
        .move_or_reconnect(&songbird, guild_id, voice_channel)
        .await
    {
        Ok(call) => call,
        Err(e) => {
            // Aún no se encoló nada, así que la sesión no tiene ninguna
            // reserva de arranque que deshacer.
            return edit_with_embed(ctx, &command, embeds::error_notice(&e.to_string())).await;
        }
    };

    // Un enlace de Spotify se expande a consultas de texto antes de encolar.
    let queries = match expand_if_spotify(bot, &query).await {
        Ok(qs) => qs,
        Err(text) => {
            return edit_with_embed(ctx, &command, embeds::error_notice(&text)).await;
        }
    };

    let mut enqueued = 0usize;
    let mut start = false;
    let mut first_position = 0usize;
    for q in &queries {
        let request = TrackRequest {
            query: q.clone(),
            requester_id: command.user.id,
            requester_name: command.user.name.clone(),
        };
        match session.enqueue(request) {
            Ok(EnqueueOutcome::StartPlayback(pos)) => {
                start = true;
                if enqueued == 0 {
                    first_position = pos;
                }
                enqueued += 1;
            }
            Ok(EnqueueOutcome::Queued(pos)) => {
                if enqueued == 0 {
                    first_position = pos;
                }
                enqueued += 1;
            }
            Err(SessionError::QueueFull(limit)) => {
                warn!("📋 Cola llena en guild {} (límite {})", guild_id, limit);
                break;
            }
            Err(e) => {
                warn!("Error encolando '{}' en guild {}: {}", q, guild_id, e);
                break;
            }
        }
    }

    if enqueued == 0 {
        return edit_with_embed(
            ctx,
            &command,
            embeds::error_notice("No se pudo encolar nada (¿cola llena?)"),
        )
        .await;
    }

    // Estadísticas persistentes por usuario, una por consulta encolada.
    {
        let mut storage = bot.storage.lock().await;
        for q in queries.iter().take(enqueued) {
            if let Err(e) = storage
                .track_user_song(command.user.id.get(), &command.user.name, q)
                .await
            {
                warn!("No se pudo registrar estadística: {}", e);
            }
        }
    }

    if start {
        spawn_playback(ctx, bot, &session, call, guild_id);
    }

    let text = if enqueued == 1 {
        format!("**{}** agregada en la posición `{}`", queries[0], first_position)
    } else {
        format!("**{}** canciones agregadas a la cola", enqueued)
    };
    edit_with_embed(ctx, &command, embeds::notice("➕ A la cola", &text)).await
}

async fn handle_skip(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let session = bot.players.session(guild_id);
    match session.skip() {
        Ok(()) => ephemeral(ctx, &command, "⏭️ Saltado").await,
        Err(e) => ephemeral(ctx, &command, &friendly(&e)).await,
    }
}

async fn handle_stop(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    bot.players.session(guild_id).stop();
    ephemeral(ctx, &command, "⏹️ Reproducción detenida y cola limpiada").await
}

async fn handle_pause(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    match bot.players.session(guild_id).pause() {
        Ok(()) => ephemeral(ctx, &command, "⏸️ Pausado").await,
        Err(e) => ephemeral(ctx, &command, &friendly(&e)).await,
    }
}

async fn handle_resume(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    match bot.players.session(guild_id).resume() {
        Ok(()) => ephemeral(ctx, &command, "▶️ Reanudado").await,
        Err(e) => ephemeral(ctx, &command, &friendly(&e)).await,
    }
}

async fn handle_queue(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let session = bot.players.session(guild_id);
    let embed = embeds::queue(&session.queue_snapshot(), session.now_playing().as_ref());
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed),
            ),
        )
        .await?;
    Ok(())
}

async fn handle_shuffle(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    match bot.players.session(guild_id).shuffle() {
        Ok(n) => ephemeral(ctx, &command, &format!("🔀 {} canciones mezcladas", n)).await,
        Err(e) => ephemeral(ctx, &command, &friendly(&e)).await,
    }
}

async fn handle_replay(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let number = command
        .data
        .options
        .iter()
        .find(|opt| opt.name == "numero")
        .and_then(|opt| opt.value.as_i64())
        .map(|n| n as u64);

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let Some(call) = guild_call(ctx, guild_id).await else {
        return edit_with_embed(
            ctx,
            &command,
            embeds::warning_notice("No estoy conectado a un canal de voz"),
        )
        .await;
    };

    let session = bot.players.session(guild_id);
    match session.replay(number, call).await {
        Ok(entry) => {
            let embed = embeds::now_playing(&entry, session.queue_len(), session.volume());
            edit_with_embed(ctx, &command, embed).await
        }
        Err(e) => edit_with_embed(ctx, &command, embeds::error_notice(&friendly(&e))).await,
    }
}

async fn handle_leave(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    bot.players.session(guild_id).stop();
    if let Some(songbird) = songbird::get(ctx).await {
        bot.voice.disconnect(&songbird, guild_id).await;
    }
    ephemeral(ctx, &command, "👋 Hasta luego!").await
}

// TTS

async fn handle_say(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let text = command
        .data
        .options
        .iter()
        .find(|opt| opt.name == "texto")
        .and_then(|opt| opt.value.as_str())
        .ok_or_else(|| anyhow::anyhow!("Texto no proporcionado"))?
        .to_string();
    let character = command
        .data
        .options
        .iter()
        .find(|opt| opt.name == "voz")
        .and_then(|opt| opt.value.as_str())
        .unwrap_or("girl")
        .to_string();

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let Some(voice_channel) = user_voice_channel(ctx, guild_id, command.user.id) else {
        return edit_with_embed(
            ctx,
            &command,
            embeds::warning_notice("Debes estar en un canal de voz para usar TTS"),
        )
        .await;
    };

    let songbird = songbird::get(ctx)
        .await
        .ok_or_else(|| anyhow::anyhow!("Songbird no inicializado"))?;
    let call = match bot
        .voice
        .move_or_reconnect(&songbird, guild_id, voice_channel)
        .await
    {
        Ok(call) => call,
        Err(e) => {
            return edit_with_embed(ctx, &command, embeds::error_notice(&e.to_string())).await;
        }
    };

    // El TTS interrumpe la música sin consumir cola; la sesión queda lista
    // para retomar con /play o los botones.
    let session = bot.players.session(guild_id);
    if session.interrupt() {
        info!("🗣️ Música interrumpida por TTS en guild {}", guild_id);
    }

    let path = match bot.tts.synthesize(&text, &character).await {
        Ok(path) => path,
        Err(e) => {
            warn!("TTS falló en guild {}: {}", guild_id, e);
            return edit_with_embed(
                ctx,
                &command,
                embeds::error_notice("No se pudo sintetizar el audio"),
            )
            .await;
        }
    };

    let track = {
        let mut sink = call.lock().await;
        sink.play_input(songbird::input::File::new(path.clone()).into())
    };
    let _ = track.set_volume(bot.config.tts_volume);
    for event in tts::cleanup_events() {
        let _ = track.add_event(event, tts::TtsCleanup { path: path.clone() });
    }

    edit_with_embed(
        ctx,
        &command,
        embeds::notice(&format!("🗣️ {} dice", character), &text),
    )
    .await
}

// Configuración y estadísticas

async fn handle_set_music_channel(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    bot.storage
        .lock()
        .await
        .set_music_channel(guild_id.get(), command.channel_id.get())
        .await?;
    ephemeral(
        ctx,
        &command,
        "📌 Este canal es ahora el canal de música: aquí aparecerá el panel de control",
    )
    .await
}

async fn handle_clear_music_channel(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let removed = bot
        .storage
        .lock()
        .await
        .clear_music_channel(guild_id.get())
        .await?;
    let text = if removed {
        "🧹 Canal de música desconfigurado"
    } else {
        "No había canal de música configurado"
    };
    ephemeral(ctx, &command, text).await
}

async fn handle_set_fun_channel(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    bot.storage
        .lock()
        .await
        .set_fun_channel(guild_id.get(), command.channel_id.get())
        .await?;
    ephemeral(
        ctx,
        &command,
        "🎲 Este canal es ahora el canal de diversión del servidor",
    )
    .await
}

async fn handle_clear_fun_channel(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    let removed = bot
        .storage
        .lock()
        .await
        .clear_fun_channel(guild_id.get())
        .await?;
    let text = if removed {
        "🧹 Canal de diversión desconfigurado"
    } else {
        "No había canal de diversión configurado"
    };
    ephemeral(ctx, &command, text).await
}

async fn handle_my_stats(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
) -> Result<()> {
    let embed = {
        let storage = bot.storage.lock().await;
        match storage.user_stats(command.user.id.get()) {
            Some(stats) => embeds::user_stats(stats),
            None => embeds::warning_notice("Todavía no has pedido ninguna canción"),
        }
    };
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed).ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

// Diversión

/// Si la guild tiene canal de diversión fijado, los comandos de diversión
/// solo responden ahí.
async fn fun_channel_allows(
    bot: &DenliBot,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> bool {
    let storage = bot.storage.lock().await;
    match storage.fun_channel(guild_id.get()) {
        Some(locked) => locked == channel_id.get(),
        None => true,
    }
}

async fn handle_anime_quote(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    if !fun_channel_allows(bot, guild_id, command.channel_id).await {
        return ephemeral(ctx, &command, "🎲 Usa el canal de diversión del servidor").await;
    }
    let embed = embeds::notice("✨ Frase de anime", fun::random_quote());
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed),
            ),
        )
        .await?;
    Ok(())
}

async fn handle_hug(
    ctx: &Context,
    command: CommandInteraction,
    bot: &DenliBot,
    guild_id: GuildId,
) -> Result<()> {
    if !fun_channel_allows(bot, guild_id, command.channel_id).await {
        return ephemeral(ctx, &command, "🎲 Usa el canal de diversión del servidor").await;
    }
    let target = command
        .data
        .options
        .iter()
        .find(|opt| opt.name == "usuario")
        .and_then(|opt| match opt.value {
            CommandDataOptionValue::User(user_id) => Some(user_id),
            _ => None,
        });

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let message = match target {
        Some(user_id) if user_id == command.user.id => {
            format!("**{}** se abraza a sí mismo! 🤗", command.user.name)
        }
        Some(user_id) => format!("**{}** abraza a <@{}>! 🤗💕", command.user.name, user_id),
        None => format!("**{}** quiere un abrazo! 🤗", command.user.name),
    };

    let mut embed = embeds::notice("🤗 Abrazo", &message);
    if let Some(api_key) = &bot.config.tenor_api_key {
        match fun::tenor_gif(&bot.http, api_key, fun::random_hug_search()).await {
            Ok(Some(url)) => embed = embed.image(url),
            Ok(None) => {}
            Err(e) => warn!("Tenor falló: {}", e),
        }
    }

    edit_with_embed(ctx, &command, embed).await
}

// Ayudantes

/// Canal de voz donde está el usuario, según la caché de la gateway.
fn user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = guild_id.to_guild_cached(&ctx.cache)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}

/// Conexión de voz viva de la guild, si existe.
async fn guild_call(ctx: &Context, guild_id: GuildId) -> Option<Arc<AsyncMutex<Call>>> {
    songbird::get(ctx).await.and_then(|sb| sb.get(guild_id))
}

/// Expande un enlace de Spotify en consultas; cualquier otra entrada pasa
/// tal cual como consulta única.
async fn expand_if_spotify(bot: &DenliBot, query: &str) -> Result<Vec<String>, String> {
    if !SpotifyClient::is_spotify_url(query) {
        return Ok(vec![query.to_string()]);
    }
    let Some(spotify) = &bot.spotify else {
        return Err("Los enlaces de Spotify requieren credenciales configuradas".to_string());
    };
    match spotify.expand(query).await {
        Ok(queries) if queries.is_empty() => {
            Err("No reconozco ese enlace de Spotify".to_string())
        }
        Ok(queries) => Ok(queries),
        Err(e) => {
            warn!("Spotify falló expandiendo '{}': {}", query, e);
            Err("No se pudo leer el enlace de Spotify".to_string())
        }
    }
}

/// Arranca el avance en segundo plano y, al sonar la primera pista,
/// publica el panel de control si la guild tiene canal de música fijado.
fn spawn_playback(
    ctx: &Context,
    bot: &DenliBot,
    session: &Arc<PlaybackSession>,
    call: Arc<AsyncMutex<Call>>,
    guild_id: GuildId,
) {
    let ctx = ctx.clone();
    let session = session.clone();
    let storage = bot.storage.clone();

    tokio::spawn(async move {
        session.play_next(call).await;

        let Some(entry) = session.now_playing() else {
            return;
        };
        let channel = { storage.lock().await.music_channel(guild_id.get()) };
        if let Some(channel_id) = channel {
            let message = CreateMessage::new()
                .embed(embeds::now_playing(
                    &entry,
                    session.queue_len(),
                    session.volume(),
                ))
                .components(PanelControls::rows(false));
            if let Err(e) = ChannelId::new(channel_id).send_message(&ctx.http, message).await {
                warn!("No se pudo publicar el panel en guild {}: {}", guild_id, e);
            }
        }
    });
}

/// Mensajes amables para los errores esperables de la sesión.
fn friendly(error: &SessionError) -> String {
    match error {
        SessionError::NothingPlaying => "🔇 No hay nada reproduciéndose".to_string(),
        SessionError::InvalidState => "🤷 Esa acción no aplica ahora mismo".to_string(),
        SessionError::NotFound => "🔍 No existe una canción con ese número".to_string(),
        SessionError::EmptyQueue => "📭 La cola está vacía".to_string(),
        SessionError::QueueFull(limit) => format!("📋 La cola está llena (máximo {})", limit),
        SessionError::ResolutionFailed => "💥 No se pudo resolver esa canción".to_string(),
        SessionError::Superseded => "⏩ Otra acción más reciente tomó el control".to_string(),
    }
}

async fn ephemeral(ctx: &Context, command: &CommandInteraction, text: &str) -> Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn component_notice(
    ctx: &Context,
    component: &ComponentInteraction,
    text: &str,
) -> Result<()> {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn edit_with_embed(
    ctx: &Context,
    command: &CommandInteraction,
    embed: serenity::builder::CreateEmbed,
) -> Result<()> {
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().embed(embed))
        .await?;
    Ok(())
}

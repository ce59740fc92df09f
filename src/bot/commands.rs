use anyhow::Result;
use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{application::CommandOptionType, id::GuildId},
    prelude::Context,
};

use crate::tts;

fn all_commands() -> Vec<CreateCommand> {
    vec![
        play_command(),
        skip_command(),
        stop_command(),
        pause_command(),
        resume_command(),
        queue_command(),
        shuffle_command(),
        replay_command(),
        leave_command(),
        say_command(),
        setmusicchannel_command(),
        clearmusicchannel_command(),
        setfunchannel_command(),
        clearfunchannel_command(),
        mystats_command(),
        animequote_command(),
        hug_command(),
    ]
}

/// Registra comandos globales
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    for command in all_commands() {
        ctx.http.create_global_command(&command).await?;
    }
    Ok(())
}

/// Registra comandos para una guild específica (desarrollo)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    guild_id.set_commands(&ctx.http, all_commands()).await?;
    Ok(())
}

// Comandos de música

fn play_command() -> CreateCommand {
    CreateCommand::new("play")
        .description("Reproduce una canción o agrega a la cola")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "query",
                "URL o término de búsqueda (YouTube/Spotify)",
            )
            .required(true),
        )
}

fn skip_command() -> CreateCommand {
    CreateCommand::new("skip").description("Salta a la siguiente canción")
}

fn stop_command() -> CreateCommand {
    CreateCommand::new("stop").description("Detiene la reproducción y limpia la cola")
}

fn pause_command() -> CreateCommand {
    CreateCommand::new("pause").description("Pausa la reproducción actual")
}

fn resume_command() -> CreateCommand {
    CreateCommand::new("resume").description("Reanuda la reproducción pausada")
}

fn queue_command() -> CreateCommand {
    CreateCommand::new("queue").description("Muestra la cola de reproducción")
}

fn shuffle_command() -> CreateCommand {
    CreateCommand::new("shuffle").description("Mezcla las canciones pendientes de la cola")
}

fn replay_command() -> CreateCommand {
    CreateCommand::new("replay")
        .description("Repite la canción actual o una del historial")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "numero",
                "Número de la canción en el historial",
            )
            .min_int_value(1),
        )
}

fn leave_command() -> CreateCommand {
    CreateCommand::new("leave").description("Desconecta el bot del canal de voz")
}

// TTS

fn say_command() -> CreateCommand {
    let mut voice_option = CreateCommandOption::new(
        CommandOptionType::String,
        "voz",
        "Personaje con el que hablar",
    );
    for character in tts::CHARACTERS {
        voice_option = voice_option.add_string_choice(*character, *character);
    }

    CreateCommand::new("say")
        .description("Habla en el canal de voz con voz de personaje")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "texto", "Qué decir")
                .required(true),
        )
        .add_option(voice_option)
}

// Configuración y estadísticas

fn setmusicchannel_command() -> CreateCommand {
    CreateCommand::new("setmusicchannel")
        .description("Fija este canal como canal de música del servidor")
}

fn clearmusicchannel_command() -> CreateCommand {
    CreateCommand::new("clearmusicchannel")
        .description("Quita el canal de música configurado")
}

fn setfunchannel_command() -> CreateCommand {
    CreateCommand::new("setfunchannel")
        .description("Fija este canal como canal de diversión del servidor")
}

fn clearfunchannel_command() -> CreateCommand {
    CreateCommand::new("clearfunchannel")
        .description("Quita el canal de diversión configurado")
}

fn mystats_command() -> CreateCommand {
    CreateCommand::new("mystats").description("Muestra tus canciones más pedidas")
}

// Diversión

fn animequote_command() -> CreateCommand {
    CreateCommand::new("animequote").description("Una frase inspiradora de anime")
}

fn hug_command() -> CreateCommand {
    CreateCommand::new("hug")
        .description("Abraza a alguien (o pide un abrazo)")
        .add_option(CreateCommandOption::new(
            CommandOptionType::User,
            "usuario",
            "A quién abrazar",
        ))
}

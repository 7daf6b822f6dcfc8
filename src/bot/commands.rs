use anyhow::Result;
use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{
        application::{CommandDataOptionValue, CommandInteraction, CommandOptionType},
        channel::ChannelType,
        id::{ChannelId, GuildId},
    },
    prelude::Context,
};
use thiserror::Error;

/// Canciones por página en el listado de la cola
pub const QUEUE_PAGE_SIZE: usize = 10;

/// Comando de música ya interpretado, venga de un slash command, un prefijo o un botón.
#[derive(Debug, Clone, PartialEq)]
pub enum MusicCommand {
    /// Canal de destino; `None` usa el canal de voz de quien invoca.
    Join(Option<ChannelId>),
    Play(String),
    Pause,
    Resume,
    Skip,
    /// 1-indexed position; `None` removes the most recently queued track.
    Remove(Option<usize>),
    Clear,
    /// 1-indexed page.
    Queue(usize),
    NowPlaying,
    /// Percent in 1–100; `None` asks for the current volume.
    Volume(Option<f32>),
    Leave,
    Help,
}

impl MusicCommand {
    pub fn name(&self) -> &'static str {
        match self {
            MusicCommand::Join(_) => "join",
            MusicCommand::Play(_) => "play",
            MusicCommand::Pause => "pause",
            MusicCommand::Resume => "resume",
            MusicCommand::Skip => "skip",
            MusicCommand::Remove(_) => "remove",
            MusicCommand::Clear => "clear",
            MusicCommand::Queue(_) => "queue",
            MusicCommand::NowPlaying => "nowplaying",
            MusicCommand::Volume(_) => "volume",
            MusicCommand::Leave => "leave",
            MusicCommand::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Debes indicar una canción o URL")]
    MissingQuery,

    #[error("\"{0}\" no es un número válido")]
    InvalidNumber(String),

    #[error("\"{0}\" no es un canal válido")]
    InvalidChannel(String),

    #[error("Comando no reconocido: {0}")]
    Unknown(String),
}

/// Interpreta un slash command recibido.
pub fn from_interaction(command: &CommandInteraction) -> Result<MusicCommand, ParseError> {
    let option = |name: &str| {
        command
            .data
            .options
            .iter()
            .find(|opt| opt.name == name)
            .map(|opt| &opt.value)
    };

    let parsed = match command.data.name.as_str() {
        "join" => {
            MusicCommand::Join(option("channel").and_then(CommandDataOptionValue::as_channel_id))
        }
        "play" => {
            let query = option("query")
                .and_then(CommandDataOptionValue::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or(ParseError::MissingQuery)?;
            MusicCommand::Play(query.to_string())
        }
        "pause" => MusicCommand::Pause,
        "resume" => MusicCommand::Resume,
        "skip" => MusicCommand::Skip,
        "remove" => MusicCommand::Remove(positive(option("position"))?),
        "clear" => MusicCommand::Clear,
        "queue" => MusicCommand::Queue(positive(option("page"))?.unwrap_or(1)),
        "nowplaying" => MusicCommand::NowPlaying,
        "volume" => MusicCommand::Volume(
            option("level")
                .and_then(CommandDataOptionValue::as_f64)
                .map(|level| level as f32),
        ),
        "leave" => MusicCommand::Leave,
        "help" => MusicCommand::Help,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(parsed)
}

fn positive(value: Option<&CommandDataOptionValue>) -> Result<Option<usize>, ParseError> {
    match value.and_then(CommandDataOptionValue::as_i64) {
        None => Ok(None),
        Some(n) => usize::try_from(n)
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber(n.to_string())),
    }
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

fn all_commands() -> Vec<CreateCommand> {
    vec![
        join_command(),
        play_command(),
        pause_command(),
        resume_command(),
        skip_command(),
        remove_command(),
        clear_command(),
        queue_command(),
        nowplaying_command(),
        volume_command(),
        leave_command(),
        help_command(),
    ]
}

// Comandos de reproducción

fn join_command() -> CreateCommand {
    CreateCommand::new("join")
        .description("Conecta el bot a tu canal de voz o al indicado")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Channel,
                "channel",
                "Canal de voz (por defecto el tuyo)",
            )
            .channel_types(vec![ChannelType::Voice, ChannelType::Stage]),
        )
}

fn play_command() -> CreateCommand {
    CreateCommand::new("play")
        .description("Reproduce una canción o playlist")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "query",
                "URL o término de búsqueda",
            )
            .required(true),
        )
}

// Comandos de control

fn pause_command() -> CreateCommand {
    CreateCommand::new("pause").description("Pausa la reproducción actual")
}

fn resume_command() -> CreateCommand {
    CreateCommand::new("resume").description("Reanuda la reproducción pausada")
}

fn skip_command() -> CreateCommand {
    CreateCommand::new("skip").description("Salta a la siguiente canción")
}

fn volume_command() -> CreateCommand {
    CreateCommand::new("volume")
        .description("Muestra o ajusta el volumen")
        .add_option(CreateCommandOption::new(
            CommandOptionType::Number,
            "level",
            "Nivel de volumen (1-100)",
        ))
}

fn leave_command() -> CreateCommand {
    CreateCommand::new("leave").description("Desconecta el bot y descarta la cola")
}

// Comandos de cola

fn remove_command() -> CreateCommand {
    CreateCommand::new("remove")
        .description("Elimina una canción de la cola (por defecto la última agregada)")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "position",
                "Posición en la cola",
            )
            .min_int_value(1),
        )
}

fn clear_command() -> CreateCommand {
    CreateCommand::new("clear").description("Limpia la cola de reproducción")
}

fn queue_command() -> CreateCommand {
    CreateCommand::new("queue")
        .description("Muestra la cola de reproducción")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "page", "Número de página")
                .min_int_value(1),
        )
}

fn nowplaying_command() -> CreateCommand {
    CreateCommand::new("nowplaying").description("Muestra la canción actual")
}

// Comandos de información

fn help_command() -> CreateCommand {
    CreateCommand::new("help").description("Muestra la ayuda del bot")
}

use anyhow::Result;
use serenity::{
    builder::{
        CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
        EditInteractionResponse,
    },
    model::{
        application::{CommandInteraction, ComponentInteraction},
        channel::{ChannelType, Message},
        id::{ChannelId, GuildId, UserId},
    },
    prelude::Context,
};
use thiserror::Error;
use tracing::{debug, info};

use super::{
    commands::{self, MusicCommand, ParseError},
    prefix, JoinOutcome, MusicBot,
};
use crate::{
    audio::session::{PlaybackSession, PlayerState, SessionError},
    sources::ResolveError,
    ui::{buttons, embeds},
};

/// Errores que se muestran al usuario tal cual
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Este comando solo funciona en servidores")]
    GuildOnly,

    #[error("Debes estar en un canal de voz")]
    NotInVoice,

    #[error("No estoy conectado a un canal de voz")]
    NotConnected,

    #[error("<#{0}> no es un canal de voz de este servidor")]
    NotVoiceChannel(ChannelId),

    #[error("No se pudo conectar al canal de voz: {0}")]
    Join(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Quién invocó un comando y dónde
#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Embed(CreateEmbed),
    /// Embed con los controles del reproductor
    Player(CreateEmbed),
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    fn is_error(&self) -> bool {
        matches!(self, Reply::Text(content) if content.starts_with('❌'))
    }

    fn into_response(self) -> CreateInteractionResponseMessage {
        let message = CreateInteractionResponseMessage::new();
        match self {
            Reply::Text(content) => message.content(content),
            Reply::Embed(embed) => message.embed(embed),
            Reply::Player(embed) => message.embed(embed).components(buttons::player_buttons()),
        }
    }

    fn into_edit(self) -> EditInteractionResponse {
        let edit = EditInteractionResponse::new();
        match self {
            Reply::Text(content) => edit.content(content),
            Reply::Embed(embed) => edit.embed(embed),
            Reply::Player(embed) => edit.embed(embed).components(buttons::player_buttons()),
        }
    }

    fn into_message(self) -> CreateMessage {
        let message = CreateMessage::new();
        match self {
            Reply::Text(content) => message.content(content),
            Reply::Embed(embed) => message.embed(embed),
            Reply::Player(embed) => message.embed(embed).components(buttons::player_buttons()),
        }
    }
}

impl From<CommandError> for Reply {
    fn from(error: CommandError) -> Self {
        Reply::Text(format!("❌ {}", error))
    }
}

/// Maneja comandos slash
pub async fn handle_command(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MusicBot,
) -> Result<()> {
    let Some(guild_id) = command.guild_id else {
        return respond_ephemeral(ctx, &command, CommandError::GuildOnly.into()).await;
    };

    info!(
        "📝 Comando /{} usado por {} en guild {}",
        command.data.name, command.user.name, guild_id
    );

    let parsed = match commands::from_interaction(&command) {
        Ok(parsed) => parsed,
        Err(e) => return respond_ephemeral(ctx, &command, CommandError::from(e).into()).await,
    };

    // Defer la respuesta ya que play puede tomar tiempo
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let invocation = Invocation {
        guild_id,
        channel_id: command.channel_id,
        user_id: command.user.id,
    };
    let reply = execute(ctx, bot, invocation, parsed).await;

    command.edit_response(&ctx.http, reply.into_edit()).await?;

    Ok(())
}

/// Maneja los botones del reproductor
pub async fn handle_component(
    ctx: &Context,
    component: ComponentInteraction,
    bot: &MusicBot,
) -> Result<()> {
    let Some(command) = buttons::command_for_button(&component.data.custom_id) else {
        debug!("Botón desconocido: {}", component.data.custom_id);
        return Ok(());
    };

    let reply = match component.guild_id {
        None => CommandError::GuildOnly.into(),
        Some(guild_id) => {
            info!(
                "🔘 Botón {} presionado por {} en guild {}",
                component.data.custom_id, component.user.name, guild_id
            );

            let invocation = Invocation {
                guild_id,
                channel_id: component.channel_id,
                user_id: component.user.id,
            };
            execute(ctx, bot, invocation, command).await
        }
    };

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(reply.into_response().ephemeral(true)),
        )
        .await?;

    Ok(())
}

/// Maneja comandos de texto con prefijo
pub async fn handle_message(ctx: &Context, msg: &Message, bot: &MusicBot) -> Result<()> {
    let Some(parsed) = prefix::parse(&msg.content, &bot.config().command_prefix) else {
        return Ok(());
    };

    let reply = match (msg.guild_id, parsed) {
        (None, _) => CommandError::GuildOnly.into(),
        (Some(_), Err(e)) => CommandError::from(e).into(),
        (Some(guild_id), Ok(command)) => {
            info!(
                "📝 Comando {}{} usado por {} en guild {}",
                bot.config().command_prefix,
                command.name(),
                msg.author.name,
                guild_id
            );

            let invocation = Invocation {
                guild_id,
                channel_id: msg.channel_id,
                user_id: msg.author.id,
            };
            execute(ctx, bot, invocation, command).await
        }
    };

    msg.channel_id
        .send_message(&ctx.http, reply.into_message())
        .await?;

    Ok(())
}

async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, reply: Reply) -> Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(reply.into_response().ephemeral(true)),
        )
        .await?;

    Ok(())
}

/// Ejecuta un comando ya interpretado. Los errores del usuario vuelven como respuesta.
pub async fn execute(
    ctx: &Context,
    bot: &MusicBot,
    invocation: Invocation,
    command: MusicCommand,
) -> Reply {
    let name = command.name();
    let reply = match command {
        MusicCommand::Join(channel) => handle_join(ctx, bot, invocation, channel).await,
        MusicCommand::Play(query) => handle_play(ctx, bot, invocation, &query).await,
        MusicCommand::Leave => handle_leave(bot, invocation).await,
        MusicCommand::Help => Ok(Reply::Embed(embeds::help_embed(
            &bot.config().command_prefix,
        ))),
        command => bot
            .registry()
            .get(invocation.guild_id)
            .ok_or(CommandError::NotConnected)
            .and_then(|session| control(&session, command)),
    };

    let reply = reply.unwrap_or_else(Reply::from);
    if reply.is_error() {
        debug!("Comando {} rechazado en guild {}: {:?}", name, invocation.guild_id, reply);
    }
    reply
}

async fn handle_join(
    ctx: &Context,
    bot: &MusicBot,
    invocation: Invocation,
    channel: Option<ChannelId>,
) -> Result<Reply, CommandError> {
    let voice_channel = match channel {
        Some(channel) => guild_voice_channel(ctx, invocation.guild_id, channel)?,
        None => user_voice_channel(ctx, invocation.guild_id, invocation.user_id)?,
    };

    // La sesión primero: si la anterior se está cerrando, hay que esperar a que suelte la voz
    bot.ensure_session(ctx, invocation.guild_id, invocation.channel_id)
        .await?;
    let outcome = bot
        .join_voice_channel(ctx, invocation.guild_id, voice_channel)
        .await?;

    Ok(Reply::text(match outcome {
        JoinOutcome::Joined => format!("🔊 Conectado a <#{}>", voice_channel),
        JoinOutcome::Moved => format!("🔀 Me moví a <#{}>", voice_channel),
        JoinOutcome::AlreadyThere => format!("🔊 Ya estoy en <#{}>", voice_channel),
    }))
}

async fn handle_play(
    ctx: &Context,
    bot: &MusicBot,
    invocation: Invocation,
    query: &str,
) -> Result<Reply, CommandError> {
    let session = bot
        .ensure_session(ctx, invocation.guild_id, invocation.channel_id)
        .await?;

    // Conectar al canal de voz si no está conectado
    if !bot.is_connected(ctx, invocation.guild_id).await {
        let voice_channel = user_voice_channel(ctx, invocation.guild_id, invocation.user_id)?;
        bot.join_voice_channel(ctx, invocation.guild_id, voice_channel)
            .await?;
    }

    let added = session.play(query, invocation.user_id).await?;

    Ok(Reply::text(format!("🔎 Encontré {} resultado(s) para `{}`", added, query)))
}

async fn handle_leave(bot: &MusicBot, invocation: Invocation) -> Result<Reply, CommandError> {
    if !bot.registry().destroy(invocation.guild_id).await {
        return Err(CommandError::NotConnected);
    }

    Ok(Reply::text("👋 Desconectado del canal de voz"))
}

/// Comandos que solo operan sobre una sesión existente
pub fn control(session: &PlaybackSession, command: MusicCommand) -> Result<Reply, CommandError> {
    let reply = match command {
        MusicCommand::Pause => Reply::text(if session.pause()? {
            "⏸️ Reproducción pausada"
        } else {
            "⏸️ La reproducción ya estaba en pausa"
        }),
        MusicCommand::Resume => Reply::text(if session.resume()? {
            "▶️ Reproducción reanudada"
        } else {
            "▶️ La reproducción no estaba en pausa"
        }),
        MusicCommand::Skip => {
            let skipped = session.skip()?;
            Reply::text(format!("⏭️ Saltada **{}**", skipped.title))
        }
        MusicCommand::Remove(position) => {
            let removed = session.remove(position)?;
            Reply::text(format!("🗑️ Eliminada **{}** de la cola", removed.title()))
        }
        MusicCommand::Clear => {
            let removed = session.clear();
            Reply::text(format!("🗑️ Cola limpiada ({} canciones)", removed))
        }
        MusicCommand::Queue(page) => {
            let current = session.now_playing();
            Reply::Embed(embeds::queue_embed(
                current.as_ref(),
                &session.list_queue(),
                page,
            ))
        }
        MusicCommand::NowPlaying => match session.now_playing() {
            Some((track, elapsed)) => Reply::Player(embeds::now_playing_embed(
                &track,
                elapsed,
                session.state() == PlayerState::Paused,
            )),
            None => Reply::text("❌ No hay nada reproduciéndose actualmente"),
        },
        MusicCommand::Volume(None) => Reply::text(format!(
            "🔊 Volumen actual: {}%",
            (session.volume() * 100.0).round() as u32
        )),
        MusicCommand::Volume(Some(percent)) => {
            session.set_volume(percent)?;
            Reply::text(format!("🔊 Volumen ajustado a {}%", percent))
        }
        MusicCommand::Join(_)
        | MusicCommand::Play(_)
        | MusicCommand::Leave
        | MusicCommand::Help => {
            return Err(CommandError::Parse(ParseError::Unknown(command.name().to_string())))
        }
    };

    Ok(reply)
}

fn user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<ChannelId, CommandError> {
    let guild = guild_id
        .to_guild_cached(&ctx.cache)
        .ok_or(CommandError::NotInVoice)?;

    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
        .ok_or(CommandError::NotInVoice)
}

/// Valida un canal indicado por el usuario contra la caché de la guild.
fn guild_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> Result<ChannelId, CommandError> {
    let guild = guild_id
        .to_guild_cached(&ctx.cache)
        .ok_or(CommandError::NotVoiceChannel(channel_id))?;

    match guild.channels.get(&channel_id).map(|channel| channel.kind) {
        Some(kind) if is_voice_kind(kind) => Ok(channel_id),
        _ => Err(CommandError::NotVoiceChannel(channel_id)),
    }
}

fn is_voice_kind(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Voice | ChannelType::Stage)
}

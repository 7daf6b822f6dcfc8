//! # Bot Module
//!
//! Discord front end of Walle Music.
//!
//! [`MusicBot`] implements Serenity's [`EventHandler`]. It turns slash commands,
//! prefixed text commands and player buttons into [`commands::MusicCommand`]s,
//! joins voice channels through songbird, and creates the guild's
//! [`PlaybackSession`] on demand in the shared [`SessionRegistry`].

use anyhow::Result;
use serenity::{
    all::{ChannelId, Context, EventHandler, GuildId, Interaction, Message, Ready, VoiceState},
    async_trait,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub mod commands;
pub mod events;
pub mod handlers;
pub mod prefix;

use crate::{
    audio::{output::SongbirdOutput, registry::SessionRegistry, session::PlaybackSession},
    config::Config,
    sources::StreamResolver,
};
use events::ChannelNotifier;
use handlers::CommandError;

/// Resultado de pedir al bot que entre a un canal de voz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    Moved,
    AlreadyThere,
}

/// Main Discord event handler.
///
/// Owns nothing per guild itself: playback state lives in the sessions kept by
/// the [`SessionRegistry`], which is shared with `main` for graceful shutdown.
pub struct MusicBot {
    config: Arc<Config>,
    registry: SessionRegistry,
    resolver: Arc<dyn StreamResolver>,
    /// Cliente HTTP para los streams de audio
    http_client: reqwest::Client,
}

impl MusicBot {
    pub fn new(config: Config, registry: SessionRegistry, resolver: Arc<dyn StreamResolver>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            resolver,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Registers slash commands with Discord.
    ///
    /// With `GUILD_ID` set, commands are registered only in that guild (propagates
    /// immediately, useful for development). Otherwise they are registered globally.
    async fn register_commands(&self, ctx: &Context) -> Result<()> {
        info!("📝 Registrando comandos slash...");

        match self.config.guild_id {
            Some(guild_id) => {
                let guild_id = GuildId::new(guild_id);
                info!("🏠 Registrando comandos para guild específica: {}", guild_id);
                commands::register_guild_commands(ctx, guild_id).await?;
                info!("✅ Comandos de guild registrados para: {}", guild_id);
            }
            None => {
                info!("🌐 Registrando comandos globalmente");
                commands::register_global_commands(ctx).await?;
                info!("✅ Comandos globales registrados");
            }
        }

        Ok(())
    }

    /// Whether the bot currently sits in a voice channel of the guild.
    pub async fn is_connected(&self, ctx: &Context, guild_id: GuildId) -> bool {
        let Some(manager) = songbird::get(ctx).await else {
            return false;
        };

        match manager.get(guild_id) {
            Some(call) => call.lock().await.current_channel().is_some(),
            None => false,
        }
    }

    /// Connects the bot to a voice channel, moving it if it is elsewhere in the guild.
    ///
    /// Requires the `Connect` and `Speak` permissions on the target channel.
    pub async fn join_voice_channel(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<JoinOutcome, CommandError> {
        let manager = songbird::get(ctx)
            .await
            .ok_or_else(|| CommandError::Join("Songbird no inicializado".to_string()))?;

        let current = match manager.get(guild_id) {
            Some(call) => call.lock().await.current_channel(),
            None => None,
        };

        let outcome = match current {
            Some(current) if current.0.get() == channel_id.get() => {
                debug!("Ya conectado a {} en guild {}", channel_id, guild_id);
                return Ok(JoinOutcome::AlreadyThere);
            }
            Some(_) => JoinOutcome::Moved,
            None => JoinOutcome::Joined,
        };

        manager.join(guild_id, channel_id).await.map_err(|e| {
            error!("Error al conectar al canal de voz: {:?}", e);
            CommandError::Join(e.to_string())
        })?;

        info!("🔊 Conectado al canal de voz {} en guild {}", channel_id, guild_id);
        Ok(outcome)
    }

    /// Sesión de la guild, creada si hace falta. Los avisos van a `text_channel`.
    ///
    /// Call it before joining voice: a session that is still closing releases the
    /// guild's call, and this waits for that to finish.
    pub async fn ensure_session(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        text_channel: ChannelId,
    ) -> Result<Arc<PlaybackSession>, CommandError> {
        let manager = songbird::get(ctx)
            .await
            .ok_or_else(|| CommandError::Join("Songbird no inicializado".to_string()))?;

        let session = self
            .registry
            .get_or_create(guild_id, || {
                PlaybackSession::new(
                    guild_id,
                    self.config.session_settings(),
                    self.resolver.clone(),
                    Arc::new(SongbirdOutput::new(
                        manager,
                        guild_id,
                        self.http_client.clone(),
                    )),
                    Arc::new(ChannelNotifier::new(ctx.http.clone(), text_channel)),
                )
            })
            .await;

        Ok(session)
    }
}

#[async_trait]
impl EventHandler for MusicBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("Error al registrar comandos: {:?}", e);
        }
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        for guild_id in guilds {
            match ctx.cache.guild(guild_id) {
                Some(guild) => info!(
                    "🏠 {} (id: {}) - {} miembros",
                    guild.name, guild_id, guild.member_count
                ),
                None => warn!("⚠️ Guild {} no está en caché", guild_id),
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command_interaction) => {
                if let Err(e) = handlers::handle_command(&ctx, command_interaction, self).await {
                    error!("Error manejando comando: {:?}", e);
                }
            }
            Interaction::Component(component_interaction) => {
                if let Err(e) = handlers::handle_component(&ctx, component_interaction, self).await
                {
                    error!("Error manejando componente: {:?}", e);
                }
            }
            _ => {}
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Err(e) = handlers::handle_message(&ctx, &msg, self).await {
            error!("Error manejando mensaje: {:?}", e);
        }
    }

    /// Destroys the guild's session when the bot is disconnected from voice,
    /// including when someone else kicks or moves it out.
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if new.user_id != ctx.cache.current_user().id {
            return;
        }

        if old.is_some() && new.channel_id.is_none() {
            if let Some(guild_id) = new.guild_id {
                info!("🔌 Bot desconectado en guild {}", guild_id);
                self.registry.destroy(guild_id).await;
            }
        }
    }
}

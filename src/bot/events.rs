use serenity::{builder::CreateMessage, http::Http, model::id::{ChannelId, GuildId}};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    audio::notify::{Notice, Notifier},
    ui::{buttons, embeds},
};

/// Publica los eventos de una sesión en el canal de texto donde se invocó el bot
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, guild_id: GuildId, notice: Notice) {
        let mut message = CreateMessage::new().embed(embeds::notice_embed(&notice));
        if matches!(notice, Notice::NowPlaying(_)) {
            message = message.components(buttons::player_buttons());
        }

        debug!("📨 Aviso para guild {}: {:?}", guild_id, notice);

        // El player nunca espera a Discord
        let http = self.http.clone();
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            if let Err(e) = channel_id.send_message(&http, message).await {
                warn!(
                    "⚠️ No se pudo enviar aviso a canal {} de guild {}: {:?}",
                    channel_id, guild_id, e
                );
            }
        });
    }
}

use serenity::model::id::GuildId;
use std::time::Duration;

use crate::sources::TrackInfo;

/// Eventos de una sesión que se informan al canal de texto
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Queued { track: TrackInfo, position: usize },
    QueuedPlaylist { count: usize, first: TrackInfo },
    NowPlaying(TrackInfo),
    ResolutionFailed { title: String, reason: String },
    PlaybackFailed { title: String, reason: String },
    IdleDisconnect { after: Duration },
}

/// Fire-and-forget reporting. Implementations must not block the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, guild_id: GuildId, notice: Notice);
}

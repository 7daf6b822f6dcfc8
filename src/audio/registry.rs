use dashmap::{mapref::entry::Entry, DashMap};
use serenity::model::id::GuildId;
use std::sync::Arc;
use tracing::{debug, info};

use super::session::PlaybackSession;

/// Sesiones activas por guild.
///
/// Cloning is cheap and every clone sees the same map. At most one session exists
/// per guild. A closing session keeps its entry until it has released voice, so a
/// replacement is only created once the guild's call is free again. The teardown
/// is claimed once, by an explicit destroy or by the session's own idle timeout.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<GuildId, Arc<PlaybackSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<PlaybackSession>> {
        self.sessions.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Devuelve la sesión de la guild, creándola con `factory` si no existe.
    ///
    /// If the current session is closing, waits for it to release voice before
    /// building the new one. `factory` runs under the map's shard lock, so it must
    /// not call back into the registry. Concurrent callers for the same guild all
    /// get the same session and `factory` runs at most once.
    pub async fn get_or_create<F>(&self, guild_id: GuildId, factory: F) -> Arc<PlaybackSession>
    where
        F: FnOnce() -> PlaybackSession,
    {
        let created = loop {
            let closing = match self.sessions.entry(guild_id) {
                Entry::Occupied(entry) if !entry.get().is_closing() => return entry.get().clone(),
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => break entry.insert(Arc::new(factory())).value().clone(),
            };

            debug!("⏳ Esperando a que la sesión de guild {} suelte la voz", guild_id);
            closing.released().await;
            self.forget(guild_id, &closing);
        };

        info!("🆕 Sesión creada para guild {}", guild_id);
        created.spawn_player(self.clone());
        created
    }

    /// Tears down the guild's session and waits until it has released voice.
    ///
    /// Returns `false` if there was no session or someone else is already tearing
    /// it down; in the latter case it still waits for the release.
    pub async fn destroy(&self, guild_id: GuildId) -> bool {
        let Some(session) = self.get(guild_id) else {
            debug!("No hay sesión que destruir en guild {}", guild_id);
            return false;
        };

        if !session.begin_teardown() {
            debug!("La sesión de guild {} ya se está cerrando", guild_id);
            session.released().await;
            return false;
        }

        info!("🛑 Destruyendo sesión de guild {}", guild_id);
        session.shutdown().await;
        self.forget(guild_id, &session);
        true
    }

    /// Drops the entry only if it still points at `session`.
    pub(crate) fn forget(&self, guild_id: GuildId, session: &Arc<PlaybackSession>) -> bool {
        self.sessions
            .remove_if(&guild_id, |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    pub async fn shutdown_all(&self) {
        let guilds: Vec<GuildId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        info!("🛑 Cerrando {} sesiones activas", guilds.len());

        for guild_id in guilds {
            self.destroy(guild_id).await;
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

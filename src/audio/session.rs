use parking_lot::Mutex;
use serenity::model::id::{GuildId, UserId};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use thiserror::Error;
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{
    notify::{Notice, Notifier},
    output::{OutputError, OutputHandle, Playback, VoiceOutput},
    queue::{PlaybackQueue, QueueError},
    registry::SessionRegistry,
};
use crate::sources::{ResolveError, StreamResolver, Track, TrackInfo};

/// Tiempo máximo esperando una canción antes de cerrar la sesión
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Edad máxima de un stream ya resuelto para reproducirlo sin volver a resolverlo
pub const STREAM_URL_MAX_AGE: Duration = Duration::from_secs(60);

pub const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Waiting for the next track.
    Idle,
    /// Fetching a fresh stream for the dequeued track.
    Resolving,
    Playing,
    Paused,
    /// Terminal: the session is being torn down.
    Draining,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub idle_timeout: Duration,
    pub default_volume: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: IDLE_TIMEOUT,
            default_volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no hay nada reproduciéndose")]
    NotPlaying,

    #[error("el volumen debe estar entre 1 y 100, recibido: {0}")]
    InvalidVolume(f32),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

struct Current {
    info: TrackInfo,
    started_at: Instant,
    handle: Arc<dyn OutputHandle>,
    skip: CancellationToken,
}

struct PlayerStatus {
    state: PlayerState,
    volume: f32,
    current: Option<Current>,
}

/// Sesión de reproducción de una guild.
///
/// Owns the guild's queue and a background player loop that dequeues a track,
/// resolves a fresh stream for it, plays it through the guild's [`VoiceOutput`]
/// and waits for it to end. The loop exits only when the idle timeout expires
/// with nothing queued or when the session is destroyed through the
/// [`SessionRegistry`]; either way it releases the voice output before exiting.
pub struct PlaybackSession {
    guild_id: GuildId,
    settings: SessionSettings,
    queue: PlaybackQueue,
    status: Mutex<PlayerStatus>,
    resolver: Arc<dyn StreamResolver>,
    output: Arc<dyn VoiceOutput>,
    notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
    /// Set by whoever claimed the teardown (destroy or idle timeout).
    closing: AtomicBool,
    /// Cancelled once voice has been released and the registry entry dropped.
    released: CancellationToken,
    player: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackSession {
    pub fn new(
        guild_id: GuildId,
        settings: SessionSettings,
        resolver: Arc<dyn StreamResolver>,
        output: Arc<dyn VoiceOutput>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            guild_id,
            settings,
            queue: PlaybackQueue::new(),
            status: Mutex::new(PlayerStatus {
                state: PlayerState::Idle,
                volume: settings.default_volume,
                current: None,
            }),
            resolver,
            output,
            notifier,
            shutdown: CancellationToken::new(),
            closing: AtomicBool::new(false),
            released: CancellationToken::new(),
            player: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.status.lock().state
    }

    pub fn volume(&self) -> f32 {
        self.status.lock().volume
    }

    /// Busca `query` y agrega los resultados a la cola, en orden.
    pub async fn play(&self, query: &str, requester: UserId) -> Result<usize, ResolveError> {
        let tracks = self.resolver.resolve_for_enqueue(query, requester).await?;
        Ok(self.enqueue_all(tracks))
    }

    pub fn enqueue(&self, track: Track) -> usize {
        let info = track.info().clone();
        let position = self.queue.enqueue(track);

        info!("➕ Agregado a la cola de guild {}: {}", self.guild_id, info.title);
        self.notifier.notify(
            self.guild_id,
            Notice::Queued {
                track: info,
                position,
            },
        );
        position
    }

    /// Agrega cada track de una colección individualmente, preservando el orden.
    pub fn enqueue_all(&self, mut tracks: Vec<Track>) -> usize {
        if tracks.len() <= 1 {
            return tracks.pop().map(|track| self.enqueue(track)).map_or(0, |_| 1);
        }

        let first = tracks[0].info().clone();
        let count = self.queue.enqueue_all(tracks);

        info!("➕ Agregadas {} canciones a la cola de guild {}", count, self.guild_id);
        self.notifier
            .notify(self.guild_id, Notice::QueuedPlaylist { count, first });
        count
    }

    pub fn remove(&self, position: Option<usize>) -> Result<Track, SessionError> {
        Ok(self.queue.remove_at(position)?)
    }

    pub fn clear(&self) -> usize {
        let removed = self.queue.clear();
        info!("🗑️ Cola de guild {} limpiada ({} canciones)", self.guild_id, removed);
        removed
    }

    pub fn list_queue(&self) -> Vec<Track> {
        self.queue.snapshot()
    }

    /// Track actual y tiempo transcurrido desde que empezó.
    pub fn now_playing(&self) -> Option<(TrackInfo, Duration)> {
        self.status
            .lock()
            .current
            .as_ref()
            .map(|current| (current.info.clone(), current.started_at.elapsed()))
    }

    /// Returns `false` if the output was already paused.
    pub fn pause(&self) -> Result<bool, SessionError> {
        let mut status = self.status.lock();
        let handle = status
            .current
            .as_ref()
            .map(|current| current.handle.clone())
            .ok_or(SessionError::NotPlaying)?;

        if status.state == PlayerState::Paused {
            return Ok(false);
        }

        handle.pause()?;
        status.state = PlayerState::Paused;
        info!("⏸️ Reproducción pausada en guild {}", self.guild_id);
        Ok(true)
    }

    /// Returns `false` if the output was not paused.
    pub fn resume(&self) -> Result<bool, SessionError> {
        let mut status = self.status.lock();
        let handle = status
            .current
            .as_ref()
            .map(|current| current.handle.clone())
            .ok_or(SessionError::NotPlaying)?;

        if status.state != PlayerState::Paused {
            return Ok(false);
        }

        handle.resume()?;
        status.state = PlayerState::Playing;
        info!("▶️ Reproducción reanudada en guild {}", self.guild_id);
        Ok(true)
    }

    /// Termina la pista actual (sonando o pausada); el loop sigue con la siguiente.
    pub fn skip(&self) -> Result<TrackInfo, SessionError> {
        let status = self.status.lock();
        let current = status.current.as_ref().ok_or(SessionError::NotPlaying)?;

        current.skip.cancel();
        current.handle.stop();
        info!("⏭️ Saltada {} en guild {}", current.info.title, self.guild_id);
        Ok(current.info.clone())
    }

    /// `percent` is the user-facing 1–100 value.
    pub fn set_volume(&self, percent: f32) -> Result<(), SessionError> {
        let volume = percent / 100.0;
        if !(volume > 0.0 && volume <= 1.0) {
            return Err(SessionError::InvalidVolume(percent));
        }

        let mut status = self.status.lock();
        status.volume = volume;
        if let Some(current) = &status.current {
            if let Err(e) = current.handle.set_volume(volume) {
                warn!("⚠️ No se pudo aplicar el volumen en guild {}: {}", self.guild_id, e);
            }
        }

        info!("🔊 Volumen de guild {} ajustado a {}%", self.guild_id, percent);
        Ok(())
    }

    pub(crate) fn spawn_player(self: &Arc<Self>, registry: SessionRegistry) {
        let session = Arc::clone(self);
        let task = tokio::spawn(async move { session.player_loop(registry).await });
        *self.player.lock() = Some(task);
    }

    /// Marks the session as closing. Only the first caller gets `true`.
    pub(crate) fn begin_teardown(&self) -> bool {
        !self.closing.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Completes once the session has released voice and left the registry.
    pub(crate) async fn released(&self) {
        self.released.cancelled().await
    }

    /// Cancels the player loop and waits until it has released the voice output.
    pub(crate) async fn shutdown(&self) {
        self.shutdown.cancel();

        let task = self.player.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("❌ El player de guild {} terminó con error: {:?}", self.guild_id, e);
            }
        }

        // Si el player murió sin llegar a drain, nadie más avisará
        self.released.cancel();
    }

    async fn player_loop(self: Arc<Self>, registry: SessionRegistry) {
        info!("🎶 Player iniciado para guild {}", self.guild_id);

        while !self.shutdown.is_cancelled() {
            self.set_state(PlayerState::Idle);

            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.queue.dequeue_timeout(self.settings.idle_timeout) => next,
            };

            match next {
                Some(track) => self.play_track(track).await,
                None if !self.queue.is_empty() => {
                    debug!("Llegó una canción justo al vencer la espera en guild {}", self.guild_id);
                }
                None => {
                    if self.begin_teardown() {
                        info!(
                            "⏰ Guild {} sin canciones por {}, cerrando sesión",
                            self.guild_id,
                            humantime::format_duration(self.settings.idle_timeout)
                        );
                        self.notifier.notify(
                            self.guild_id,
                            Notice::IdleDisconnect {
                                after: self.settings.idle_timeout,
                            },
                        );
                    }
                    break;
                }
            }
        }

        // La entrada sigue en el registro hasta soltar la voz
        self.drain().await;
        registry.forget(self.guild_id, &self);
        self.released.cancel();
    }

    async fn play_track(&self, track: Track) {
        let resolved = match track {
            Track::Resolved(resolved) if resolved.is_fresh(STREAM_URL_MAX_AGE) => resolved,
            track => {
                let info = track.into_info();
                self.set_state(PlayerState::Resolving);
                debug!("🔎 Resolviendo stream de {} en guild {}", info.title, self.guild_id);

                let result = tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => return,
                    result = self.resolver.resolve_for_playback(&info) => result,
                };

                match result {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!("❌ No se pudo resolver {} en guild {}: {}", info.title, self.guild_id, e);
                        self.notifier.notify(
                            self.guild_id,
                            Notice::ResolutionFailed {
                                title: info.title,
                                reason: e.to_string(),
                            },
                        );
                        return;
                    }
                }
            }
        };

        let (info, stream_url) = resolved.into_parts();
        let volume = self.volume();

        let Playback { handle, finished } = match self.output.start(stream_url, volume).await {
            Ok(playback) => playback,
            Err(e) => {
                error!("❌ No se pudo reproducir {} en guild {}: {}", info.title, self.guild_id, e);
                self.notifier.notify(
                    self.guild_id,
                    Notice::PlaybackFailed {
                        title: info.title,
                        reason: e.to_string(),
                    },
                );
                return;
            }
        };

        let skip = self.shutdown.child_token();
        {
            let mut status = self.status.lock();
            // El volumen pudo cambiar mientras arrancaba la salida
            if status.volume != volume {
                if let Err(e) = handle.set_volume(status.volume) {
                    warn!("⚠️ No se pudo aplicar el volumen en guild {}: {}", self.guild_id, e);
                }
            }
            status.state = PlayerState::Playing;
            status.current = Some(Current {
                info: info.clone(),
                started_at: Instant::now(),
                handle: handle.clone(),
                skip: skip.clone(),
            });
        }

        info!("▶️ Reproduciendo {} en guild {}", info.title, self.guild_id);
        self.notifier.notify(self.guild_id, Notice::NowPlaying(info));

        tokio::select! {
            _ = finished => debug!("Pista terminada en guild {}", self.guild_id),
            _ = skip.cancelled() => debug!("Pista interrumpida en guild {}", self.guild_id),
        }

        handle.stop();
        self.status.lock().current = None;
    }

    async fn drain(&self) {
        let current = {
            let mut status = self.status.lock();
            status.state = PlayerState::Draining;
            status.current.take()
        };

        if let Some(current) = current {
            current.skip.cancel();
            current.handle.stop();
        }

        let dropped = self.queue.clear();
        self.output.release().await;

        info!(
            "🧹 Sesión de guild {} destruida ({} canciones descartadas)",
            self.guild_id, dropped
        );
    }

    fn set_state(&self, state: PlayerState) {
        self.status.lock().state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::testing::{settle, track, FakeOutput, FakeResolver, RecordingNotifier},
        sources::{MockStreamResolver, ResolvedTrack, StreamLocator},
    };
    use pretty_assertions::assert_eq;

    const GUILD: GuildId = GuildId::new(42);

    struct Harness {
        registry: SessionRegistry,
        resolver: Arc<FakeResolver>,
        output: Arc<FakeOutput>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new(resolver: FakeResolver) -> Self {
            Self {
                registry: SessionRegistry::new(),
                resolver: Arc::new(resolver),
                output: Arc::new(FakeOutput::default()),
                notifier: Arc::new(RecordingNotifier::default()),
            }
        }

        fn build(&self) -> PlaybackSession {
            PlaybackSession::new(
                GUILD,
                SessionSettings::default(),
                self.resolver.clone(),
                self.output.clone(),
                self.notifier.clone(),
            )
        }

        async fn start(&self) -> Arc<PlaybackSession> {
            self.registry.get_or_create(GUILD, || self.build()).await
        }
    }

    fn now_playing_title(session: &PlaybackSession) -> Option<String> {
        session.now_playing().map(|(info, _)| info.title)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracks_play_in_fifo_order() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        session.enqueue(track("A"));
        session.enqueue(track("B"));
        settle().await;

        assert_eq!(harness.output.started_urls(), vec!["stream://A"]);
        assert_eq!(session.state(), PlayerState::Playing);
        assert_eq!(now_playing_title(&session).as_deref(), Some("A"));

        harness.output.finish_current();
        settle().await;

        assert_eq!(harness.output.started_urls(), vec!["stream://A", "stream://B"]);
        assert_eq!(now_playing_title(&session).as_deref(), Some("B"));

        harness.output.finish_current();
        settle().await;

        assert_eq!(session.state(), PlayerState::Idle);
        assert!(session.now_playing().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_then_skip_plays_remaining_track() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.registry.get_or_create(GUILD, || {
            let session = harness.build();
            session.enqueue(track("A"));
            session.enqueue(track("B"));
            session.enqueue(track("C"));
            assert_eq!(session.remove(Some(2)).unwrap().title(), "B");
            let queued: Vec<_> = session.list_queue().iter().map(|t| t.title().to_string()).collect();
            assert_eq!(queued, vec!["A", "C"]);
            session
        })
        .await;
        settle().await;

        assert_eq!(now_playing_title(&session).as_deref(), Some("A"));
        let first = harness.output.last_handle().unwrap();

        assert_eq!(session.skip().unwrap().title, "A");
        settle().await;

        assert!(first.is_stopped());
        assert_eq!(harness.output.started_urls(), vec!["stream://A", "stream://C"]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let (info, elapsed) = session.now_playing().unwrap();
        assert_eq!(info.title, "C");
        assert!(elapsed >= Duration::from_secs(5));
        assert!(session.list_queue().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_failure_skips_to_next_track() {
        let harness = Harness::new(FakeResolver::failing(&["A"]));
        let session = harness.start().await;

        session.enqueue(track("A"));
        session.enqueue(track("B"));
        settle().await;

        assert_eq!(harness.resolver.playback_calls(), vec!["A", "B"]);
        assert_eq!(harness.output.started_urls(), vec!["stream://B"]);
        assert_eq!(now_playing_title(&session).as_deref(), Some("B"));
        assert!(harness.notifier.notices().iter().any(|n| matches!(
            n,
            Notice::ResolutionFailed { title, .. } if title == "A"
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_toggle_output() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        assert!(matches!(session.pause(), Err(SessionError::NotPlaying)));
        assert!(matches!(session.skip(), Err(SessionError::NotPlaying)));

        session.enqueue(track("A"));
        session.enqueue(track("B"));
        settle().await;
        let handle = harness.output.last_handle().unwrap();

        assert!(session.pause().unwrap());
        assert!(!session.pause().unwrap());
        assert!(handle.is_paused());
        assert_eq!(session.state(), PlayerState::Paused);
        assert_eq!(session.list_queue().len(), 1);

        assert!(session.resume().unwrap());
        assert!(!session.resume().unwrap());
        assert!(!handle.is_paused());
        assert_eq!(session.state(), PlayerState::Playing);

        // Saltar también funciona estando en pausa
        session.pause().unwrap();
        session.skip().unwrap();
        settle().await;

        assert_eq!(now_playing_title(&session).as_deref(), Some("B"));
        assert_eq!(session.state(), PlayerState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_volume_validation_and_persistence() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        for invalid in [0.0, -5.0, 100.5, 150.0, f32::NAN] {
            assert!(matches!(
                session.set_volume(invalid),
                Err(SessionError::InvalidVolume(_))
            ));
        }
        assert_eq!(session.volume(), 0.5);

        session.enqueue(track("A"));
        session.enqueue(track("B"));
        settle().await;
        assert_eq!(harness.output.last_handle().unwrap().volume(), 0.5);

        session.set_volume(80.0).unwrap();
        assert_eq!(session.volume(), 0.8);
        assert_eq!(harness.output.last_handle().unwrap().volume(), 0.8);

        harness.output.finish_current();
        settle().await;

        assert_eq!(harness.output.started_volumes(), vec![0.5, 0.8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_destroys_session_once() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        tokio::time::sleep(IDLE_TIMEOUT - Duration::from_secs(1)).await;
        assert!(harness.registry.get(GUILD).is_some());
        assert_eq!(harness.output.release_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(harness.registry.get(GUILD).is_none());
        assert_eq!(session.state(), PlayerState::Draining);
        assert_eq!(harness.output.release_count(), 1);
        assert!(harness
            .notifier
            .notices()
            .contains(&Notice::IdleDisconnect { after: IDLE_TIMEOUT }));

        assert!(!harness.registry.destroy(GUILD).await);
        assert_eq!(harness.output.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timer_starts_after_track_ends() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        session.enqueue(track("A"));
        settle().await;

        // Una pista larga no cuenta como inactividad
        tokio::time::sleep(IDLE_TIMEOUT * 2).await;
        assert!(harness.registry.get(GUILD).is_some());

        harness.output.finish_current();
        tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(1)).await;

        assert!(harness.registry.get(GUILD).is_none());
        assert_eq!(harness.output.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_while_playing_releases_output() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        session.enqueue(track("A"));
        session.enqueue(track("B"));
        settle().await;
        let handle = harness.output.last_handle().unwrap();

        assert!(harness.registry.destroy(GUILD).await);

        assert!(handle.is_stopped());
        assert_eq!(harness.output.release_count(), 1);
        assert_eq!(session.state(), PlayerState::Draining);
        assert!(session.list_queue().is_empty());
        assert!(session.now_playing().is_none());
        assert!(!harness.registry.destroy(GUILD).await);
        assert_eq!(harness.output.started_urls(), vec!["stream://A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_stream_is_resolved_again() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        session.enqueue(track("A"));
        settle().await;

        let info = TrackInfo::new("B", "https://youtu.be/B", UserId::new(1));
        session.enqueue(Track::Resolved(ResolvedTrack::new(
            info,
            StreamLocator::new("expired://B"),
        )));
        tokio::time::sleep(STREAM_URL_MAX_AGE * 2).await;

        harness.output.finish_current();
        settle().await;

        assert_eq!(harness.output.started_urls(), vec!["stream://A", "stream://B"]);
        assert_eq!(harness.resolver.playback_calls(), vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_stream_plays_without_resolving() {
        let harness = Harness::new(FakeResolver::default());
        let session = harness.start().await;

        let info = TrackInfo::new("A", "https://youtu.be/A", UserId::new(1));
        session.enqueue(Track::Resolved(ResolvedTrack::new(
            info,
            StreamLocator::new("direct://A"),
        )));
        settle().await;

        assert_eq!(harness.output.started_urls(), vec!["direct://A"]);
        assert!(harness.resolver.playback_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_failure_keeps_session_idle() {
        let harness = Harness::new(FakeResolver::default());
        harness.output.disconnect();
        let session = harness.start().await;

        session.enqueue(track("A"));
        settle().await;

        assert_eq!(session.state(), PlayerState::Idle);
        assert!(harness.registry.get(GUILD).is_some());
        assert!(harness
            .notifier
            .notices()
            .iter()
            .any(|n| matches!(n, Notice::PlaybackFailed { title, .. } if title == "A")));
    }

    #[tokio::test]
    async fn test_play_enqueues_every_resolved_track() {
        let mut resolver = MockStreamResolver::new();
        resolver
            .expect_resolve_for_enqueue()
            .withf(|query, _| query == "lofi mix")
            .times(1)
            .returning(|_, requester| {
                Ok(vec![
                    TrackInfo::new("Uno", "https://youtu.be/1", requester).into(),
                    TrackInfo::new("Dos", "https://youtu.be/2", requester).into(),
                ])
            });
        resolver.expect_resolve_for_playback().never();

        let notifier = Arc::new(RecordingNotifier::default());
        let session = PlaybackSession::new(
            GUILD,
            SessionSettings::default(),
            Arc::new(resolver),
            Arc::new(FakeOutput::default()),
            notifier.clone(),
        );

        assert_eq!(session.play("lofi mix", UserId::new(9)).await.unwrap(), 2);

        let queued: Vec<_> = session.list_queue().iter().map(|t| t.title().to_string()).collect();
        assert_eq!(queued, vec!["Uno", "Dos"]);
        assert!(session.list_queue().iter().all(|t| t.requester() == UserId::new(9)));
        assert!(matches!(
            notifier.notices().as_slice(),
            [Notice::QueuedPlaylist { count: 2, first }] if first.title == "Uno"
        ));
    }

    #[tokio::test]
    async fn test_play_failure_leaves_queue_untouched() {
        let mut resolver = MockStreamResolver::new();
        resolver
            .expect_resolve_for_enqueue()
            .returning(|query, _| Err(ResolveError::NoResults(query.to_string())));

        let notifier = Arc::new(RecordingNotifier::default());
        let session = PlaybackSession::new(
            GUILD,
            SessionSettings::default(),
            Arc::new(resolver),
            Arc::new(FakeOutput::default()),
            notifier.clone(),
        );

        assert!(matches!(
            session.play("nada", UserId::new(9)).await,
            Err(ResolveError::NoResults(_))
        ));
        assert!(session.list_queue().is_empty());
        assert!(notifier.notices().is_empty());
    }
}

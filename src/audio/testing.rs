//! Dobles de prueba para las sesiones de reproducción.

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{GuildId, UserId};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::oneshot;

use super::{
    notify::{Notice, Notifier},
    output::{OutputError, OutputHandle, Playback, VoiceOutput},
};
use crate::sources::{
    ResolveError, ResolvedTrack, StreamLocator, StreamResolver, Track, TrackInfo,
};

pub fn track(title: &str) -> Track {
    TrackInfo::new(title, format!("https://youtu.be/{title}"), UserId::new(1)).into()
}

/// Lets spawned player loops run until they block again.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[derive(Default)]
pub struct FakeResolver {
    failing: HashSet<String>,
    playback_calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn failing(titles: &[&str]) -> Self {
        Self {
            failing: titles.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn playback_calls(&self) -> Vec<String> {
        self.playback_calls.lock().clone()
    }
}

#[async_trait]
impl StreamResolver for FakeResolver {
    async fn resolve_for_enqueue(
        &self,
        query: &str,
        requester: UserId,
    ) -> Result<Vec<Track>, ResolveError> {
        Ok(vec![TrackInfo::new(query, format!("https://youtu.be/{query}"), requester).into()])
    }

    async fn resolve_for_playback(&self, info: &TrackInfo) -> Result<ResolvedTrack, ResolveError> {
        self.playback_calls.lock().push(info.title.clone());

        if self.failing.contains(&info.title) {
            return Err(ResolveError::Extractor("video no disponible".to_string()));
        }

        Ok(ResolvedTrack::new(
            info.clone(),
            StreamLocator::new(format!("stream://{}", info.title)),
        ))
    }
}

pub struct FakeHandle {
    paused: AtomicBool,
    stopped: AtomicBool,
    volume: Mutex<f32>,
    finish: Mutex<Option<oneshot::Sender<()>>>,
}

impl FakeHandle {
    pub fn finish(&self) {
        if let Some(tx) = self.finish.lock().take() {
            let _ = tx.send(());
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }
}

impl OutputHandle for FakeHandle {
    fn pause(&self) -> Result<(), OutputError> {
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&self) -> Result<(), OutputError> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<(), OutputError> {
        *self.volume.lock() = volume;
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.finish();
    }
}

/// Records every playback start and voice release.
///
/// Stands for the guild's call: releasing it leaves voice until `connect` is called.
pub struct FakeOutput {
    connected: AtomicBool,
    release_delay: Duration,
    starts: Mutex<Vec<(String, f32)>>,
    handles: Mutex<Vec<Arc<FakeHandle>>>,
    releases: AtomicUsize,
}

impl Default for FakeOutput {
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(true),
            release_delay: Duration::ZERO,
            starts: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
            releases: AtomicUsize::new(0),
        }
    }
}

impl FakeOutput {
    /// Salir de la voz tarda `delay`, como un `Songbird::remove` real.
    pub fn slow_release(delay: Duration) -> Self {
        Self {
            release_delay: delay,
            ..Self::default()
        }
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn started_urls(&self) -> Vec<String> {
        self.starts.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn started_volumes(&self) -> Vec<f32> {
        self.starts.lock().iter().map(|(_, volume)| *volume).collect()
    }

    pub fn last_handle(&self) -> Option<Arc<FakeHandle>> {
        self.handles.lock().last().cloned()
    }

    /// Simula el fin natural de la pista actual.
    pub fn finish_current(&self) {
        if let Some(handle) = self.last_handle() {
            handle.finish();
        }
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceOutput for FakeOutput {
    async fn start(&self, stream_url: String, volume: f32) -> Result<Playback, OutputError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(OutputError::NotConnected);
        }

        let (tx, finished) = oneshot::channel();
        let handle = Arc::new(FakeHandle {
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            volume: Mutex::new(volume),
            finish: Mutex::new(Some(tx)),
        });

        self.starts.lock().push((stream_url, volume));
        self.handles.lock().push(handle.clone());

        Ok(Playback { handle, finished })
    }

    async fn release(&self) {
        if !self.release_delay.is_zero() {
            tokio::time::sleep(self.release_delay).await;
        }
        self.disconnect();
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(GuildId, Notice)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().iter().map(|(_, n)| n.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, guild_id: GuildId, notice: Notice) {
        self.notices.lock().push((guild_id, notice));
    }
}

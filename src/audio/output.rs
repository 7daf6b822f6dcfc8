use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::GuildId;
use songbird::{
    error::JoinError,
    input::{HttpRequest, Input},
    tracks::TrackHandle,
    Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("el bot no está conectado a un canal de voz")]
    NotConnected,

    #[error("error en la pista de audio: {0}")]
    Track(String),
}

/// Control over the output started by one [`VoiceOutput::start`] call.
pub trait OutputHandle: Send + Sync {
    fn pause(&self) -> Result<(), OutputError>;
    fn resume(&self) -> Result<(), OutputError>;
    fn set_volume(&self, volume: f32) -> Result<(), OutputError>;
    /// Ends the output. Triggers the completion signal if it has not fired yet.
    fn stop(&self);
}

/// Una reproducción en curso: su control y la señal de fin (se dispara una sola vez).
pub struct Playback {
    pub handle: Arc<dyn OutputHandle>,
    pub finished: oneshot::Receiver<()>,
}

/// Voice resource of a single guild.
#[async_trait]
pub trait VoiceOutput: Send + Sync {
    async fn start(&self, stream_url: String, volume: f32) -> Result<Playback, OutputError>;

    /// Disconnects from voice. Safe to call when not connected.
    async fn release(&self);
}

/// Salida de voz de songbird para una guild
pub struct SongbirdOutput {
    manager: Arc<Songbird>,
    guild_id: GuildId,
    http: reqwest::Client,
}

impl SongbirdOutput {
    pub fn new(manager: Arc<Songbird>, guild_id: GuildId, http: reqwest::Client) -> Self {
        Self {
            manager,
            guild_id,
            http,
        }
    }
}

#[async_trait]
impl VoiceOutput for SongbirdOutput {
    async fn start(&self, stream_url: String, volume: f32) -> Result<Playback, OutputError> {
        let call = self
            .manager
            .get(self.guild_id)
            .ok_or(OutputError::NotConnected)?;

        let input: Input = HttpRequest::new(self.http.clone(), stream_url).into();
        let track = {
            let mut call = call.lock().await;
            if call.current_channel().is_none() {
                return Err(OutputError::NotConnected);
            }
            call.play_input(input)
        };

        let handle = SongbirdHandle(track.clone());
        handle.set_volume(volume)?;

        let (tx, finished) = oneshot::channel();
        let completion = CompletionNotifier::new(tx);

        // Fin natural, stop() o error: la primera señal gana
        for event in [TrackEvent::End, TrackEvent::Error] {
            if let Err(e) = track.add_event(Event::Track(event), completion.clone()) {
                debug!("La pista terminó antes de registrar eventos: {:?}", e);
                completion.fire();
            }
        }

        Ok(Playback {
            handle: Arc::new(handle),
            finished,
        })
    }

    async fn release(&self) {
        match self.manager.remove(self.guild_id).await {
            Ok(()) => info!("👋 Desconectado del canal de voz en guild {}", self.guild_id),
            Err(JoinError::NoCall) => debug!("Guild {} ya no tenía llamada activa", self.guild_id),
            Err(e) => warn!("⚠️ Error al desconectar guild {}: {:?}", self.guild_id, e),
        }
    }
}

struct SongbirdHandle(TrackHandle);

impl OutputHandle for SongbirdHandle {
    fn pause(&self) -> Result<(), OutputError> {
        self.0.pause().map_err(|e| OutputError::Track(e.to_string()))
    }

    fn resume(&self) -> Result<(), OutputError> {
        self.0.play().map_err(|e| OutputError::Track(e.to_string()))
    }

    fn set_volume(&self, volume: f32) -> Result<(), OutputError> {
        self.0
            .set_volume(volume)
            .map_err(|e| OutputError::Track(e.to_string()))
    }

    fn stop(&self) {
        // Falla solo si la pista ya terminó
        let _ = self.0.stop();
    }
}

/// Handler que entrega la señal de fin de pista al loop de la sesión
#[derive(Clone)]
struct CompletionNotifier {
    tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl CompletionNotifier {
    fn new(tx: oneshot::Sender<()>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    fn fire(&self) {
        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl VoiceEventHandler for CompletionNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        self.fire();
        Some(Event::Cancel)
    }
}

use parking_lot::Mutex;
use std::{collections::VecDeque, time::Duration};
use thiserror::Error;
use tokio::{
    sync::Notify,
    time::{self, Instant},
};
use tracing::debug;

use crate::sources::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("no se encontró ninguna canción en la posición {0}")]
    NotFound(usize),

    /// Removal of the most recent track on an empty queue.
    #[error("la cola está vacía")]
    Empty,
}

/// FIFO de tracks pendientes de una sesión.
///
/// A single consumer (the player loop) waits in [`PlaybackQueue::dequeue_timeout`];
/// any number of command handlers mutate it concurrently. Every operation takes the
/// lock for a bounded critical section only.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    items: Mutex<VecDeque<Track>>,
    available: Notify,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un track al final. Devuelve su posición (1-indexada).
    pub fn enqueue(&self, track: Track) -> usize {
        let position = {
            let mut items = self.items.lock();
            items.push_back(track);
            items.len()
        };
        self.available.notify_one();
        position
    }

    /// Agrega una colección completa sin intercalar otros tracks.
    pub fn enqueue_all(&self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let added = {
            let mut items = self.items.lock();
            let before = items.len();
            items.extend(tracks);
            items.len() - before
        };
        if added > 0 {
            self.available.notify_one();
        }
        added
    }

    /// Saca el primer track, esperando hasta `timeout` si la cola está vacía.
    ///
    /// `None` means the wait expired with nothing to play.
    pub async fn dequeue_timeout(&self, timeout: Duration) -> Option<Track> {
        let deadline = Instant::now() + timeout;

        loop {
            // Registrarse antes de mirar la cola para no perder un enqueue concurrente
            let notified = self.available.notified();

            let head = self.items.lock().pop_front();
            if let Some(track) = head {
                return Some(track);
            }

            if time::timeout_at(deadline, notified).await.is_err() {
                return None;
            }
        }
    }

    /// Elimina el track en `position` (1-indexada) o, sin posición, el último agregado.
    pub fn remove_at(&self, position: Option<usize>) -> Result<Track, QueueError> {
        let mut items = self.items.lock();

        let removed = match position {
            None => items.pop_back().ok_or(QueueError::Empty)?,
            Some(position) => position
                .checked_sub(1)
                .and_then(|index| items.remove(index))
                .ok_or(QueueError::NotFound(position))?,
        };

        debug!("❌ Track eliminado: {}", removed.title());
        Ok(removed)
    }

    /// Vacía la cola. Devuelve cuántos tracks se descartaron.
    pub fn clear(&self) -> usize {
        let mut items = self.items.lock();
        let removed = items.len();
        items.clear();
        removed
    }

    /// Copia ordenada de la cola para listarla.
    pub fn snapshot(&self) -> Vec<Track> {
        self.items.lock().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

//! # Audio Module
//!
//! Per-guild playback sessions for Walle Music.
//!
//! ## Architecture
//!
//! ### [`registry`] - Session Registry
//! - At most one session per guild, created lazily by the first command that needs it
//! - Owns the teardown of a session: destroy is idempotent and waits for voice release
//!
//! ### [`session`] - Playback Session
//! - Background player loop: dequeue, resolve a fresh stream, play, wait for the end
//! - Pause/resume/skip/volume control over the track currently playing
//! - Self-destructs after [`session::IDLE_TIMEOUT`] without anything to play
//!
//! ### [`queue`] - Queue Management
//! - FIFO of pending tracks, safe for concurrent command handlers
//! - Single consumer with a bounded wait
//!
//! ### [`output`] / [`notify`] - Collaborators
//! - Voice output over songbird and fire-and-forget text notifications

pub mod notify;
pub mod output;
pub mod queue;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

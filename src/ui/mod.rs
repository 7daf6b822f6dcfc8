//! Presentación en Discord: embeds y botones del reproductor.

pub mod buttons;
pub mod embeds;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::audio::session::SessionSettings;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub guild_id: Option<u64>, // Para comandos de desarrollo
    pub command_prefix: String,

    // Audio
    pub default_volume: f32,
    pub idle_timeout: u64, // En segundos

    // Extractor
    pub max_playlist_size: usize,
    pub ytdlp_path: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN")?,
            guild_id: std::env::var("GUILD_ID").ok().and_then(|s| s.parse().ok()),
            command_prefix: std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),

            // Audio
            default_volume: std::env::var("DEFAULT_VOLUME")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()?,
            idle_timeout: std::env::var("IDLE_TIMEOUT")
                .unwrap_or_else(|_| "300".to_string()) // 5 minutos
                .parse()?,

            // Extractor
            max_playlist_size: std::env::var("MAX_PLAYLIST_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            ytdlp_path: std::env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Default volume must be in `(0.0, 1.0]`
    /// - Idle timeout and playlist size must be greater than zero
    /// - Command prefix must not be empty
    pub fn validate(&self) -> Result<()> {
        if !(self.default_volume > 0.0 && self.default_volume <= 1.0) {
            anyhow::bail!(
                "Default volume must be between 0.0 (exclusive) and 1.0, got: {}",
                self.default_volume
            );
        }

        if self.idle_timeout == 0 {
            anyhow::bail!("Idle timeout must be greater than 0");
        }

        if self.max_playlist_size == 0 {
            anyhow::bail!("Max playlist size must be greater than 0");
        }

        if self.command_prefix.trim().is_empty() {
            anyhow::bail!("Command prefix must not be empty");
        }

        Ok(())
    }

    /// Settings every new playback session starts with.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            idle_timeout: Duration::from_secs(self.idle_timeout),
            default_volume: self.default_volume,
        }
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// Excludes the Discord token.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: prefix '{}' (Guild: {})\n  \
            Audio: {}% vol, idle timeout {}\n  \
            Extractor: {} (max {} tracks per playlist)",
            self.command_prefix,
            self.guild_id.map_or("global".to_string(), |id| id.to_string()),
            (self.default_volume * 100.0).round() as u32,
            humantime::format_duration(Duration::from_secs(self.idle_timeout)),
            self.ytdlp_path,
            self.max_playlist_size,
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (no defaults - must be provided)
            discord_token: String::new(),
            guild_id: None,
            command_prefix: "!".to_string(),

            default_volume: 0.5,
            idle_timeout: 300,

            max_playlist_size: 100,
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

use async_process::Command;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serenity::model::id::UserId;
use std::{sync::LazyLock, time::Duration};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use super::{ResolveError, ResolvedTrack, StreamLocator, StreamResolver, Track, TrackInfo};
use crate::config::Config;

/// Prefijo que yt-dlp agrega a sus errores, p. ej. `ERROR: [youtube] abc: Video unavailable`
static ERROR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ERROR:\s*(\[[^\]]+\]\s*)?(\S+:\s*)?").expect("regex válida")
});

/// Resolver basado en yt-dlp
pub struct YtDlpResolver {
    executable: String,
    max_playlist_size: usize,
    // Limitar ejecuciones concurrentes para evitar rate limiting
    rate_limiter: Semaphore,
}

/// Información extraída de yt-dlp (`--dump-json`)
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
}

impl YtDlpResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            executable: config.ytdlp_path.clone(),
            max_playlist_size: config.max_playlist_size,
            rate_limiter: Semaphore::new(3),
        }
    }

    /// Verifica que yt-dlp esté disponible
    pub async fn verify(&self) -> Result<String, ResolveError> {
        let version = self.run(&["--version"]).await?;
        Ok(version.trim().to_string())
    }

    async fn run(&self, args: &[&str]) -> Result<String, ResolveError> {
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| ResolveError::Extractor(e.to_string()))?;

        let output = Command::new(&self.executable).args(args).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::Extractor(clean_error(&stderr)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl StreamResolver for YtDlpResolver {
    async fn resolve_for_enqueue(
        &self,
        query: &str,
        requester: UserId,
    ) -> Result<Vec<Track>, ResolveError> {
        let target = search_target(query);
        info!("🔍 Resolviendo: {}", target);

        let playlist_end = self.max_playlist_size.to_string();
        let stdout = self
            .run(&[
                "--flat-playlist",
                "--dump-json",
                "--playlist-end",
                &playlist_end,
                "--no-warnings",
                &target,
            ])
            .await?;

        let tracks = parse_entries(&stdout, requester);
        if tracks.is_empty() {
            return Err(ResolveError::NoResults(query.to_string()));
        }

        debug!("📋 {} resultado(s) para {}", tracks.len(), query);
        Ok(tracks)
    }

    async fn resolve_for_playback(&self, info: &TrackInfo) -> Result<ResolvedTrack, ResolveError> {
        debug!("🎵 Obteniendo URL de stream para: {}", info.source_url);

        let stdout = self
            .run(&[
                "--no-playlist",
                "-f",
                "bestaudio/best",
                "--dump-json",
                "--no-warnings",
                &info.source_url,
            ])
            .await?;

        parse_playback(&stdout, info)
    }
}

/// URLs se pasan tal cual; texto libre se busca en YouTube
fn search_target(query: &str) -> String {
    let query = query.trim();
    match Url::parse(query) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => query.to_string(),
        _ => format!("ytsearch1:{}", query),
    }
}

fn parse_entries(stdout: &str, requester: UserId) -> Vec<Track> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpInfo>(line) {
            Ok(entry) => entry_to_info(entry, requester).map(Track::Unresolved),
            Err(e) => {
                warn!("⚠️ Entrada de yt-dlp ignorada: {}", e);
                None
            }
        })
        .collect()
}

fn entry_to_info(entry: YtDlpInfo, requester: UserId) -> Option<TrackInfo> {
    // En modo --flat-playlist la URL de la página puede venir en `url`
    let source_url = entry.webpage_url.or(entry.url)?;
    let title = entry.title.unwrap_or_else(|| source_url.clone());

    let mut info = TrackInfo::new(title, source_url, requester);
    if let Some(duration) = entry.duration.and_then(seconds) {
        info = info.with_duration(duration);
    }
    if let Some(thumbnail) = entry.thumbnail {
        info = info.with_thumbnail(thumbnail);
    }
    Some(info)
}

/// yt-dlp a veces reporta duraciones absurdas; esas se ignoran.
fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

fn parse_playback(stdout: &str, requested: &TrackInfo) -> Result<ResolvedTrack, ResolveError> {
    let line = stdout
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ResolveError::MissingStream(requested.source_url.clone()))?;
    let entry: YtDlpInfo = serde_json::from_str(line)?;

    let stream_url = entry
        .url
        .ok_or_else(|| ResolveError::MissingStream(requested.source_url.clone()))?;

    let mut info = requested.clone();
    if let Some(title) = entry.title {
        info.title = title;
    }
    if let Some(duration) = entry.duration.and_then(seconds) {
        info.duration = Some(duration);
    }
    if entry.thumbnail.is_some() {
        info.thumbnail = entry.thumbnail;
    }

    Ok(ResolvedTrack::new(info, StreamLocator::new(stream_url)))
}

fn clean_error(stderr: &str) -> String {
    let message = stderr
        .lines()
        .rev()
        .find(|line| line.starts_with("ERROR"))
        .or_else(|| stderr.lines().rev().find(|line| !line.trim().is_empty()))
        .unwrap_or("error desconocido");

    ERROR_PREFIX.replace(message, "").trim().to_string()
}

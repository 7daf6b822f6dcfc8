//! # Sources Module
//!
//! Track model and the extraction service the playback sessions depend on.
//!
//! A [`Track`] is either a lightweight request ([`Track::Unresolved`]) produced when a
//! user queues something, or a [`ResolvedTrack`] carrying a stream locator that the
//! voice driver can play directly. Locators expire, so sessions resolve them right
//! before playback through a [`StreamResolver`] instead of at queue time.

pub mod youtube;

use async_trait::async_trait;
use serenity::model::id::UserId;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub use youtube::YtDlpResolver;

/// Metadata shared by every form of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub title: String,
    /// Canonical page used to re-resolve a stream.
    pub source_url: String,
    pub requester: UserId,
    pub duration: Option<Duration>,
    pub thumbnail: Option<String>,
}

impl TrackInfo {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>, requester: UserId) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            requester,
            duration: None,
            thumbnail: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: String) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }
}

/// Short-lived, single-use URL returned by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamLocator {
    url: String,
    resolved_at: Instant,
}

impl StreamLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            resolved_at: Instant::now(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn age(&self) -> Duration {
        self.resolved_at.elapsed()
    }
}

/// A track whose stream has been resolved and can be handed to the voice output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrack {
    pub info: TrackInfo,
    pub stream: StreamLocator,
}

impl ResolvedTrack {
    pub fn new(info: TrackInfo, stream: StreamLocator) -> Self {
        Self { info, stream }
    }

    /// Whether the locator is young enough to be played without resolving again.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.stream.age() < max_age
    }

    /// Consumes the track, handing out its locator exactly once.
    pub fn into_parts(self) -> (TrackInfo, String) {
        (self.info, self.stream.url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Track {
    Unresolved(TrackInfo),
    Resolved(ResolvedTrack),
}

impl Track {
    pub fn info(&self) -> &TrackInfo {
        match self {
            Track::Unresolved(info) => info,
            Track::Resolved(resolved) => &resolved.info,
        }
    }

    pub fn title(&self) -> &str {
        &self.info().title
    }

    pub fn source_url(&self) -> &str {
        &self.info().source_url
    }

    pub fn requester(&self) -> UserId {
        self.info().requester
    }

    pub fn duration(&self) -> Option<Duration> {
        self.info().duration
    }

    pub fn into_info(self) -> TrackInfo {
        match self {
            Track::Unresolved(info) => info,
            Track::Resolved(resolved) => resolved.info,
        }
    }
}

impl From<TrackInfo> for Track {
    fn from(info: TrackInfo) -> Self {
        Track::Unresolved(info)
    }
}

/// Any failure of the extraction service. Never fatal for a session.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no se pudo ejecutar el extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("el extractor falló: {0}")]
    Extractor(String),

    #[error("respuesta inválida del extractor: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no se encontraron resultados para \"{0}\"")]
    NoResults(String),

    #[error("el extractor no devolvió un stream para {0}")]
    MissingStream(String),
}

/// Extraction service used by the sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Turns a search term or URL into queueable tracks, in collection order.
    /// Only metadata is required here.
    async fn resolve_for_enqueue(
        &self,
        query: &str,
        requester: UserId,
    ) -> Result<Vec<Track>, ResolveError>;

    /// Fetches a fresh stream locator for `info.source_url`, plus authoritative
    /// title and duration.
    async fn resolve_for_playback(&self, info: &TrackInfo) -> Result<ResolvedTrack, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(title: &str) -> TrackInfo {
        TrackInfo::new(title, format!("https://youtu.be/{title}"), UserId::new(7))
    }

    #[test]
    fn test_track_accessors_are_shape_independent() {
        let unresolved = Track::from(info("a").with_duration(Duration::from_secs(90)));
        let resolved = Track::Resolved(ResolvedTrack::new(info("a"), StreamLocator::new("s")));

        assert_eq!(unresolved.title(), "a");
        assert_eq!(resolved.title(), "a");
        assert_eq!(unresolved.source_url(), resolved.source_url());
        assert_eq!(unresolved.duration(), Some(Duration::from_secs(90)));
        assert_eq!(resolved.requester(), UserId::new(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_locator_freshness_expires() {
        let track = ResolvedTrack::new(info("a"), StreamLocator::new("s"));
        assert!(track.is_fresh(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!track.is_fresh(Duration::from_secs(60)));

        let (info, url) = track.into_parts();
        assert_eq!(info.title, "a");
        assert_eq!(url, "s");
    }
}

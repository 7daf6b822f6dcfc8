use serenity::{
    all::Timestamp,
    builder::{CreateEmbed, CreateEmbedFooter},
};
use std::time::Duration;

use crate::{
    audio::notify::Notice,
    bot::commands::QUEUE_PAGE_SIZE,
    sources::{Track, TrackInfo},
};

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
    pub const MUSIC_PURPLE: Colour = Colour::from_rgb(138, 43, 226);
    pub const NEUTRAL_GRAY: Colour = Colour::from_rgb(108, 117, 125);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎵 Walle Music";

/// Embed para un evento de la sesión
pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    match notice {
        Notice::Queued { track, position } => track_embed(track)
            .title("✅ Canción Agregada")
            .color(colors::SUCCESS_GREEN)
            .field("📋 Posición", position.to_string(), true),
        Notice::QueuedPlaylist { count, first } => CreateEmbed::default()
            .title("📋 Playlist Agregada")
            .description(format!(
                "Se agregaron **{}** canciones a la cola, empezando por **{}**",
                count, first.title
            ))
            .color(colors::SUCCESS_GREEN)
            .field("👤 Solicitado por", format!("<@{}>", first.requester), true)
            .footer(CreateEmbedFooter::new(STANDARD_FOOTER)),
        Notice::NowPlaying(track) => track_embed(track)
            .title("🎵 Reproduciendo Ahora")
            .color(colors::MUSIC_PURPLE),
        Notice::ResolutionFailed { title, reason } => error_embed(
            "❌ No se pudo obtener la canción",
            format!("**{}** se saltó: {}", title, reason),
        ),
        Notice::PlaybackFailed { title, reason } => error_embed(
            "❌ Error de reproducción",
            format!("**{}** no se pudo reproducir: {}", title, reason),
        ),
        Notice::IdleDisconnect { after } => CreateEmbed::default()
            .title("💤 Desconectado por inactividad")
            .description(format!(
                "No hubo nada que reproducir durante {}. ¡Usa play para volver a llamarme!",
                humantime::format_duration(*after)
            ))
            .color(colors::NEUTRAL_GRAY)
            .footer(CreateEmbedFooter::new(STANDARD_FOOTER)),
    }
}

/// Embed de la canción actual con su progreso
pub fn now_playing_embed(track: &TrackInfo, elapsed: Duration, paused: bool) -> CreateEmbed {
    let title = if paused {
        "⏸️ En Pausa"
    } else {
        "🎵 Reproduciendo Ahora"
    };

    track_embed(track)
        .title(title)
        .color(colors::MUSIC_PURPLE)
        .field("⏯️ Progreso", progress(elapsed, track.duration), false)
}

/// Embed con la canción actual y una página de la cola
pub fn queue_embed(
    current: Option<&(TrackInfo, Duration)>,
    upcoming: &[Track],
    page: usize,
) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("📋 Cola de Reproducción")
        .color(colors::INFO_BLUE);

    if let Some((track, elapsed)) = current {
        embed = embed.field(
            "🎵 Reproduciendo Ahora",
            format!(
                "**{}** | {} | <@{}>",
                track.title,
                progress(*elapsed, track.duration),
                track.requester
            ),
            false,
        );
    }

    if upcoming.is_empty() {
        return embed
            .description("La cola está vacía")
            .footer(CreateEmbedFooter::new(STANDARD_FOOTER));
    }

    let bounds = page_bounds(upcoming.len(), page, QUEUE_PAGE_SIZE);
    let lines: Vec<String> = upcoming[bounds.start..bounds.end]
        .iter()
        .enumerate()
        .map(|(i, track)| {
            format!(
                "`{}.` **{}** | {} | <@{}>",
                bounds.start + i + 1,
                track.title(),
                track.duration().map_or("🔴 En vivo".to_string(), format_duration),
                track.requester()
            )
        })
        .collect();

    let total: Duration = upcoming.iter().filter_map(Track::duration).sum();

    embed
        .field("⏭️ A continuación", lines.join("\n"), false)
        .footer(CreateEmbedFooter::new(format!(
            "Página {}/{} • {} canciones • {} en total",
            bounds.page,
            bounds.total_pages,
            upcoming.len(),
            format_duration(total)
        )))
}

pub fn help_embed(prefix: &str) -> CreateEmbed {
    let line = |aliases: &str, description: &str| {
        let aliases: Vec<String> = aliases
            .split(' ')
            .map(|alias| format!("`{}{}`", prefix, alias))
            .collect();
        format!("{} - {}", aliases.join(", "), description)
    };

    let playback = [
        line("join connect j", "Conecta el bot a tu canal de voz o al indicado"),
        line("play sing p", "Reproduce una canción, URL o playlist"),
        line("pause", "Pausa la reproducción"),
        line("resume", "Reanuda la reproducción"),
        line("skip next", "Salta a la siguiente canción"),
        line("volume vol v", "Muestra o ajusta el volumen (1-100)"),
        line("leave stop dc disconnect bye", "Desconecta el bot"),
    ];

    let queue = [
        line("queue q playlist que", "Muestra la cola"),
        line("np song current currentsong playing", "Muestra la canción actual"),
        line("remove rm rem", "Elimina una canción (por defecto la última)"),
        line("clear clr cl cr", "Limpia la cola"),
    ];

    CreateEmbed::default()
        .title("🎵 Comandos de Walle Music")
        .description("También disponibles como comandos slash (`/play`, `/queue`, ...)")
        .color(colors::INFO_BLUE)
        .field("🎶 Reproducción", playback.join("\n"), false)
        .field("📋 Cola", queue.join("\n"), false)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed simple para respuestas de error
pub fn error_embed(title: &str, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .description(description)
        .color(colors::ERROR_RED)
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

fn track_embed(track: &TrackInfo) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .description(format!("**{}**", track.title))
        .field(
            "⏱️ Duración",
            track.duration.map_or("🔴 En vivo".to_string(), format_duration),
            true,
        )
        .field("👤 Solicitado por", format!("<@{}>", track.requester), true)
        .url(&track.source_url)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER));

    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub start: usize,
    pub end: usize,
    /// Página efectiva, acotada al rango válido
    pub page: usize,
    pub total_pages: usize,
}

pub fn page_bounds(len: usize, page: usize, per_page: usize) -> PageBounds {
    let total_pages = len.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;

    PageBounds {
        start,
        end: (start + per_page).min(len),
        page,
        total_pages,
    }
}

/// "1:23 / 3:45", o en vivo si no hay duración conocida
pub fn progress(elapsed: Duration, total: Option<Duration>) -> String {
    match total {
        Some(total) => format!("{} / {}", format_duration(elapsed), format_duration(total)),
        None => format!("{} / 🔴 En vivo", format_duration(elapsed)),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

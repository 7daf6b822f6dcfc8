use serenity::model::id::ChannelId;
use std::str::FromStr;

use super::commands::{MusicCommand, ParseError};

/// Interpreta un mensaje de texto con prefijo (`!play ...`).
///
/// Returns `None` when the message is not a music command at all, so ordinary chat
/// is ignored silently. Malformed arguments come back as `Some(Err(..))`.
pub fn parse(content: &str, prefix: &str) -> Option<Result<MusicCommand, ParseError>> {
    let body = content.trim_start().strip_prefix(prefix)?;
    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "join" | "connect" | "j" => channel_argument(args).map(MusicCommand::Join),
        "play" | "sing" | "p" if args.is_empty() => Err(ParseError::MissingQuery),
        "play" | "sing" | "p" => Ok(MusicCommand::Play(args.to_string())),
        "pause" => Ok(MusicCommand::Pause),
        "resume" => Ok(MusicCommand::Resume),
        "skip" | "next" => Ok(MusicCommand::Skip),
        "remove" | "rm" | "rem" => optional_number(args).map(MusicCommand::Remove),
        "clear" | "clr" | "cl" | "cr" => Ok(MusicCommand::Clear),
        "queue" | "q" | "playlist" | "que" => {
            optional_number(args).map(|page| MusicCommand::Queue(page.unwrap_or(1)))
        }
        "np" | "song" | "current" | "currentsong" | "playing" => Ok(MusicCommand::NowPlaying),
        "volume" | "vol" | "v" => optional_number(args).map(MusicCommand::Volume),
        "leave" | "stop" | "dc" | "disconnect" | "bye" => Ok(MusicCommand::Leave),
        "help" => Ok(MusicCommand::Help),
        _ => return None,
    };

    Some(command)
}

fn optional_number<T: FromStr>(args: &str) -> Result<Option<T>, ParseError> {
    match args.split_whitespace().next() {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber(raw.to_string())),
    }
}

/// Acepta una mención (`<#123>`) o el id del canal.
fn channel_argument(args: &str) -> Result<Option<ChannelId>, ParseError> {
    let Some(raw) = args.split_whitespace().next() else {
        return Ok(None);
    };

    let id = raw
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(raw);

    match id.parse::<u64>() {
        Ok(id) if id != 0 => Ok(Some(ChannelId::new(id))),
        _ => Err(ParseError::InvalidChannel(raw.to_string())),
    }
}

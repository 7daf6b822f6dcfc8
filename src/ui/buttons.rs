use serenity::{
    all::ButtonStyle,
    builder::{CreateActionRow, CreateButton},
};

use crate::bot::commands::MusicCommand;

/// IDs personalizados para los botones
pub mod button_ids {
    pub const PAUSE: &str = "music_pause";
    pub const RESUME: &str = "music_resume";
    pub const SKIP: &str = "music_skip";
    pub const LEAVE: &str = "music_leave";
}

/// Controles que acompañan al mensaje de "Reproduciendo Ahora"
pub fn player_buttons() -> Vec<CreateActionRow> {
    let pause_btn = CreateButton::new(button_ids::PAUSE)
        .emoji('⏸')
        .style(ButtonStyle::Secondary);

    let resume_btn = CreateButton::new(button_ids::RESUME)
        .emoji('▶')
        .style(ButtonStyle::Primary);

    let skip_btn = CreateButton::new(button_ids::SKIP)
        .emoji('⏭')
        .style(ButtonStyle::Secondary);

    let leave_btn = CreateButton::new(button_ids::LEAVE)
        .emoji('⏹')
        .style(ButtonStyle::Danger);

    vec![CreateActionRow::Buttons(vec![
        pause_btn, resume_btn, skip_btn, leave_btn,
    ])]
}

/// Comando que ejecuta cada botón; `None` si el botón no es nuestro.
pub fn command_for_button(custom_id: &str) -> Option<MusicCommand> {
    match custom_id {
        button_ids::PAUSE => Some(MusicCommand::Pause),
        button_ids::RESUME => Some(MusicCommand::Resume),
        button_ids::SKIP => Some(MusicCommand::Skip),
        button_ids::LEAVE => Some(MusicCommand::Leave),
        _ => None,
    }
}

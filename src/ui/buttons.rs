use serenity::all::ButtonStyle;
use serenity::builder::{CreateActionRow, CreateButton};

/// IDs personalizados para los botones del panel
pub mod button_ids {
    pub const PAUSE_RESUME: &str = "music_pause_resume";
    pub const SKIP: &str = "music_skip";
    pub const STOP: &str = "music_stop";
    pub const SHUFFLE: &str = "music_shuffle";
    pub const VOLUME_UP: &str = "music_volume_up";
    pub const VOLUME_DOWN: &str = "music_volume_down";
    pub const REPLAY: &str = "music_replay";
    pub const QUEUE: &str = "music_queue";
    pub const LEAVE: &str = "music_leave";
}

/// Acciones que el panel puede disparar. Un custom_id que no corresponde
/// a ninguna se ignora.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    PauseResume,
    Skip,
    Stop,
    Shuffle,
    VolumeUp,
    VolumeDown,
    Replay,
    ShowQueue,
    Leave,
}

impl PanelAction {
    pub fn from_custom_id(id: &str) -> Option<Self> {
        match id {
            button_ids::PAUSE_RESUME => Some(Self::PauseResume),
            button_ids::SKIP => Some(Self::Skip),
            button_ids::STOP => Some(Self::Stop),
            button_ids::SHUFFLE => Some(Self::Shuffle),
            button_ids::VOLUME_UP => Some(Self::VolumeUp),
            button_ids::VOLUME_DOWN => Some(Self::VolumeDown),
            button_ids::REPLAY => Some(Self::Replay),
            button_ids::QUEUE => Some(Self::ShowQueue),
            button_ids::LEAVE => Some(Self::Leave),
            _ => None,
        }
    }

    pub fn custom_id(&self) -> &'static str {
        match self {
            Self::PauseResume => button_ids::PAUSE_RESUME,
            Self::Skip => button_ids::SKIP,
            Self::Stop => button_ids::STOP,
            Self::Shuffle => button_ids::SHUFFLE,
            Self::VolumeUp => button_ids::VOLUME_UP,
            Self::VolumeDown => button_ids::VOLUME_DOWN,
            Self::Replay => button_ids::REPLAY,
            Self::ShowQueue => button_ids::QUEUE,
            Self::Leave => button_ids::LEAVE,
        }
    }
}

/// Constructor del panel de controles
pub struct PanelControls;

impl PanelControls {
    /// Dos filas de botones para el mensaje de "reproduciendo ahora".
    pub fn rows(is_paused: bool) -> Vec<CreateActionRow> {
        let pause_emoji = if is_paused { '▶' } else { '⏸' };

        let pause_btn = CreateButton::new(button_ids::PAUSE_RESUME)
            .emoji(pause_emoji)
            .style(ButtonStyle::Primary);

        let skip_btn = CreateButton::new(button_ids::SKIP)
            .emoji('⏭')
            .style(ButtonStyle::Secondary);

        let stop_btn = CreateButton::new(button_ids::STOP)
            .emoji('⏹')
            .style(ButtonStyle::Danger);

        let shuffle_btn = CreateButton::new(button_ids::SHUFFLE)
            .emoji('🔀')
            .style(ButtonStyle::Secondary);

        let replay_btn = CreateButton::new(button_ids::REPLAY)
            .emoji('🔁')
            .style(ButtonStyle::Secondary);

        let row1 = CreateActionRow::Buttons(vec![
            pause_btn,
            skip_btn,
            stop_btn,
            shuffle_btn,
            replay_btn,
        ]);

        let vol_down_btn = CreateButton::new(button_ids::VOLUME_DOWN)
            .emoji('🔉')
            .style(ButtonStyle::Secondary);

        let vol_up_btn = CreateButton::new(button_ids::VOLUME_UP)
            .emoji('🔊')
            .style(ButtonStyle::Secondary);

        let queue_btn = CreateButton::new(button_ids::QUEUE)
            .label("Cola")
            .emoji('📋')
            .style(ButtonStyle::Secondary);

        let leave_btn = CreateButton::new(button_ids::LEAVE)
            .label("Salir")
            .emoji('👋')
            .style(ButtonStyle::Secondary);

        let row2 =
            CreateActionRow::Buttons(vec![vol_down_btn, vol_up_btn, queue_btn, leave_btn]);

        vec![row1, row2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: [PanelAction; 9] = [
        PanelAction::PauseResume,
        PanelAction::Skip,
        PanelAction::Stop,
        PanelAction::Shuffle,
        PanelAction::VolumeUp,
        PanelAction::VolumeDown,
        PanelAction::Replay,
        PanelAction::ShowQueue,
        PanelAction::Leave,
    ];

    #[test]
    fn every_action_round_trips_through_its_id() {
        for action in ALL {
            assert_eq!(PanelAction::from_custom_id(action.custom_id()), Some(action));
        }
    }

    #[test]
    fn unknown_ids_map_to_nothing() {
        assert_eq!(PanelAction::from_custom_id("music_effects"), None);
        assert_eq!(PanelAction::from_custom_id(""), None);
    }

    #[test]
    fn panel_has_two_rows() {
        assert_eq!(PanelControls::rows(false).len(), 2);
        assert_eq!(PanelControls::rows(true).len(), 2);
    }
}

//! Superficie visual del bot: botones del panel de control y embeds.

pub mod buttons;
pub mod embeds;

pub use buttons::{PanelAction, PanelControls};

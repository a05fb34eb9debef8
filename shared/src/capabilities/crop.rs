use crux_core::macros::Effect;
use crux_core::render::Render;

use crate::app::CropApp;
use crate::event::CropEvent;

/// The crop view only ever asks the shell to redraw.
#[derive(Effect)]
#[effect(app = "CropApp")]
pub struct CropCapabilities {
    pub render: Render<CropEvent>,
}

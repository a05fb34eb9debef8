use crux_core::macros::Effect;
use crux_core::render::Render;
use crux_http::Http;

use crate::app::AddressApp;
use crate::event::AddressEvent;

#[derive(Effect)]
#[effect(app = "AddressApp")]
pub struct AddressCapabilities {
    pub http: Http<AddressEvent>,
    pub render: Render<AddressEvent>,
}

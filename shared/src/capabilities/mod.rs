//! Side effects the shell performs on the core's behalf.
//!
//! The core never touches the network or the screen itself: it asks through
//! Crux's built-in `Render` and the `crux_http` capability, and the shell
//! answers with events.

mod address;
mod crop;

pub use crux_core::render::Render;
pub use crux_http::Http;

pub use self::address::{AddressCapabilities, Effect as AddressEffect};
pub use self::crop::{CropCapabilities, Effect as CropEffect};

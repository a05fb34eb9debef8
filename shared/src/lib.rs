// lib.rs - shared core for the registration flow: address lookup and the
// profile-photo crop view.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]

pub mod animation;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod geo;
pub mod gesture;
pub mod model;

pub use app::{AddressApp, CropApp};
pub use capabilities::{AddressCapabilities, AddressEffect, CropCapabilities, CropEffect};
pub use config::{ConfigError, CoreConfig, CropConfig, GeoConfig};
pub use event::{AddressEvent, CropEvent, ImageRef, ValidationError};
pub use geo::{
    AddressPicker, Country, GeoEndpoints, GeoError, GeoLookupCache, StateEntry, StatesTicket,
};
pub use gesture::{CropGestureController, CropTransform, GestureKind, ImageSize, TouchEvent};
pub use model::{AddressModel, AddressViewModel, CropSelection, CropSession, CropViewModel};

pub const DEFAULT_GEO_BASE_URL: &str = "https://countriesnow.space/api/v0.1";

pub const VIEWPORT_HORIZONTAL_INSET_PX: f64 = 24.0;
/// Viewport for a 375 pt wide device.
pub const DEFAULT_VIEWPORT_PX: f64 = 327.0;
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.5;
/// A single touch must move further than this on one axis to start a pan.
pub const PAN_SLOP_PX: f64 = 5.0;
pub const RUBBER_BAND_FACTOR: f64 = 0.3;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::CropConfig;
use crate::event::{CropEvent, ImageRef};
use crate::geo::{AddressPicker, Country, GeoEndpoints, GeoLookupCache, StateEntry};
use crate::gesture::{CropGestureController, CropTransform, GestureKind, ImageSize};

/// Frames longer than this are treated as this long, so a stalled shell
/// does not make the springs jump.
pub const MAX_FRAME_MS: u64 = 64;

/// What the crop view hands back on confirm: the original image plus the
/// transform the user settled on. No pixels are cropped here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CropSelection {
    pub image: ImageRef,
    pub transform: CropTransform,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CropViewModel {
    pub image: Option<ImageRef>,
    pub viewport_size: f64,
    pub display_size: ImageSize,
    pub transform: CropTransform,
    pub zoom_percent: u32,
    pub gesture: GestureKind,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub is_animating: bool,
    /// Set once the user confirms; the shell leaves the crop step on it.
    pub selection: Option<CropSelection>,
}

/// The crop step of profile setup.
#[derive(Debug)]
pub struct CropSession {
    controller: CropGestureController,
    image: Option<ImageRef>,
    natural_size: Option<ImageSize>,
    selection: Option<CropSelection>,
}

impl CropSession {
    pub fn new(config: CropConfig) -> Self {
        Self {
            controller: CropGestureController::new(config),
            image: None,
            natural_size: None,
            selection: None,
        }
    }

    pub fn controller(&self) -> &CropGestureController {
        &self.controller
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn selection(&self) -> Option<&CropSelection> {
        self.selection.as_ref()
    }

    pub fn update(&mut self, event: CropEvent) {
        match event {
            CropEvent::Configure(config) => match config.validate() {
                Ok(()) => {
                    self.controller = CropGestureController::new(config);
                    self.controller.load_image(self.natural_size);
                }
                Err(e) => warn!(error = %e, "ignoring crop configuration"),
            },

            CropEvent::ImageLoaded {
                image,
                natural_size,
            } => {
                self.controller.load_image(natural_size);
                self.image = Some(image);
                self.natural_size = natural_size;
                self.selection = None;
            }

            CropEvent::TouchStart => self.controller.on_gesture_start(),
            CropEvent::TouchMove(touch) => {
                self.controller.on_gesture_move(&touch);
            }
            CropEvent::TouchEnd => self.controller.on_gesture_end(),

            CropEvent::ZoomIn => {
                self.controller.zoom_in();
            }
            CropEvent::ZoomOut => {
                self.controller.zoom_out();
            }
            CropEvent::ZoomBy { delta } => {
                self.controller.set_zoom(delta);
            }
            CropEvent::Reset => self.controller.reset(),

            CropEvent::FrameTick { elapsed_ms } => {
                let elapsed = Duration::from_millis(elapsed_ms.min(MAX_FRAME_MS));
                self.controller.advance(elapsed);
            }

            CropEvent::Confirm => match &self.image {
                Some(image) => {
                    let transform = self.controller.transform();
                    info!(zoom_percent = transform.zoom_percent(), "crop confirmed");
                    self.selection = Some(CropSelection {
                        image: image.clone(),
                        transform,
                    });
                }
                None => warn!("confirm with no image loaded, ignoring"),
            },

            CropEvent::Dismiss => {
                self.controller.load_image(None);
                self.image = None;
                self.natural_size = None;
                self.selection = None;
            }
        }
    }

    pub fn view(&self) -> CropViewModel {
        let controller = &self.controller;
        CropViewModel {
            image: self.image.clone(),
            viewport_size: controller.viewport_size(),
            display_size: controller.display_size(),
            transform: controller.rendered(),
            zoom_percent: controller.zoom_percent(),
            gesture: controller.gesture(),
            can_zoom_in: controller.can_zoom_in(),
            can_zoom_out: controller.can_zoom_out(),
            is_animating: controller.is_animating(),
            selection: self.selection.clone(),
        }
    }
}

impl Default for CropSession {
    fn default() -> Self {
        Self::new(CropConfig::default())
    }
}

/// The address step: where lookups go, what has been fetched so far, and
/// what the user picked.
#[derive(Clone, Debug, Default)]
pub struct AddressModel {
    pub endpoints: GeoEndpoints,
    pub cache: GeoLookupCache,
    pub picker: AddressPicker,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AddressViewModel {
    pub countries: Vec<Country>,
    pub selected_country: Option<String>,
    pub states: Vec<StateEntry>,
    pub selected_state: Option<String>,
    pub loading_countries: bool,
    pub loading_states: bool,
    /// No states to pick from: the form shows a text field instead.
    pub state_is_free_text: bool,
}

impl AddressModel {
    pub fn view(&self) -> AddressViewModel {
        let picker = &self.picker;
        AddressViewModel {
            countries: picker.countries().to_vec(),
            selected_country: picker.selected_country().map(str::to_string),
            states: picker.states().to_vec(),
            selected_state: picker.selected_state().map(str::to_string),
            loading_countries: picker.is_loading_countries(),
            loading_states: picker.is_loading_states(),
            state_is_free_text: picker.selected_country().is_some()
                && !picker.is_loading_states()
                && !picker.has_state_options(),
        }
    }
}

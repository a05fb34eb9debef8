use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CropConfig;
use crate::geo::{Country, GeoError, StateEntry, StatesTicket};
use crate::gesture::{ImageSize, TouchEvent};

pub const MAX_IMAGE_URI_LENGTH: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("image uri cannot be empty")]
    EmptyUri,
    #[error("value too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
}

// --- Image handle: a reference to the picked file, never its bytes ---

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageRef {
    uri: String,
    pub size_bytes: Option<u64>,
    pub file_name: Option<String>,
}

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Result<Self, ValidationError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(ValidationError::EmptyUri);
        }
        if uri.len() > MAX_IMAGE_URI_LENGTH {
            return Err(ValidationError::TooLong {
                len: uri.len(),
                max: MAX_IMAGE_URI_LENGTH,
            });
        }
        Ok(Self {
            uri,
            size_bytes: None,
            file_name: None,
        })
    }

    #[must_use]
    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

// Local file paths can carry the user's name; keep them out of logs.
impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("uri_len", &self.uri.len())
            .field("size_bytes", &self.size_bytes)
            .field("file_name_present", &self.file_name.is_some())
            .finish()
    }
}

// --- Events from the shell to the crop view ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum CropEvent {
    /// Replaces the crop tuning, typically once the device width is known.
    /// An invalid configuration is ignored.
    Configure(CropConfig),

    /// `natural_size` is `None` when the platform could not read the image
    /// dimensions.
    ImageLoaded {
        image: ImageRef,
        natural_size: Option<ImageSize>,
    },

    TouchStart,
    TouchMove(TouchEvent),
    TouchEnd,

    ZoomIn,
    ZoomOut,
    ZoomBy {
        delta: f64,
    },
    Reset,

    /// Sent once per display frame while the view model reports animating.
    FrameTick {
        elapsed_ms: u64,
    },

    Confirm,
    Dismiss,
}

impl CropEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::ImageLoaded { .. } => "image_loaded",
            Self::TouchStart => "touch_start",
            Self::TouchMove(_) => "touch_move",
            Self::TouchEnd => "touch_end",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::ZoomBy { .. } => "zoom_by",
            Self::Reset => "reset",
            Self::FrameTick { .. } => "frame_tick",
            Self::Confirm => "confirm",
            Self::Dismiss => "dismiss",
        }
    }

    /// Touch moves and frame ticks arrive every frame and are not worth a
    /// log line each.
    pub fn is_high_frequency(&self) -> bool {
        matches!(self, Self::TouchMove(_) | Self::FrameTick { .. })
    }

    pub fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::Configure(_) | Self::ImageLoaded { .. } | Self::FrameTick { .. }
        )
    }
}

// --- Events for the address step ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum AddressEvent {
    /// Points the lookups at another directory. An unusable URL is ignored.
    Configure {
        base_url: String,
    },
    LoadCountries,
    SelectCountry {
        name: String,
    },
    SelectState {
        name: String,
    },

    // Directory answers, produced by the HTTP capability
    CountriesFetched(Result<Vec<Country>, GeoError>),
    StatesFetched {
        ticket: StatesTicket,
        result: Result<Vec<StateEntry>, GeoError>,
    },
}

impl AddressEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::LoadCountries => "load_countries",
            Self::SelectCountry { .. } => "select_country",
            Self::SelectState { .. } => "select_state",
            Self::CountriesFetched(_) => "countries_fetched",
            Self::StatesFetched { .. } => "states_fetched",
        }
    }
}

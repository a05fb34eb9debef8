//! Core configuration, read from a `core.toml` shipped with the shell.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::animation::SpringConfig;
use crate::geo::GeoEndpoints;
use crate::{
    DEFAULT_GEO_BASE_URL, DEFAULT_VIEWPORT_PX, MAX_SCALE, MIN_SCALE, PAN_SLOP_PX,
    RUBBER_BAND_FACTOR, VIEWPORT_HORIZONTAL_INSET_PX, ZOOM_STEP,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub geo: GeoConfig,
    pub crop: CropConfig,
}

impl CoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geo.validate()?;
        self.crop.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Directory service root; `/countries` and `/countries/states` hang off it.
    pub base_url: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEO_BASE_URL.to_string(),
        }
    }
}

impl GeoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        GeoEndpoints::new(&self.base_url)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid("geo.base_url", e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub viewport_size: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub pan_slop: f64,
    pub rubber_band: f64,
    pub zoom_step: f64,
    pub settle_spring: SpringConfig,
    pub zoom_spring: SpringConfig,
    pub reset_spring: SpringConfig,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            viewport_size: DEFAULT_VIEWPORT_PX,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            pan_slop: PAN_SLOP_PX,
            rubber_band: RUBBER_BAND_FACTOR,
            zoom_step: ZOOM_STEP,
            settle_spring: SpringConfig::SETTLE,
            zoom_spring: SpringConfig::ZOOM,
            reset_spring: SpringConfig::RESET,
        }
    }
}

impl CropConfig {
    #[must_use]
    pub fn for_device_width(device_width: f64) -> Self {
        Self {
            viewport_size: viewport_for_device_width(device_width),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport_size.is_finite() && self.viewport_size > 0.0) {
            return Err(ConfigError::invalid(
                "crop.viewport_size",
                format!("{} is not a positive size", self.viewport_size),
            ));
        }
        if !(self.min_scale.is_finite() && self.max_scale.is_finite())
            || self.min_scale <= 0.0
            || self.min_scale >= self.max_scale
        {
            return Err(ConfigError::invalid(
                "crop.min_scale",
                format!(
                    "need 0 < min_scale < max_scale, got {} and {}",
                    self.min_scale, self.max_scale
                ),
            ));
        }
        if !(self.pan_slop.is_finite() && self.pan_slop >= 0.0) {
            return Err(ConfigError::invalid("crop.pan_slop", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.rubber_band) {
            return Err(ConfigError::invalid(
                "crop.rubber_band",
                format!("{} is outside [0, 1]", self.rubber_band),
            ));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(ConfigError::invalid("crop.zoom_step", "must be > 0"));
        }
        for (field, spring) in [
            ("crop.settle_spring", self.settle_spring),
            ("crop.zoom_spring", self.zoom_spring),
            ("crop.reset_spring", self.reset_spring),
        ] {
            if !spring.is_valid() {
                return Err(ConfigError::invalid(
                    field,
                    format!(
                        "tension {} / friction {} give no usable spring",
                        spring.tension, spring.friction
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// The crop square spans the screen minus the form's side padding.
#[must_use]
pub fn viewport_for_device_width(device_width: f64) -> f64 {
    if !device_width.is_finite() {
        return DEFAULT_VIEWPORT_PX;
    }
    (device_width - 2.0 * VIEWPORT_HORIZONTAL_INSET_PX).max(1.0)
}

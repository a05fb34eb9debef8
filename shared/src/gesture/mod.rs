//! Touch handling for the profile-photo crop view.

mod crop;
mod touch;

pub use self::crop::{
    display_size, pan_limit, rubber_band, CropGestureController, CropTransform, ImageSize,
    TransformField,
};
pub use self::touch::{classify, classify_with_slop, GestureKind, TouchEvent, TouchPoint, Vec2};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::touch::{classify_with_slop, GestureKind, TouchEvent, Vec2};
use crate::animation::{AnimatedValue, ListenerId, SpringConfig, SpringScheduler};
use crate::config::CropConfig;

/// Pixel dimensions of an image, natural or displayed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    #[must_use]
    pub fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Cover-fits `natural` into a square viewport: the shorter side matches the
/// viewport and the aspect ratio is kept. An unknown or degenerate size
/// renders as the viewport square.
#[must_use]
pub fn display_size(natural: Option<ImageSize>, viewport: f64) -> ImageSize {
    match natural {
        Some(size) if size.is_usable() => {
            if size.width > size.height {
                ImageSize::new(viewport * size.width / size.height, viewport)
            } else {
                ImageSize::new(viewport, viewport * size.height / size.width)
            }
        }
        _ => ImageSize::square(viewport),
    }
}

/// How far the image may travel from center along one axis at `scale`.
#[must_use]
pub fn pan_limit(display_extent: f64, scale: f64, viewport: f64) -> f64 {
    ((display_extent * scale - viewport) / 2.0).max(0.0)
}

/// Past `limit`, only `factor` of the remaining travel is applied.
#[must_use]
pub fn rubber_band(value: f64, limit: f64, factor: f64) -> f64 {
    if value.abs() <= limit {
        return value;
    }
    value.signum() * (limit + (value.abs() - limit) * factor)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl CropTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round().max(0.0) as u32
    }

    #[must_use]
    pub fn translate(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }
}

impl Default for CropTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformField {
    Scale,
    TranslateX,
    TranslateY,
}

/// Pinch-zoom and pan over an image shown in a square viewport.
///
/// Two transforms are tracked. The committed transform is where the image
/// rests once any running spring finishes; zoom steps and gesture clamping
/// build on it. The rendered transform is what is on screen this frame and is
/// published through the animated values.
#[derive(Debug)]
pub struct CropGestureController {
    config: CropConfig,
    display: ImageSize,

    scale: f64,
    translate: Vec2,

    last_scale: f64,
    last_translate: Vec2,
    last_pinch_distance: Option<f64>,
    gesture: GestureKind,

    rendered_scale: AnimatedValue,
    rendered_x: AnimatedValue,
    rendered_y: AnimatedValue,
    springs: SpringScheduler<TransformField>,
}

impl CropGestureController {
    #[must_use]
    pub fn new(config: CropConfig) -> Self {
        let display = ImageSize::square(config.viewport_size);
        let scale = config.min_scale;
        Self {
            config,
            display,
            scale,
            translate: Vec2::ZERO,
            last_scale: scale,
            last_translate: Vec2::ZERO,
            last_pinch_distance: None,
            gesture: GestureKind::Idle,
            rendered_scale: AnimatedValue::new(scale),
            rendered_x: AnimatedValue::new(0.0),
            rendered_y: AnimatedValue::new(0.0),
            springs: SpringScheduler::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport_size(&self) -> f64 {
        self.config.viewport_size
    }

    #[must_use]
    pub fn display_size(&self) -> ImageSize {
        self.display
    }

    #[must_use]
    pub fn gesture(&self) -> GestureKind {
        self.gesture
    }

    #[must_use]
    pub fn last_pinch_distance(&self) -> Option<f64> {
        self.last_pinch_distance
    }

    #[must_use]
    pub fn transform(&self) -> CropTransform {
        CropTransform {
            scale: self.scale,
            translate_x: self.translate.x,
            translate_y: self.translate.y,
        }
    }

    #[must_use]
    pub fn rendered(&self) -> CropTransform {
        CropTransform {
            scale: self.rendered_scale.value(),
            translate_x: self.rendered_x.value(),
            translate_y: self.rendered_y.value(),
        }
    }

    #[must_use]
    pub fn zoom_percent(&self) -> u32 {
        self.transform().zoom_percent()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.springs.is_idle()
    }

    #[must_use]
    pub fn can_zoom_in(&self) -> bool {
        self.scale < self.config.max_scale
    }

    #[must_use]
    pub fn can_zoom_out(&self) -> bool {
        self.scale > self.config.min_scale
    }

    pub fn subscribe<F>(&mut self, field: TransformField, listener: F) -> ListenerId
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.value_mut(field).subscribe(listener)
    }

    pub fn unsubscribe(&mut self, field: TransformField, id: ListenerId) -> bool {
        self.value_mut(field).unsubscribe(id)
    }

    /// Recomputes the display size for a newly picked image and snaps back to
    /// the fitted view without animating.
    pub fn load_image(&mut self, natural: Option<ImageSize>) {
        self.display = display_size(natural, self.config.viewport_size);
        if natural.map_or(true, |size| !size.is_usable()) {
            debug!(
                viewport = self.config.viewport_size,
                "image size unavailable, displaying as viewport square"
            );
        }
        self.jump_to(CropTransform {
            scale: self.config.min_scale,
            ..CropTransform::IDENTITY
        });
    }

    /// Translation limits for the current scale.
    #[must_use]
    pub fn pan_bounds(&self) -> Vec2 {
        self.pan_bounds_at(self.scale)
    }

    fn pan_bounds_at(&self, scale: f64) -> Vec2 {
        let viewport = self.config.viewport_size;
        Vec2::new(
            pan_limit(self.display.width, scale, viewport),
            pan_limit(self.display.height, scale, viewport),
        )
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    // --- Gesture lifecycle ---

    /// Takes over from any running spring: whatever is on screen becomes the
    /// base for this gesture's deltas.
    pub fn on_gesture_start(&mut self) {
        self.springs.stop_all();
        self.scale = self.clamp_scale(self.rendered_scale.value());
        self.translate = Vec2::new(self.rendered_x.value(), self.rendered_y.value());

        self.last_scale = self.scale;
        self.last_translate = self.translate;
        self.last_pinch_distance = None;
        self.gesture = GestureKind::Idle;
    }

    pub fn on_gesture_move(&mut self, event: &TouchEvent) -> GestureKind {
        let touch_count = event.touches.len();
        self.gesture = self.next_gesture(touch_count, event.delta.max_axis());

        match self.gesture {
            GestureKind::Pinching if touch_count >= 2 => self.pinch(event),
            GestureKind::Panning if touch_count == 1 => self.pan(event.delta),
            _ => {}
        }
        self.gesture
    }

    fn next_gesture(&self, touch_count: usize, movement: f64) -> GestureKind {
        match classify_with_slop(touch_count, movement, self.config.pan_slop) {
            // a finger left over from a pinch, or a pan back inside the slop
            GestureKind::Idle if touch_count == 1 && self.gesture != GestureKind::Idle => {
                GestureKind::Panning
            }
            GestureKind::Idle => self.gesture,
            kind => kind,
        }
    }

    fn pinch(&mut self, event: &TouchEvent) {
        let Some(distance) = event.pinch_distance().filter(|d| d.is_finite()) else {
            return;
        };

        if let Some(previous) = self.last_pinch_distance.filter(|p| *p > 0.0) {
            let factor = distance / previous;
            let scale = self.clamp_scale(self.last_scale * factor);
            self.last_scale = scale;
            self.scale = scale;
            self.write_direct(TransformField::Scale, scale);
        }
        self.last_pinch_distance = Some(distance);
    }

    fn pan(&mut self, delta: Vec2) {
        self.last_pinch_distance = None;
        if self.scale <= self.config.min_scale || !delta.is_finite() {
            return;
        }

        let bounds = self.pan_bounds();
        let factor = self.config.rubber_band;
        let next = Vec2::new(
            rubber_band(self.last_translate.x + delta.x, bounds.x, factor),
            rubber_band(self.last_translate.y + delta.y, bounds.y, factor),
        );
        self.translate = next;
        self.write_direct(TransformField::TranslateX, next.x);
        self.write_direct(TransformField::TranslateY, next.y);
    }

    /// Pulls any rubber-band overshoot back inside the bounds with a spring
    /// and commits the result as the base for the next gesture.
    pub fn on_gesture_end(&mut self) {
        let bounds = self.pan_bounds();
        let settled = Vec2::new(
            self.translate.x.clamp(-bounds.x, bounds.x),
            self.translate.y.clamp(-bounds.y, bounds.y),
        );
        debug!(
            gesture = ?self.gesture,
            scale = self.scale,
            from_x = self.translate.x,
            from_y = self.translate.y,
            to_x = settled.x,
            to_y = settled.y,
            "gesture released"
        );

        self.translate = settled;
        let spring = self.config.settle_spring;
        self.animate(TransformField::TranslateX, settled.x, spring);
        self.animate(TransformField::TranslateY, settled.y, spring);

        self.last_translate = settled;
        self.last_scale = self.scale;
        self.last_pinch_distance = None;
        self.gesture = GestureKind::Idle;
    }

    // --- Explicit controls ---

    /// Steps the zoom by `delta`. Fully zoomed out always recenters; any other
    /// level keeps the image inside the new, tighter bounds.
    pub fn set_zoom(&mut self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.scale;
        }
        let scale = self.clamp_scale(self.scale + delta);
        let zoom_spring = self.config.zoom_spring;

        self.scale = scale;
        self.last_scale = scale;
        self.animate(TransformField::Scale, scale, zoom_spring);

        let translate = if scale <= self.config.min_scale {
            Vec2::ZERO
        } else {
            let bounds = self.pan_bounds_at(scale);
            Vec2::new(
                self.translate.x.clamp(-bounds.x, bounds.x),
                self.translate.y.clamp(-bounds.y, bounds.y),
            )
        };
        if translate != self.translate {
            self.translate = translate;
            self.animate(TransformField::TranslateX, translate.x, zoom_spring);
            self.animate(TransformField::TranslateY, translate.y, zoom_spring);
        }
        self.last_translate = translate;
        scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(-self.config.zoom_step)
    }

    pub fn reset(&mut self) {
        let spring = self.config.reset_spring;
        self.scale = self.config.min_scale;
        self.translate = Vec2::ZERO;
        self.last_scale = self.scale;
        self.last_translate = Vec2::ZERO;
        self.last_pinch_distance = None;
        self.gesture = GestureKind::Idle;

        self.animate(TransformField::Scale, self.scale, spring);
        self.animate(TransformField::TranslateX, 0.0, spring);
        self.animate(TransformField::TranslateY, 0.0, spring);
    }

    /// Advances running springs by one frame. Returns whether any are still
    /// running.
    pub fn advance(&mut self, dt: Duration) -> bool {
        for (field, value) in self.springs.tick(dt) {
            let value = match field {
                TransformField::Scale => self.clamp_scale(value),
                TransformField::TranslateX | TransformField::TranslateY => value,
            };
            self.value_mut(field).set_value(value);
        }
        self.is_animating()
    }

    /// Jumps straight to `transform`, cancelling any animation.
    pub fn jump_to(&mut self, transform: CropTransform) {
        self.springs.stop_all();
        self.scale = self.clamp_scale(transform.scale);
        self.translate = transform.translate();
        self.last_scale = self.scale;
        self.last_translate = self.translate;
        self.last_pinch_distance = None;
        self.gesture = GestureKind::Idle;

        self.rendered_scale.set_value(self.scale);
        self.rendered_x.set_value(self.translate.x);
        self.rendered_y.set_value(self.translate.y);
    }

    fn animate(&mut self, field: TransformField, to: f64, config: SpringConfig) {
        let from = self.value_mut(field).value();
        self.springs.start(field, from, to, config);
    }

    fn write_direct(&mut self, field: TransformField, value: f64) {
        self.springs.stop(field);
        self.value_mut(field).set_value(value);
    }

    fn value_mut(&mut self, field: TransformField) -> &mut AnimatedValue {
        match field {
            TransformField::Scale => &mut self.rendered_scale,
            TransformField::TranslateX => &mut self.rendered_x,
            TransformField::TranslateY => &mut self.rendered_y,
        }
    }
}

impl Default for CropGestureController {
    fn default() -> Self {
        Self::new(CropConfig::default())
    }
}

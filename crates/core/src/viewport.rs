//! Time ↔ pixel mapping under pan and cursor-anchored zoom.
//!
//! A [`Viewport`] maps a time `t` (µs) to the horizontal pixel
//! `(t - origin) * scale`. Every transform here keeps `scale` strictly
//! positive and finite, so `to_pixel` and `to_time` stay exact inverses.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::TimeRange;

/// Pixels per microsecond used before any trace has been fitted.
pub const DEFAULT_SCALE: f64 = 0.1;
/// Smallest scale a viewport will hold.
pub const MIN_SCALE: f64 = 1e-12;
/// Largest scale a viewport will hold.
pub const MAX_SCALE: f64 = 1e12;
/// Fitting never divides by a duration shorter than this (µs).
pub const MIN_FIT_DURATION: f64 = 1.0;
/// Fraction of the fitted duration left empty on each side.
const FIT_PADDING: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    origin: f64,
    scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: 0.0,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Viewport {
    /// Build a viewport, clamping an invalid `scale` into range.
    pub fn new(origin: f64, scale: f64) -> Self {
        Self {
            origin,
            scale: sanitize_scale(scale),
        }
    }

    /// Time value drawn at pixel 0.
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Pixels per microsecond; always `> 0`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Viewport showing `bounds` across `width` pixels with 5% padding on
    /// both sides. With no bounds (empty trace) this is the default view.
    pub fn fit(bounds: Option<TimeRange>, width: f64) -> Self {
        let Some(bounds) = bounds else {
            return Self::default();
        };
        let width = if width.is_finite() {
            width.max(1.0)
        } else {
            1.0
        };
        let duration = bounds.duration().max(MIN_FIT_DURATION);
        Self::new(
            bounds.start - FIT_PADDING * duration,
            width / ((1.0 + 2.0 * FIT_PADDING) * duration),
        )
    }

    /// Shift the view by `delta_px` pixels; positive moves later in time.
    pub fn pan(self, delta_px: f64) -> Self {
        Self {
            origin: self.origin + delta_px / self.scale,
            scale: self.scale,
        }
    }

    /// Scale by `factor` (> 1 zooms in) while the time under `pixel_x` stays
    /// under `pixel_x`. Non-positive or non-finite factors leave the view
    /// unchanged.
    pub fn zoom_at(self, pixel_x: f64, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        let anchor = self.to_time(pixel_x);
        let scale = sanitize_scale(self.scale * factor);
        Self {
            origin: anchor - pixel_x / scale,
            scale,
        }
    }

    #[inline]
    pub fn to_pixel(&self, time: f64) -> f64 {
        (time - self.origin) * self.scale
    }

    #[inline]
    pub fn to_time(&self, pixel: f64) -> f64 {
        self.origin + pixel / self.scale
    }

    /// Time interval covered by pixels `0..=width`.
    pub fn visible_range(&self, width: f64) -> TimeRange {
        TimeRange::new(self.to_time(0.0), self.to_time(width))
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        warn!("viewport scale is NaN, resetting to {DEFAULT_SCALE}");
        return DEFAULT_SCALE;
    }
    let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
    if clamped != scale {
        warn!("viewport scale {scale} out of range, clamped to {clamped}");
    }
    clamped
}

//! Drawing-surface contract.
//!
//! The simulator never owns a window or canvas. A [`SurfaceHandle`] measures
//! the host's display box and may hand out a [`DrawContext`]; the context
//! receives a small set of immediate-mode calls each tick.

pub mod color;
pub mod recording;

use glam::Vec2;

pub use color::{Hsla, Rgba};
pub use recording::{DrawCommand, RecordingContext, RecordingSurface};

use crate::particles::Bounds;

/// Logical size of the drawing area plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBox {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl DisplayBox {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Backing buffer dimensions in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let bounds = self.bounds();
        (
            (bounds.width * self.pixel_ratio).round() as u32,
            (bounds.height * self.pixel_ratio).round() as u32,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.bounds().is_degenerate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: [ColorStop; 3],
}

impl RadialGradient {
    /// Colour at `distance` from the centre, clamped to the outermost stop.
    pub fn sample(&self, distance: f32) -> Rgba {
        let t = if self.radius > 0.0 {
            (distance / self.radius).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mut previous = self.stops[0];
        if t <= previous.offset {
            return previous.color;
        }
        for stop in &self.stops[1..] {
            if t <= stop.offset {
                let span = stop.offset - previous.offset;
                let local = if span > 0.0 { (t - previous.offset) / span } else { 1.0 };
                return previous.color.lerp(stop.color, local);
            }
            previous = *stop;
        }
        previous.color
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Radial(RadialGradient),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
    /// Global alpha applied on top of `color`.
    pub opacity: f32,
}

/// Immediate-mode 2D drawing calls, in logical (display) units.
pub trait DrawContext {
    /// Resize the backing buffer and scale so logical coordinates stay in display units.
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, stroke: Stroke);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint, opacity: f32);
}

/// Host-owned drawing target.
pub trait SurfaceHandle {
    type Context: DrawContext;

    fn display_box(&self) -> DisplayBox;

    /// `None` when the host cannot provide a 2D context.
    fn context_2d(&mut self) -> Option<Self::Context>;
}

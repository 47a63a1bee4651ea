use glam::Vec2;

use super::{DisplayBox, DrawContext, Paint, Rgba, Stroke, SurfaceHandle};

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Configure {
        backing_width: u32,
        backing_height: u32,
        scale: f32,
    },
    FillRect {
        origin: Vec2,
        size: Vec2,
        color: Rgba,
    },
    StrokeQuadratic {
        from: Vec2,
        control: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        paint: Paint,
        opacity: f32,
    },
}

/// Display-list context: keeps every call for later inspection or replay.
#[derive(Debug, Default, Clone)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand back the recorded calls and start a fresh list.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count_circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count()
    }

    pub fn count_strokes(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeQuadratic { .. }))
            .count()
    }
}

impl DrawContext for RecordingContext {
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32) {
        self.commands.push(DrawCommand::Configure {
            backing_width,
            backing_height,
            scale,
        });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            size,
            color,
        });
    }

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeQuadratic {
            from,
            control,
            to,
            stroke,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint, opacity: f32) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint,
            opacity,
        });
    }
}

/// Headless surface of a fixed size. `unavailable` models a host without 2D support.
#[derive(Debug, Clone, Copy)]
pub struct RecordingSurface {
    display: DisplayBox,
    available: bool,
}

impl RecordingSurface {
    pub fn new(display: DisplayBox) -> Self {
        Self {
            display,
            available: true,
        }
    }

    pub fn unavailable(display: DisplayBox) -> Self {
        Self {
            display,
            available: false,
        }
    }

    pub fn set_display_box(&mut self, display: DisplayBox) {
        self.display = display;
    }
}

impl SurfaceHandle for RecordingSurface {
    type Context = RecordingContext;

    fn display_box(&self) -> DisplayBox {
        self.display
    }

    fn context_2d(&mut self) -> Option<Self::Context> {
        self.available.then(RecordingContext::default)
    }
}

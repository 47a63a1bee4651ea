//! Rendering backends sharing one contract.
//!
//! [`Painter`] issues immediate-mode draw calls on a [`DrawContext`](crate::surface::DrawContext);
//! [`ElementPositioner`] keeps one retained element per particle and only
//! rewrites their styles. Hosts pick one with [`BackendKind::select`].

pub mod elements;
pub mod painter;

use rand::RngCore;

pub use elements::{ElementPositioner, ElementStyle};
pub use painter::Painter;

use crate::particles::ParticleField;
use crate::quality::DeviceCapabilities;
use crate::surface::DisplayBox;

pub trait FieldRenderer {
    fn resize(&mut self, display: DisplayBox);

    /// Draw the field as left by the latest update. `rng` feeds per-frame jitter.
    fn render(&mut self, field: &ParticleField, rng: &mut dyn RngCore);

    /// Drop anything the backend created on the host.
    fn release(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Painter,
    Elements,
}

impl BackendKind {
    pub fn select(capabilities: &DeviceCapabilities) -> Self {
        if capabilities.supports_canvas {
            Self::Painter
        } else {
            Self::Elements
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "painter" | "canvas" => Ok(Self::Painter),
            "elements" | "dom" => Ok(Self::Elements),
            other => Err(format!("unknown render backend `{}`", other)),
        }
    }
}

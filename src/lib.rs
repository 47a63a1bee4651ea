//! Animated "liquid" particle field: a small 2D physics toy with pointer
//! repulsion, cohesion and surface tension, rendered through host-supplied
//! drawing surfaces.

pub mod frame;
pub mod host;
pub mod particles;
pub mod quality;
pub mod render;
pub mod simulator;
pub mod surface;

pub use glam::Vec2;
pub use simulator::{Simulator, SimulatorError, TickOutcome};

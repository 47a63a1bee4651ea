pub mod config;
pub mod simulation;

pub use config::{ConfigError, FieldConfig, PairVisit};
pub use simulation::{
    Bounds, Connection, ForceAccumulation, Particle, ParticleField, PointerState,
    CONNECTION_FRACTION, RESTITUTION,
};

use glam::Vec2;
use rand::Rng;

use super::config::{FieldConfig, PairVisit};
use crate::surface::Hsla;

/// Fraction of the normal velocity kept after hitting a wall.
pub const RESTITUTION: f32 = 0.7;
/// Pairs closer than this fraction of the connection distance are recorded for rendering.
pub const CONNECTION_FRACTION: f32 = 0.8;

const POINTER_GAIN: f32 = 0.1;
const COHESION_GAIN: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub tint: Hsla,
}

impl Particle {
    pub fn at_rest(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            tint: Hsla::new(230.0, 85.0, 70.0, 0.8),
        }
    }

    pub fn with_velocity(self, velocity: Vec2) -> Self {
        Self { velocity, ..self }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    fn random<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds) -> Self {
        // Blue to violet, bright and mostly opaque.
        Self {
            position: Vec2::new(rng.gen::<f32>() * bounds.width, rng.gen::<f32>() * bounds.height),
            velocity: Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * 0.5,
            radius: rng.gen::<f32>() * 3.0 + 2.0,
            tint: Hsla::new(
                rng.gen::<f32>() * 60.0 + 200.0,
                rng.gen::<f32>() * 30.0 + 70.0,
                rng.gen::<f32>() * 20.0 + 60.0,
                rng.gen::<f32>() * 0.4 + 0.6,
            ),
        }
    }
}

/// A pair of particles close enough to be drawn as linked this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    /// `1 - distance / connection_distance`, in (0.2, 1].
    pub strength: f32,
}

/// Logical viewport extent. Negative or non-finite extents collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub influence_radius: f32,
}

impl PointerState {
    pub fn centered(bounds: Bounds, influence_radius: f32) -> Self {
        Self {
            position: bounds.center(),
            influence_radius,
        }
    }
}

/// Velocity impulses and connections gathered from one snapshot of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceAccumulation {
    pub impulses: Vec<Vec2>,
    pub connections: Vec<Connection>,
}

struct Link {
    impulse: Vec2,
    connection: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    bounds: Bounds,
    particles: Vec<Particle>,
    connections: Vec<Connection>,
}

impl ParticleField {
    pub fn spawn<R: Rng + ?Sized>(config: FieldConfig, bounds: Bounds, rng: &mut R) -> Self {
        let particles = (0..config.particle_count)
            .map(|_| Particle::random(rng, bounds))
            .collect();
        Self::from_particles(config, bounds, particles)
    }

    pub fn from_particles(config: FieldConfig, bounds: Bounds, particles: Vec<Particle>) -> Self {
        Self {
            config,
            bounds,
            particles,
            connections: Vec::new(),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Particles keep their positions; the next step pulls stragglers back inside.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.connections.clear();
    }

    /// Advance the field by one tick.
    pub fn step(&mut self, pointer: &PointerState) {
        let forces = self.accumulate_forces(pointer);
        self.integrate(forces);
    }

    /// Gather every impulse from the current snapshot without moving anything.
    ///
    /// Pointer repulsion, pairwise cohesion, surface tension toward the
    /// centroid of connected neighbours and the centre pull all read positions
    /// from before this tick, so the result does not depend on particle order.
    pub fn accumulate_forces(&self, pointer: &PointerState) -> ForceAccumulation {
        let count = self.particles.len();
        let mut impulses = vec![Vec2::ZERO; count];
        let mut neighbour_sum = vec![Vec2::ZERO; count];
        let mut neighbour_count = vec![0u32; count];
        let mut connections = Vec::new();

        for (impulse, particle) in impulses.iter_mut().zip(&self.particles) {
            *impulse += pointer_repulsion(particle.position, pointer, self.config.repulsion);
        }

        match self.config.pair_visit {
            PairVisit::Unordered => {
                for i in 0..count {
                    for j in (i + 1)..count {
                        let Some(link) = self.cohesion(i, j) else {
                            continue;
                        };
                        impulses[i] += link.impulse;
                        impulses[j] -= link.impulse;
                        if let Some(strength) = link.connection {
                            connections.push(Connection {
                                from: i,
                                to: j,
                                strength,
                            });
                            neighbour_sum[i] += self.particles[j].position;
                            neighbour_sum[j] += self.particles[i].position;
                            neighbour_count[i] += 1;
                            neighbour_count[j] += 1;
                        }
                    }
                }
            }
            PairVisit::Ordered => {
                for i in 0..count {
                    for j in 0..count {
                        if i == j {
                            continue;
                        }
                        let Some(link) = self.cohesion(i, j) else {
                            continue;
                        };
                        impulses[i] += link.impulse;
                        if let Some(strength) = link.connection {
                            if i < j {
                                connections.push(Connection {
                                    from: i,
                                    to: j,
                                    strength,
                                });
                            }
                            neighbour_sum[i] += self.particles[j].position;
                            neighbour_count[i] += 1;
                        }
                    }
                }
            }
        }

        let center = self.bounds.center();
        for (i, particle) in self.particles.iter().enumerate() {
            if neighbour_count[i] > 0 {
                let centroid = neighbour_sum[i] / neighbour_count[i] as f32;
                impulses[i] += (centroid - particle.position) * self.config.surface_tension;
            }
            impulses[i] += (center - particle.position) * self.config.center_pull;
        }

        ForceAccumulation {
            impulses,
            connections,
        }
    }

    /// Apply accumulated impulses, then limit, damp, move and bounce every particle.
    pub fn integrate(&mut self, forces: ForceAccumulation) {
        let max_speed = self.config.max_speed;
        let retention = self.config.velocity_retention();
        let bounds = self.bounds;

        for (particle, impulse) in self.particles.iter_mut().zip(&forces.impulses) {
            let velocity = (particle.velocity + *impulse).clamp_length_max(max_speed) * retention;
            particle.velocity = velocity;
            particle.position += velocity;
            reflect(particle, bounds);
        }

        self.connections = forces.connections;
    }

    fn cohesion(&self, i: usize, j: usize) -> Option<Link> {
        let reach = self.config.connection_distance;
        let delta = self.particles[j].position - self.particles[i].position;
        let distance = delta.length();
        if distance <= 0.0 || distance >= reach {
            return None;
        }

        let falloff = (reach - distance) / reach;
        Some(Link {
            impulse: delta / distance * (falloff * self.config.attraction * COHESION_GAIN),
            connection: (distance < reach * CONNECTION_FRACTION).then_some(falloff),
        })
    }
}

fn pointer_repulsion(position: Vec2, pointer: &PointerState, repulsion: f32) -> Vec2 {
    let away = position - pointer.position;
    let distance = away.length();
    if !distance.is_finite() || distance >= pointer.influence_radius {
        return Vec2::ZERO;
    }
    let falloff = (pointer.influence_radius - distance) / pointer.influence_radius;
    away.normalize_or_zero() * (falloff * repulsion * POINTER_GAIN)
}

fn reflect(particle: &mut Particle, bounds: Bounds) {
    let radius = particle.radius;

    if particle.position.x < radius {
        particle.position.x = radius;
        particle.velocity.x = particle.velocity.x.abs() * RESTITUTION;
    }
    if particle.position.x > bounds.width - radius {
        particle.position.x = bounds.width - radius;
        particle.velocity.x = -particle.velocity.x.abs() * RESTITUTION;
    }
    if particle.position.y < radius {
        particle.position.y = radius;
        particle.velocity.y = particle.velocity.y.abs() * RESTITUTION;
    }
    if particle.position.y > bounds.height - radius {
        particle.position.y = bounds.height - radius;
        particle.velocity.y = -particle.velocity.y.abs() * RESTITUTION;
    }
}

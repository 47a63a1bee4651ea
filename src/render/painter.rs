use glam::Vec2;
use rand::{Rng, RngCore};

use super::FieldRenderer;
use crate::particles::{Particle, ParticleField};
use crate::surface::{
    ColorStop, DisplayBox, DrawContext, Hsla, Paint, RadialGradient, Rgba, Stroke,
};

/// Low-alpha overlay instead of a hard clear leaves motion trails.
const TRAIL_FADE: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.05);
const LINK_COLOR: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.1);
const LINK_MIN_STRENGTH: f32 = 0.3;
const LINK_JITTER: f32 = 20.0;

/// Immediate-mode backend over a host draw context.
#[derive(Debug)]
pub struct Painter<C> {
    context: C,
    display: DisplayBox,
}

impl<C: DrawContext> Painter<C> {
    pub fn new(context: C, display: DisplayBox) -> Self {
        let mut painter = Self { context, display };
        painter.configure();
        painter
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn display(&self) -> DisplayBox {
        self.display
    }

    fn configure(&mut self) {
        let (width, height) = self.display.backing_size();
        self.context.configure(width, height, self.display.pixel_ratio);
    }

    fn draw_links(&mut self, field: &ParticleField, rng: &mut dyn RngCore) {
        let particles = field.particles();
        for link in field.connections() {
            if link.strength <= LINK_MIN_STRENGTH {
                continue;
            }
            let from = particles[link.from].position;
            let to = particles[link.to].position;
            let spread = link.strength * LINK_JITTER;
            let jitter = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * spread;
            self.context.stroke_quadratic(
                from,
                (from + to) * 0.5 + jitter,
                to,
                Stroke {
                    color: LINK_COLOR,
                    width: 1.0,
                    opacity: link.strength * 0.3,
                },
            );
        }
    }

    fn draw_particle(&mut self, particle: &Particle) {
        let tint = particle.tint;
        let body = RadialGradient {
            center: particle.position,
            radius: particle.radius * 2.0,
            stops: [
                ColorStop {
                    offset: 0.0,
                    color: tint.to_rgba(),
                },
                ColorStop {
                    offset: 0.7,
                    color: tint.shifted(20.0, -10.0).with_alpha(tint.alpha * 0.6).to_rgba(),
                },
                ColorStop {
                    offset: 1.0,
                    color: Rgba::TRANSPARENT,
                },
            ],
        };
        self.context.fill_circle(
            particle.position,
            particle.radius,
            Paint::Radial(body),
            tint.alpha,
        );

        // Specular highlight, up and to the left.
        let highlight = Hsla::new(tint.hue + 40.0, 100.0, 90.0, 0.3);
        self.context.fill_circle(
            particle.position - Vec2::splat(particle.radius * 0.3),
            particle.radius * 0.4,
            Paint::Solid(highlight.to_rgba()),
            tint.alpha * 0.8,
        );
    }
}

impl<C: DrawContext> FieldRenderer for Painter<C> {
    fn resize(&mut self, display: DisplayBox) {
        self.display = display;
        self.configure();
    }

    fn render(&mut self, field: &ParticleField, rng: &mut dyn RngCore) {
        if field.is_empty() {
            return;
        }

        let bounds = self.display.bounds();
        self.context.fill_rect(
            Vec2::ZERO,
            Vec2::new(bounds.width, bounds.height),
            TRAIL_FADE,
        );
        self.draw_links(field, rng);
        for particle in field.particles() {
            self.draw_particle(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::Painter;
    use crate::particles::{Bounds, FieldConfig, Particle, ParticleField, PointerState};
    use crate::render::FieldRenderer;
    use crate::surface::{DisplayBox, DrawCommand, Paint, RecordingContext};

    fn pair_field(gap: f32) -> ParticleField {
        let mut field = ParticleField::from_particles(
            FieldConfig::default(),
            Bounds::new(400.0, 300.0),
            vec![
                Particle::at_rest(Vec2::new(150.0, 150.0), 3.0),
                Particle::at_rest(Vec2::new(150.0 + gap, 150.0), 3.0),
            ],
        );
        field.step(&PointerState {
            position: Vec2::new(-500.0, -500.0),
            influence_radius: 100.0,
        });
        field
    }

    fn painter() -> Painter<RecordingContext> {
        Painter::new(RecordingContext::default(), DisplayBox::new(400.0, 300.0, 1.0))
    }

    #[test]
    fn configures_backing_buffer_on_creation() {
        let painter = Painter::new(RecordingContext::default(), DisplayBox::new(400.0, 300.0, 2.0));
        assert_eq!(
            painter.context().commands(),
            &[DrawCommand::Configure {
                backing_width: 800,
                backing_height: 600,
                scale: 2.0,
            }]
        );
    }

    #[test]
    fn draws_overlay_links_and_two_discs_per_particle() {
        let field = pair_field(20.0);
        let mut painter = painter();
        painter.context_mut().take();

        painter.render(&field, &mut StdRng::seed_from_u64(5));

        let commands = painter.context().commands();
        assert!(matches!(commands[0], DrawCommand::FillRect { .. }));
        assert_eq!(painter.context().count_strokes(), 1);
        assert_eq!(painter.context().count_circles(), 4);
        let gradients = commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::FillCircle {
                        paint: Paint::Radial(_),
                        ..
                    }
                )
            })
            .count();
        assert_eq!(gradients, 2);
    }

    #[test]
    fn weak_links_are_not_stroked() {
        // Strength 1 - 90/120 = 0.25 is recorded but below the stroke threshold.
        let field = pair_field(90.0);
        assert_eq!(field.connections().len(), 1);
        let mut painter = painter();

        painter.render(&field, &mut StdRng::seed_from_u64(5));

        assert_eq!(painter.context().count_strokes(), 0);
    }

    #[test]
    fn link_curvature_stays_near_midpoint() {
        let field = pair_field(20.0);
        let mut painter = painter();
        painter.render(&field, &mut StdRng::seed_from_u64(9));

        let stroke = painter
            .context()
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::StrokeQuadratic {
                    from, control, to, ..
                } => Some((*from, *control, *to)),
                _ => None,
            })
            .unwrap();
        let midpoint = (stroke.0 + stroke.2) * 0.5;
        let strength = field.connections()[0].strength;
        assert!((stroke.1 - midpoint).abs().max_element() <= strength * 10.0 + 1e-4);
    }

    #[test]
    fn empty_field_draws_nothing() {
        let bounds = Bounds::new(400.0, 300.0);
        let field = ParticleField::from_particles(FieldConfig::default(), bounds, Vec::new());
        let mut painter = painter();
        painter.context_mut().take();

        painter.render(&field, &mut StdRng::seed_from_u64(1));

        assert!(painter.context().commands().is_empty());
    }
}

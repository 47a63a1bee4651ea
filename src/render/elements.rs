use bytemuck::{cast_slice, Pod, Zeroable};
use rand::RngCore;

use super::FieldRenderer;
use crate::particles::{Particle, ParticleField};
use crate::surface::{DisplayBox, Hsla};

/// Style of one retained overlay element, laid out for direct upload.
///
/// The element is a `size`-wide square at (`left`, `top`) filled with a
/// radial gradient from `inner` through `middle` (at 50 %) to transparent.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ElementStyle {
    pub left: f32,
    pub top: f32,
    pub size: f32,
    pub opacity: f32,
    pub inner: [f32; 4],
    pub middle: [f32; 4],
}

impl ElementStyle {
    fn for_particle(particle: &Particle) -> Self {
        let tint = particle.tint;
        let inner = Hsla::new(tint.hue, 70.0, 80.0, tint.alpha).to_rgba();
        let middle = Hsla::new(tint.hue, 70.0, 60.0, tint.alpha * 0.5).to_rgba();
        Self {
            left: particle.position.x - particle.radius,
            top: particle.position.y - particle.radius,
            size: particle.radius * 2.0,
            opacity: tint.alpha,
            inner: [inner.r, inner.g, inner.b, inner.a],
            middle: [middle.r, middle.g, middle.b, middle.a],
        }
    }
}

/// Retained-mode backend: one positioned element per particle.
///
/// Connections are not drawn; the overlay variant only moves the discs.
#[derive(Debug, Default)]
pub struct ElementPositioner {
    elements: Vec<ElementStyle>,
    display: Option<DisplayBox>,
}

impl ElementPositioner {
    pub fn new(display: DisplayBox) -> Self {
        Self {
            elements: Vec::new(),
            display: Some(display),
        }
    }

    pub fn elements(&self) -> &[ElementStyle] {
        &self.elements
    }

    pub fn display(&self) -> Option<DisplayBox> {
        self.display
    }

    /// Raw instance bytes, `size_of::<ElementStyle>()` per element.
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.elements)
    }
}

impl FieldRenderer for ElementPositioner {
    fn resize(&mut self, display: DisplayBox) {
        self.display = Some(display);
    }

    fn render(&mut self, field: &ParticleField, _rng: &mut dyn RngCore) {
        let particles = field.particles();
        self.elements.resize(particles.len(), ElementStyle::zeroed());
        for (element, particle) in self.elements.iter_mut().zip(particles) {
            *element = ElementStyle::for_particle(particle);
        }
    }

    fn release(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{ElementPositioner, ElementStyle};
    use crate::particles::{Bounds, FieldConfig, Particle, ParticleField};
    use crate::render::FieldRenderer;
    use crate::surface::DisplayBox;

    #[test]
    fn element_style_is_48_bytes() {
        assert_eq!(std::mem::size_of::<ElementStyle>(), 48);
    }

    #[test]
    fn positions_one_element_per_particle() {
        let field = ParticleField::from_particles(
            FieldConfig::default(),
            Bounds::new(400.0, 300.0),
            vec![
                Particle::at_rest(Vec2::new(100.0, 80.0), 4.0),
                Particle::at_rest(Vec2::new(200.0, 50.0), 2.0),
            ],
        );
        let mut positioner = ElementPositioner::new(DisplayBox::new(400.0, 300.0, 1.0));

        positioner.render(&field, &mut StdRng::seed_from_u64(1));

        let elements = positioner.elements();
        assert_eq!(elements.len(), 2);
        assert_eq!((elements[0].left, elements[0].top, elements[0].size), (96.0, 76.0, 8.0));
        assert_eq!(elements[1].size, 4.0);
        assert_eq!(elements[0].middle[3], elements[0].inner[3] * 0.5);
        assert_eq!(positioner.as_bytes().len(), 2 * 48);
    }

    #[test]
    fn release_drops_every_element() {
        let field = ParticleField::spawn(
            FieldConfig::default(),
            Bounds::new(400.0, 300.0),
            &mut StdRng::seed_from_u64(2),
        );
        let mut positioner = ElementPositioner::new(DisplayBox::new(400.0, 300.0, 1.0));
        positioner.render(&field, &mut StdRng::seed_from_u64(2));
        assert_eq!(positioner.elements().len(), 40);

        positioner.release();
        assert!(positioner.elements().is_empty());
        assert!(positioner.as_bytes().is_empty());
    }
}

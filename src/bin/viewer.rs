//! Interactive particle field in a macroquad window.
//!
//! Move the mouse (or drag a finger) to push particles around. Escape quits.

use liquid_visual_engine::host::{HostEvent, ListenerRegistry};
use liquid_visual_engine::particles::FieldConfig;
use liquid_visual_engine::quality::{DeviceCapabilities, QualityTier, TierGovernor};
use liquid_visual_engine::render::Painter;
use liquid_visual_engine::surface::{
    DisplayBox, DrawContext, Paint, Rgba, Stroke, SurfaceHandle,
};
use liquid_visual_engine::{Simulator, TickOutcome, Vec2};
use macroquad::prelude as mq;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CURVE_SEGMENTS: usize = 8;
const GRADIENT_RINGS: usize = 6;

fn window_conf() -> mq::Conf {
    mq::Conf {
        window_title: "Liquid particle field".to_owned(),
        window_width: 1280,
        window_height: 720,
        high_dpi: true,
        ..Default::default()
    }
}

fn color(c: Rgba, opacity: f32) -> mq::Color {
    mq::Color::new(c.r, c.g, c.b, c.a * opacity.clamp(0.0, 1.0))
}

/// Draws into an offscreen canvas that is never cleared, so the painter's
/// translucent overlay leaves trails and throttled frames show the last image.
struct WindowContext {
    canvas: Option<mq::RenderTarget>,
    logical: mq::Rect,
}

impl WindowContext {
    fn new() -> Self {
        Self {
            canvas: None,
            logical: mq::Rect::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    fn camera(&self, canvas: &mq::RenderTarget) -> mq::Camera2D {
        let mut camera = mq::Camera2D::from_display_rect(self.logical);
        camera.render_target = Some(canvas.clone());
        camera
    }

    /// Route the following draw calls into the canvas.
    fn begin(&self) {
        if let Some(canvas) = &self.canvas {
            mq::set_camera(&self.camera(canvas));
        }
    }

    /// Copy the canvas onto the window.
    fn present(&self) {
        mq::set_default_camera();
        mq::clear_background(mq::BLACK);
        if let Some(canvas) = &self.canvas {
            mq::draw_texture_ex(
                &canvas.texture,
                0.0,
                0.0,
                mq::WHITE,
                mq::DrawTextureParams {
                    dest_size: Some(mq::vec2(mq::screen_width(), mq::screen_height())),
                    flip_y: true,
                    ..Default::default()
                },
            );
        }
    }
}

impl DrawContext for WindowContext {
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32) {
        let canvas = mq::render_target(backing_width.max(1), backing_height.max(1));
        canvas.texture.set_filter(mq::FilterMode::Linear);
        self.logical = mq::Rect::new(
            0.0,
            0.0,
            backing_width.max(1) as f32 / scale,
            backing_height.max(1) as f32 / scale,
        );

        // Fresh targets hold garbage until cleared once.
        mq::set_camera(&self.camera(&canvas));
        mq::clear_background(mq::BLACK);
        mq::set_default_camera();
        self.canvas = Some(canvas);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, fill: Rgba) {
        mq::draw_rectangle(origin.x, origin.y, size.x, size.y, color(fill, 1.0));
    }

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, stroke: Stroke) {
        let tint = color(stroke.color, stroke.opacity);
        let mut previous = from;
        for step in 1..=CURVE_SEGMENTS {
            let t = step as f32 / CURVE_SEGMENTS as f32;
            let u = 1.0 - t;
            let point = from * (u * u) + control * (2.0 * u * t) + to * (t * t);
            mq::draw_line(previous.x, previous.y, point.x, point.y, stroke.width, tint);
            previous = point;
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint, opacity: f32) {
        match paint {
            Paint::Solid(fill) => {
                mq::draw_circle(center.x, center.y, radius, color(fill, opacity))
            }
            Paint::Radial(gradient) => {
                // Concentric rings, outermost first, approximate the gradient.
                for ring in (1..=GRADIENT_RINGS).rev() {
                    let r = radius * ring as f32 / GRADIENT_RINGS as f32;
                    let sample = gradient.sample(center.distance(gradient.center) + r);
                    mq::draw_circle(center.x, center.y, r, color(sample, opacity));
                }
            }
        }
    }
}

struct Window;

impl SurfaceHandle for Window {
    type Context = WindowContext;

    fn display_box(&self) -> DisplayBox {
        DisplayBox::new(mq::screen_width(), mq::screen_height(), mq::screen_dpi_scale())
    }

    fn context_2d(&mut self) -> Option<Self::Context> {
        Some(WindowContext::new())
    }
}

type WindowSimulator = Simulator<Painter<WindowContext>>;

fn pointer_event(display_box: DisplayBox) -> HostEvent {
    if let Some(touch) = mq::touches().first() {
        return HostEvent::TouchMove(Some(Vec2::new(touch.position.x, touch.position.y)));
    }
    let (x, y) = mq::mouse_position();
    let inside = x >= 0.0 && y >= 0.0 && x <= display_box.width && y <= display_box.height;
    if inside {
        HostEvent::PointerMove { x, y }
    } else {
        HostEvent::PointerLeave
    }
}

/// Mount a field for `tier`, or `None` when the tier disables particles or the
/// window cannot provide a context.
fn mount(
    window: &mut Window,
    host: &mut ListenerRegistry,
    tier: QualityTier,
) -> Option<WindowSimulator> {
    let Some(config) = tier.budget().field_config(FieldConfig::default()) else {
        info!(?tier, "particles disabled for this quality tier");
        return None;
    };
    match Simulator::create(window, host, config) {
        Ok(sim) => Some(sim),
        Err(err) => {
            // Cosmetic layer: without a surface the window simply shows no field.
            warn!(%err, "particle field not mounted");
            None
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("liquid_visual_engine=info,viewer=info")),
        )
        .with_target(false)
        .init();

    let capabilities = DeviceCapabilities::default();
    let mut governor = TierGovernor::new(
        QualityTier::detect(&capabilities),
        TierGovernor::DEFAULT_PATIENCE,
    );
    let mut window = Window;
    let mut host = ListenerRegistry::new();
    let Some(mut sim) = mount(&mut window, &mut host, governor.tier()) else {
        return;
    };
    let mut display_box = window.display_box();

    loop {
        if mq::is_key_pressed(mq::KeyCode::Escape) {
            sim.destroy(&mut host);
        }

        let measured = window.display_box();
        if measured != display_box {
            display_box = measured;
            sim.handle_event(&HostEvent::Resize(display_box));
        }
        sim.handle_event(&pointer_event(display_box));

        sim.renderer().context().begin();
        let outcome = sim.tick(mq::get_frame_time() * 1000.0);
        sim.renderer().context().present();
        if outcome == TickOutcome::Stopped {
            break;
        }

        let degraded = sim
            .take_frame_metrics()
            .and_then(|metrics| governor.observe(metrics));
        if let Some(tier) = degraded {
            sim.destroy(&mut host);
            match mount(&mut window, &mut host, tier) {
                Some(next) => sim = next,
                None => break,
            }
        }

        mq::next_frame().await;
    }

    info!(tier = ?governor.tier(), listeners = host.len(), "viewer closed");
}

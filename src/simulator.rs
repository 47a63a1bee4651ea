use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::frame::{FrameMetrics, FrameRateMonitor, FrameThrottle};
use crate::host::{EventHost, EventKind, HostEvent, ListenerId};
use crate::particles::{ConfigError, FieldConfig, ParticleField, PointerState};
use crate::render::{FieldRenderer, Painter};
use crate::surface::{DisplayBox, DrawContext, SurfaceHandle};

#[derive(Debug)]
pub enum SimulatorError {
    SurfaceUnavailable,
    InvalidConfig(ConfigError),
}

impl std::fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceUnavailable => write!(f, "surface cannot provide a 2D drawing context"),
            Self::InvalidConfig(err) => write!(f, "invalid field config: {}", err),
        }
    }
}

impl std::error::Error for SimulatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SurfaceUnavailable => None,
            Self::InvalidConfig(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SimulatorError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ran,
    /// Less than one target frame interval since the last executed tick.
    Throttled,
    /// The simulator has been destroyed; the host should stop calling `tick`.
    Stopped,
}

/// One mounted particle field: state, pointer, pacing and a rendering backend.
///
/// The host owns the instance and drives it: it forwards events through
/// [`Simulator::handle_event`] and calls [`Simulator::tick`] once per display
/// refresh until `tick` reports [`TickOutcome::Stopped`].
#[derive(Debug)]
pub struct Simulator<R> {
    field: ParticleField,
    pointer: PointerState,
    renderer: R,
    display: DisplayBox,
    throttle: FrameThrottle,
    monitor: FrameRateMonitor,
    unread_metrics: Option<FrameMetrics>,
    rng: StdRng,
    listeners: Vec<ListenerId>,
    destroyed: bool,
    ticks: u64,
}

impl<C: DrawContext> Simulator<Painter<C>> {
    /// Mount an immediate-mode field on `surface`.
    pub fn create<S, H>(
        surface: &mut S,
        host: &mut H,
        config: FieldConfig,
    ) -> Result<Self, SimulatorError>
    where
        S: SurfaceHandle<Context = C>,
        H: EventHost + ?Sized,
    {
        let context = surface
            .context_2d()
            .ok_or(SimulatorError::SurfaceUnavailable)?;
        let display = surface.display_box();
        Self::with_renderer(Painter::new(context, display), display, host, config)
    }
}

impl<R: FieldRenderer> Simulator<R> {
    /// Mount a field on any backend. `renderer` must already be sized for `display_box`.
    pub fn with_renderer<H>(
        renderer: R,
        display_box: DisplayBox,
        host: &mut H,
        config: FieldConfig,
    ) -> Result<Self, SimulatorError>
    where
        H: EventHost + ?Sized,
    {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bounds = display_box.bounds();
        let field = ParticleField::spawn(config, bounds, &mut rng);
        let listeners = EventKind::ALL
            .iter()
            .map(|kind| host.add_listener(*kind))
            .collect();

        info!(
            particles = field.len(),
            width = bounds.width,
            height = bounds.height,
            pixel_ratio = display_box.pixel_ratio,
            "particle field mounted"
        );

        Ok(Self {
            field,
            pointer: PointerState::centered(bounds, config.pointer_radius),
            renderer,
            display: display_box,
            throttle: FrameThrottle::new(config.target_fps),
            monitor: FrameRateMonitor::new(),
            unread_metrics: None,
            rng,
            listeners,
            destroyed: false,
            ticks: 0,
        })
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn display(&self) -> DisplayBox {
        self.display
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Number of ticks that ran update and render.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frame_metrics(&self) -> Option<FrameMetrics> {
        self.monitor.latest()
    }

    /// The frame-rate window closed since the last call, if any.
    pub fn take_frame_metrics(&mut self) -> Option<FrameMetrics> {
        self.unread_metrics.take()
    }

    pub fn handle_event(&mut self, event: &HostEvent) {
        if self.destroyed {
            debug!(kind = ?event.kind(), "event after destroy ignored");
            return;
        }
        match *event {
            HostEvent::PointerMove { x, y } => self.update_pointer(x, y),
            HostEvent::TouchMove(Some(touch)) => self.update_pointer(touch.x, touch.y),
            HostEvent::TouchMove(None) => {}
            HostEvent::PointerLeave => self.pointer_leave(),
            HostEvent::Resize(display) => self.resize(display),
        }
    }

    /// Re-measure the surface. Particles keep their positions.
    pub fn resize(&mut self, display_box: DisplayBox) {
        if self.destroyed {
            return;
        }
        if display_box.is_degenerate() {
            warn!(
                width = display_box.width,
                height = display_box.height,
                "zero-area surface, field idles until resized"
            );
        }
        self.display = display_box;
        self.field.set_bounds(display_box.bounds());
        self.renderer.resize(display_box);
        debug!(
            width = display_box.width,
            height = display_box.height,
            pixel_ratio = display_box.pixel_ratio,
            "surface resized"
        );
    }

    /// Move the pointer. Non-finite coordinates are dropped.
    pub fn update_pointer(&mut self, x: f32, y: f32) {
        if self.destroyed {
            return;
        }
        if !(x.is_finite() && y.is_finite()) {
            debug!(x, y, "non-finite pointer position ignored");
            return;
        }
        self.pointer.position = Vec2::new(x, y);
    }

    /// Park the pointer at the viewport centre so particles stop reacting to a stale position.
    pub fn pointer_leave(&mut self) {
        if self.destroyed {
            return;
        }
        self.pointer.position = self.field.bounds().center();
    }

    pub fn update(&mut self) {
        if self.destroyed {
            return;
        }
        self.field.step(&self.pointer);
    }

    pub fn render(&mut self) {
        if self.destroyed {
            return;
        }
        self.renderer.render(&self.field, &mut self.rng);
    }

    /// Called by the host once per display refresh with the elapsed time.
    pub fn tick(&mut self, delta_ms: f32) -> TickOutcome {
        if self.destroyed {
            return TickOutcome::Stopped;
        }

        if let Some(metrics) = self.monitor.record(delta_ms) {
            debug!(
                fps = metrics.fps,
                optimal = metrics.is_optimal,
                "frame rate window"
            );
            self.unread_metrics = Some(metrics);
        }

        if !self.throttle.ready(delta_ms) {
            return TickOutcome::Throttled;
        }

        self.update();
        self.render();
        self.ticks += 1;
        trace!(
            tick = self.ticks,
            connections = self.field.connections().len(),
            "tick"
        );
        TickOutcome::Ran
    }

    /// Stop ticking, unregister listeners and drop the particle set. Safe to repeat.
    pub fn destroy<H>(&mut self, host: &mut H)
    where
        H: EventHost + ?Sized,
    {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for id in self.listeners.drain(..) {
            if !host.remove_listener(id) {
                warn!(?id, "listener already removed by host");
            }
        }
        self.renderer.release();
        self.field.clear();
        info!(ticks = self.ticks, "particle field destroyed");
    }
}

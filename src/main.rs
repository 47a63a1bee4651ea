use std::str::FromStr;

use liquid_visual_engine::host::{HostEvent, ListenerRegistry};
use liquid_visual_engine::particles::FieldConfig;
use liquid_visual_engine::quality::{DeviceCapabilities, QualityTier, TierGovernor};
use liquid_visual_engine::render::{BackendKind, ElementPositioner, FieldRenderer};
use liquid_visual_engine::surface::{DisplayBox, RecordingSurface};
use liquid_visual_engine::{Simulator, TickOutcome, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("liquid_visual_engine=info")),
        )
        .with_target(false)
        .init();

    if let Err(err) = run() {
        eprintln!("particle field smoke run failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let seconds: f32 = parse_arg(&args, "--seconds").unwrap_or(5.0);
    let refresh_hz: f32 = parse_arg(&args, "--fps").unwrap_or(120.0);
    let display_box = DisplayBox::new(
        parse_arg(&args, "--width").unwrap_or(1280.0),
        parse_arg(&args, "--height").unwrap_or(720.0),
        parse_arg(&args, "--dpr").unwrap_or(1.0),
    );

    let mut base = match arg_value(&args, "--config") {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };
    if let Some(seed) = parse_arg(&args, "--seed") {
        base.seed = Some(seed);
    }
    let particles: Option<usize> = parse_arg(&args, "--particles");
    let capabilities = DeviceCapabilities::default();
    let tier = parse_arg::<QualityTier>(&args, "--tier")
        .unwrap_or_else(|| QualityTier::detect(&capabilities));
    let backend = parse_arg::<BackendKind>(&args, "--backend")
        .unwrap_or_else(|| BackendKind::select(&capabilities));

    info!(
        ?backend,
        ?tier,
        seconds,
        refresh_hz,
        "particle field smoke run"
    );

    let mut governor = TierGovernor::new(tier, TierGovernor::DEFAULT_PATIENCE);
    let mut playback = Playback::new(display_box, seconds, refresh_hz);
    let mut host = ListenerRegistry::new();

    while !playback.finished() {
        let Some(mut config) = governor.tier().budget().field_config(base) else {
            info!(tier = ?governor.tier(), "particles disabled for this quality tier");
            break;
        };
        if let Some(count) = particles {
            config.particle_count = count;
        }

        let current = playback.display;
        let degraded = match backend {
            BackendKind::Painter => {
                let mut surface = RecordingSurface::new(current);
                let mut sim = Simulator::create(&mut surface, &mut host, config)?;
                let degraded = drive(&mut sim, &mut playback, &mut governor, |sim| {
                    sim.renderer_mut().context_mut().take().len()
                });
                sim.destroy(&mut host);
                degraded
            }
            BackendKind::Elements => {
                let renderer = ElementPositioner::new(current);
                let mut sim = Simulator::with_renderer(renderer, current, &mut host, config)?;
                let degraded = drive(&mut sim, &mut playback, &mut governor, |sim| {
                    sim.renderer().elements().len()
                });
                sim.destroy(&mut host);
                degraded
            }
        };
        if !degraded {
            break;
        }
    }

    info!(
        tier = ?governor.tier(),
        throttled = playback.throttled,
        draws = playback.draws,
        listeners = host.len(),
        "run finished"
    );
    Ok(())
}

/// Host-side script state that survives remounts.
struct Playback {
    frame_ms: f32,
    total_ms: f32,
    elapsed_ms: f32,
    next_report_ms: f32,
    start: DisplayBox,
    display: DisplayBox,
    shrunk: bool,
    left: bool,
    throttled: u64,
    draws: usize,
}

impl Playback {
    fn new(start: DisplayBox, seconds: f32, refresh_hz: f32) -> Self {
        Self {
            frame_ms: 1000.0 / refresh_hz.max(1.0),
            total_ms: seconds.max(0.0) * 1000.0,
            elapsed_ms: 0.0,
            next_report_ms: 1000.0,
            start,
            display: start,
            shrunk: false,
            left: false,
            throttled: 0,
            draws: 0,
        }
    }

    fn finished(&self) -> bool {
        self.elapsed_ms >= self.total_ms
    }
}

/// Play the host's part: refresh ticks, a pointer circling the centre, one
/// shrink halfway through and a pointer leave near the end.
///
/// Returns true when the governor stepped the tier down and the field must be
/// remounted.
fn drive<R, F>(
    sim: &mut Simulator<R>,
    playback: &mut Playback,
    governor: &mut TierGovernor,
    mut drain: F,
) -> bool
where
    R: FieldRenderer,
    F: FnMut(&mut Simulator<R>) -> usize,
{
    while !playback.finished() {
        let bounds = sim.field().bounds();
        let angle = playback.elapsed_ms / 1000.0;
        let orbit = bounds.width.min(bounds.height) * 0.3;
        let pointer = bounds.center() + Vec2::new(angle.cos(), angle.sin()) * orbit;
        sim.handle_event(&HostEvent::PointerMove {
            x: pointer.x,
            y: pointer.y,
        });

        if !playback.shrunk && playback.elapsed_ms >= playback.total_ms * 0.5 {
            playback.shrunk = true;
            let start = playback.start;
            playback.display = DisplayBox::new(
                start.width * 0.75,
                start.height * 0.75,
                start.pixel_ratio,
            );
            sim.handle_event(&HostEvent::Resize(playback.display));
        }
        if !playback.left && playback.elapsed_ms >= playback.total_ms * 0.9 {
            playback.left = true;
            sim.handle_event(&HostEvent::PointerLeave);
        }

        match sim.tick(playback.frame_ms) {
            TickOutcome::Ran => playback.draws += drain(sim),
            TickOutcome::Throttled => playback.throttled += 1,
            TickOutcome::Stopped => return false,
        }
        playback.elapsed_ms += playback.frame_ms;

        if playback.elapsed_ms >= playback.next_report_ms {
            playback.next_report_ms += 1000.0;
            info!(
                t = playback.elapsed_ms / 1000.0,
                ticks = sim.ticks(),
                connections = sim.field().connections().len(),
                fps = ?sim.frame_metrics().map(|m| m.fps),
                "progress"
            );
        }

        if let Some(metrics) = sim.take_frame_metrics() {
            if governor.observe(metrics).is_some() {
                return true;
            }
        }
    }

    info!(
        ticks = sim.ticks(),
        particles = sim.field().len(),
        "mount finished"
    );
    false
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|v| v == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    arg_value(args, flag).and_then(|v| v.parse::<T>().ok())
}

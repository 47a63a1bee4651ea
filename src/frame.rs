//! Frame pacing for host-driven loops.

/// Skips work until a full target frame interval has passed since the last executed tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameThrottle {
    pub frame_interval_ms: f32,
    since_last_ms: f32,
}

impl FrameThrottle {
    pub fn new(target_fps: f32) -> Self {
        let frame_interval_ms = 1000.0 / target_fps.max(1.0);
        Self {
            frame_interval_ms,
            // The first tick always runs.
            since_last_ms: frame_interval_ms,
        }
    }

    /// Feed elapsed time; returns true when a tick should execute now.
    pub fn ready(&mut self, delta_ms: f32) -> bool {
        if delta_ms.is_finite() {
            self.since_last_ms += delta_ms.max(0.0);
        }
        if self.since_last_ms < self.frame_interval_ms {
            return false;
        }
        self.since_last_ms = 0.0;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    pub fps: u32,
    pub window_ms: f32,
    pub is_optimal: bool,
}

/// Frames per second over roughly one-second windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRateMonitor {
    frames: u32,
    window_ms: f32,
    latest: Option<FrameMetrics>,
}

impl FrameRateMonitor {
    const WINDOW_MS: f32 = 1000.0;
    const OPTIMAL_FPS: u32 = 55;

    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame; yields metrics each time a window closes.
    pub fn record(&mut self, delta_ms: f32) -> Option<FrameMetrics> {
        self.frames += 1;
        if delta_ms.is_finite() {
            self.window_ms += delta_ms.max(0.0);
        }
        if self.window_ms < Self::WINDOW_MS {
            return None;
        }

        let fps = (self.frames as f32 * 1000.0 / self.window_ms).round() as u32;
        let metrics = FrameMetrics {
            fps,
            window_ms: self.window_ms,
            is_optimal: fps >= Self::OPTIMAL_FPS,
        };
        self.frames = 0;
        self.window_ms = 0.0;
        self.latest = Some(metrics);
        Some(metrics)
    }

    pub fn latest(&self) -> Option<FrameMetrics> {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameRateMonitor, FrameThrottle};

    #[test]
    fn first_tick_runs_then_throttles() {
        let mut throttle = FrameThrottle::new(30.0);
        assert!(throttle.ready(0.0));
        assert!(!throttle.ready(16.0));
        assert!(throttle.ready(18.0));
        assert!(!throttle.ready(5.0));
    }

    #[test]
    fn high_refresh_host_is_halved() {
        let mut throttle = FrameThrottle::new(60.0);
        throttle.ready(0.0);
        let executed = (0..120).filter(|_| throttle.ready(1000.0 / 120.0)).count();
        assert_eq!(executed, 60);
    }

    #[test]
    fn ignores_negative_and_nan_deltas() {
        let mut throttle = FrameThrottle::new(60.0);
        throttle.ready(0.0);
        assert!(!throttle.ready(-100.0));
        assert!(!throttle.ready(f32::NAN));
        assert!(throttle.ready(17.0));
    }

    #[test]
    fn monitor_reports_once_per_window() {
        let mut monitor = FrameRateMonitor::new();
        let mut reports = Vec::new();
        for _ in 0..100 {
            if let Some(metrics) = monitor.record(20.0) {
                reports.push(metrics);
            }
        }
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].fps, 50);
        assert!(!reports[0].is_optimal);
        assert_eq!(monitor.latest(), Some(reports[1]));
    }
}

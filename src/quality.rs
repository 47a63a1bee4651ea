use serde::{Deserialize, Serialize};

use tracing::info;

use crate::frame::FrameMetrics;
use crate::particles::FieldConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionSpeed {
    Slow,
    Medium,
    Fast,
}

impl ConnectionSpeed {
    /// Map a network "effective type" label (`4g`, `3g`, `2g`, `slow-2g`).
    pub fn from_effective_type(label: &str) -> Self {
        match label {
            "2g" | "slow-2g" => Self::Slow,
            "3g" => Self::Medium,
            _ => Self::Fast,
        }
    }
}

/// What the host reports about the device. Unknown values keep the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCapabilities {
    pub prefers_reduced_motion: bool,
    pub device_memory_gb: f32,
    pub hardware_concurrency: u32,
    pub connection: ConnectionSpeed,
    pub supports_canvas: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            prefers_reduced_motion: false,
            device_memory_gb: 4.0,
            hardware_concurrency: 4,
            connection: ConnectionSpeed::Fast,
            supports_canvas: true,
        }
    }
}

impl DeviceCapabilities {
    pub fn is_high_performance(&self) -> bool {
        self.device_memory_gb >= 4.0 && self.hardware_concurrency >= 4
    }

    pub fn is_low_power(&self) -> bool {
        self.device_memory_gb < 2.0 || self.hardware_concurrency < 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Minimal,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetProfile {
    pub particle_count: usize,
    pub animation_seconds: f32,
    pub blur_px: f32,
    pub liquid_effects: bool,
    pub particles_enabled: bool,
    pub morphing: bool,
}

impl QualityTier {
    pub fn detect(capabilities: &DeviceCapabilities) -> Self {
        if capabilities.prefers_reduced_motion {
            Self::Minimal
        } else if capabilities.is_low_power() || capabilities.connection == ConnectionSpeed::Slow {
            Self::Low
        } else if !capabilities.is_high_performance()
            || capabilities.connection == ConnectionSpeed::Medium
        {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Next tier down, used once frame metrics stay below target.
    pub fn step_down(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low | Self::Minimal => Self::Minimal,
        }
    }

    pub fn budget(self) -> BudgetProfile {
        match self {
            Self::Minimal => BudgetProfile {
                particle_count: 0,
                animation_seconds: 0.0,
                blur_px: 0.0,
                liquid_effects: false,
                particles_enabled: false,
                morphing: false,
            },
            Self::Low => BudgetProfile {
                particle_count: 10,
                animation_seconds: 2.0,
                blur_px: 5.0,
                liquid_effects: false,
                particles_enabled: true,
                morphing: false,
            },
            Self::Medium => BudgetProfile {
                particle_count: 25,
                animation_seconds: 1.5,
                blur_px: 10.0,
                liquid_effects: true,
                particles_enabled: true,
                morphing: true,
            },
            Self::High => BudgetProfile {
                particle_count: 60,
                animation_seconds: 1.0,
                blur_px: 20.0,
                liquid_effects: true,
                particles_enabled: true,
                morphing: true,
            },
        }
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "minimal" => Ok(Self::Minimal),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown quality tier `{}`", other)),
        }
    }
}

impl BudgetProfile {
    /// Field configuration for this budget, or `None` when the field should not be mounted.
    pub fn field_config(&self, base: FieldConfig) -> Option<FieldConfig> {
        if !self.particles_enabled {
            return None;
        }
        Some(FieldConfig {
            particle_count: self.particle_count,
            ..base
        })
    }
}

/// Steps the quality tier down once frame windows stay below target for too long.
///
/// The host feeds it every closed [`FrameMetrics`] window. When it reports a
/// new tier the host remounts the field with that tier's budget, or leaves it
/// unmounted when the budget disables particles.
#[derive(Debug, Clone, Copy)]
pub struct TierGovernor {
    tier: QualityTier,
    patience: u32,
    slow_windows: u32,
}

impl TierGovernor {
    /// Consecutive non-optimal windows tolerated before degrading.
    pub const DEFAULT_PATIENCE: u32 = 3;

    pub fn new(tier: QualityTier, patience: u32) -> Self {
        Self {
            tier,
            patience: patience.max(1),
            slow_windows: 0,
        }
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    /// Returns the new tier when this window triggers a step down.
    pub fn observe(&mut self, metrics: FrameMetrics) -> Option<QualityTier> {
        if metrics.is_optimal {
            self.slow_windows = 0;
            return None;
        }
        self.slow_windows += 1;
        if self.slow_windows < self.patience || self.tier == QualityTier::Minimal {
            return None;
        }

        let from = self.tier;
        self.tier = from.step_down();
        self.slow_windows = 0;
        info!(?from, to = ?self.tier, fps = metrics.fps, "degrading quality tier");
        Some(self.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionSpeed, DeviceCapabilities, QualityTier, TierGovernor};
    use crate::frame::FrameMetrics;
    use tracing::info;

use crate::particles::FieldConfig;

    #[test]
    fn reduced_motion_wins_over_everything() {
        let caps = DeviceCapabilities {
            prefers_reduced_motion: true,
            device_memory_gb: 16.0,
            hardware_concurrency: 16,
            ..DeviceCapabilities::default()
        };
        assert_eq!(QualityTier::detect(&caps), QualityTier::Minimal);
        assert!(QualityTier::Minimal
            .budget()
            .field_config(FieldConfig::default())
            .is_none());
    }

    #[test]
    fn detection_table() {
        let base = DeviceCapabilities::default();
        assert_eq!(QualityTier::detect(&base), QualityTier::High);

        let slow = DeviceCapabilities {
            connection: ConnectionSpeed::from_effective_type("slow-2g"),
            ..base
        };
        assert_eq!(QualityTier::detect(&slow), QualityTier::Low);

        let single_core = DeviceCapabilities {
            hardware_concurrency: 1,
            ..base
        };
        assert_eq!(QualityTier::detect(&single_core), QualityTier::Low);

        let modest = DeviceCapabilities {
            device_memory_gb: 2.0,
            ..base
        };
        assert_eq!(QualityTier::detect(&modest), QualityTier::Medium);

        let medium_net = DeviceCapabilities {
            connection: ConnectionSpeed::from_effective_type("3g"),
            ..base
        };
        assert_eq!(QualityTier::detect(&medium_net), QualityTier::Medium);
    }

    #[test]
    fn budget_sets_particle_count() {
        let config = QualityTier::Medium
            .budget()
            .field_config(FieldConfig::default())
            .unwrap();
        assert_eq!(config.particle_count, 25);
        assert_eq!(config.viscosity, FieldConfig::default().viscosity);
    }

    #[test]
    fn step_down_bottoms_out_at_minimal() {
        let mut tier = QualityTier::High;
        for _ in 0..5 {
            tier = tier.step_down();
        }
        assert_eq!(tier, QualityTier::Minimal);
        assert!(QualityTier::High > QualityTier::Low);
    }

    fn window(fps: u32) -> FrameMetrics {
        FrameMetrics {
            fps,
            window_ms: 1000.0,
            is_optimal: fps >= 55,
        }
    }

    #[test]
    fn governor_degrades_after_sustained_slow_windows() {
        let mut governor = TierGovernor::new(QualityTier::High, 3);

        assert_eq!(governor.observe(window(30)), None);
        assert_eq!(governor.observe(window(30)), None);
        assert_eq!(governor.observe(window(30)), Some(QualityTier::Medium));
        assert_eq!(governor.tier(), QualityTier::Medium);

        // The count restarts after a step down.
        assert_eq!(governor.observe(window(30)), None);
    }

    #[test]
    fn governor_forgives_isolated_slow_windows() {
        let mut governor = TierGovernor::new(QualityTier::High, 2);

        for _ in 0..10 {
            assert_eq!(governor.observe(window(40)), None);
            assert_eq!(governor.observe(window(60)), None);
        }
        assert_eq!(governor.tier(), QualityTier::High);
    }

    #[test]
    fn governor_stops_at_minimal() {
        let mut governor = TierGovernor::new(QualityTier::Low, 1);

        assert_eq!(governor.observe(window(10)), Some(QualityTier::Minimal));
        assert_eq!(governor.observe(window(10)), None);
        assert!(QualityTier::Minimal
            .budget()
            .field_config(FieldConfig::default())
            .is_none());
    }
}

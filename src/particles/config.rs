use std::path::Path;

use serde::{Deserialize, Serialize};

/// How the pairwise cohesion pass walks the particle set.
///
/// Both variants hand every particle exactly one impulse per neighbour; they
/// differ only in iteration shape. `Unordered` visits each pair once and
/// applies the impulse to both ends, `Ordered` visits (i, j) and (j, i)
/// separately and only pushes the visiting particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairVisit {
    #[default]
    Unordered,
    Ordered,
}

/// Construction input for a particle field. Immutable for the field's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    /// Velocity retention per tick, in (0, 1].
    pub viscosity: f32,
    pub attraction: f32,
    pub repulsion: f32,
    pub max_speed: f32,
    pub connection_distance: f32,
    pub surface_tension: f32,
    /// Extra velocity retention per tick, in (0, 1].
    pub damping: f32,
    /// Radius around the pointer inside which particles are pushed away.
    pub pointer_radius: f32,
    /// Strength of the constant pull toward the viewport centre.
    pub center_pull: f32,
    pub target_fps: f32,
    pub pair_visit: PairVisit,
    /// Fixed seed for spawning and render jitter. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 40,
            viscosity: 0.88,
            attraction: 0.12,
            repulsion: 0.18,
            max_speed: 1.5,
            connection_distance: 120.0,
            surface_tension: 0.05,
            damping: 0.99,
            pointer_radius: 100.0,
            center_pull: 0.001,
            target_fps: 60.0,
            pair_visit: PairVisit::Unordered,
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&source)
    }

    /// Product of viscosity and damping, applied to velocity once per tick.
    pub fn velocity_retention(&self) -> f32 {
        self.viscosity * self.damping
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("viscosity", self.viscosity)?;
        unit_interval("damping", self.damping)?;
        non_negative("attraction", self.attraction)?;
        non_negative("repulsion", self.repulsion)?;
        non_negative("surface_tension", self.surface_tension)?;
        non_negative("center_pull", self.center_pull)?;
        positive("max_speed", self.max_speed)?;
        positive("connection_distance", self.connection_distance)?;
        positive("pointer_radius", self.pointer_radius)?;
        positive("target_fps", self.target_fps)?;
        Ok(())
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "(0, 1]",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: ">= 0",
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "> 0",
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "field config `{}` out of range: expected {}, got {}",
                field, expected, value
            ),
            Self::Io(err) => write!(f, "failed to read field config: {}", err),
            Self::Parse(err) => write!(f, "failed to parse field config: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OutOfRange { .. } => None,
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, FieldConfig, PairVisit};

    #[test]
    fn defaults_are_valid() {
        let config = FieldConfig::default();
        assert_eq!(config.particle_count, 40);
        assert_eq!(config.connection_distance, 120.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config =
            FieldConfig::from_json_str(r#"{ "particle_count": 12, "pair_visit": "ordered" }"#)
                .unwrap();
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.pair_visit, PairVisit::Ordered);
        assert_eq!(config.viscosity, FieldConfig::default().viscosity);
    }

    #[test]
    fn zero_attraction_is_kept() {
        let config = FieldConfig::from_json_str(r#"{ "attraction": 0.0 }"#).unwrap();
        assert_eq!(config.attraction, 0.0);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let bad = [
            FieldConfig {
                viscosity: 0.0,
                ..FieldConfig::default()
            },
            FieldConfig {
                damping: 1.5,
                ..FieldConfig::default()
            },
            FieldConfig {
                repulsion: -0.1,
                ..FieldConfig::default()
            },
            FieldConfig {
                max_speed: 0.0,
                ..FieldConfig::default()
            },
            FieldConfig {
                connection_distance: f32::NAN,
                ..FieldConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(ConfigError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = FieldConfig::from_json_str("{ particle_count: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

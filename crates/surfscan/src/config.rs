//! Detector configuration: search levels and per-call parameters.

use std::path::Path;

use crate::error::DetectError;
use crate::feature::{ConversionOptions, FeatureType};

/// Discrete search level used for radial expansion and lateral extension.
///
/// `Off` disables the growth step; `Lv1`..`Lv10` increase how far the
/// detector grows the region around the seed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchLevel {
    Off,
    Lv1,
    Lv2,
    Lv3,
    Lv4,
    #[default]
    Lv5,
    Lv6,
    Lv7,
    Lv8,
    Lv9,
    Lv10,
}

impl SearchLevel {
    /// Numeric level, `0` for `Off`.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Level for a numeric value in `0..=10`.
    pub fn from_value(value: u8) -> Option<Self> {
        const LEVELS: [SearchLevel; 11] = [
            SearchLevel::Off,
            SearchLevel::Lv1,
            SearchLevel::Lv2,
            SearchLevel::Lv3,
            SearchLevel::Lv4,
            SearchLevel::Lv5,
            SearchLevel::Lv6,
            SearchLevel::Lv7,
            SearchLevel::Lv8,
            SearchLevel::Lv9,
            SearchLevel::Lv10,
        ];
        LEVELS.get(value as usize).copied()
    }
}

/// Parameters applied to one detection call.
///
/// All distances are in metres. The configuration is an explicit value
/// handed to every call; there is no process-wide detector state.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Expected measurement error of the sensor.
    pub measurement_accuracy: f32,
    /// Mean spacing between neighbouring points.
    pub mean_distance: f32,
    /// Radius of the initial region around the seed point.
    pub seed_radius: f32,
    /// How aggressively the region grows along the surface normal direction.
    pub radial_expansion: SearchLevel,
    /// How aggressively the region grows across the surface.
    pub lateral_extension: SearchLevel,
    /// Primitive to search for.
    pub target_feature: FeatureType,
    /// Enabled smart-conversion rules.
    pub conversions: ConversionOptions,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            measurement_accuracy: 0.01,
            mean_distance: 0.05,
            seed_radius: 0.08,
            radial_expansion: SearchLevel::Lv5,
            lateral_extension: SearchLevel::Lv10,
            target_feature: FeatureType::Plane,
            conversions: ConversionOptions::none(),
        }
    }
}

impl DetectorConfig {
    /// Copy with a different target feature.
    pub fn with_target(&self, feature: FeatureType) -> Self {
        Self {
            target_feature: feature,
            ..self.clone()
        }
    }

    /// Copy with a different conversion set.
    pub fn with_conversions(&self, conversions: ConversionOptions) -> Self {
        Self {
            conversions,
            ..self.clone()
        }
    }

    /// Check that every distance is finite and strictly positive.
    pub fn validate(&self) -> Result<(), DetectError> {
        let fields = [
            ("measurement_accuracy", self.measurement_accuracy),
            ("mean_distance", self.mean_distance),
            ("seed_radius", self.seed_radius),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(DetectError::invalid_argument(format!(
                    "{name} must be finite and positive (got {value})"
                )));
            }
        }
        Ok(())
    }

    /// Load a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}

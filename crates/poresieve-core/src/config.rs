//! Analysis configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::measure::SizingMode;
use crate::schema::BucketSchema;

/// Which accumulated quantity is written per table cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputMode {
    /// Bucket area as percent of total image area.
    #[default]
    AreaPercent,
    /// Absolute summed size (nm² or nm, per sizing mode).
    AbsoluteSize,
    /// Particle count per bucket.
    ParticleCount,
}

impl OutputMode {
    /// Map the numeric selector (0, 1, 2) used on the command line.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::AreaPercent),
            1 => Some(Self::AbsoluteSize),
            2 => Some(Self::ParticleCount),
            _ => None,
        }
    }

    /// The numeric selector for this mode.
    pub fn code(&self) -> u8 {
        match self {
            Self::AreaPercent => 0,
            Self::AbsoluteSize => 1,
            Self::ParticleCount => 2,
        }
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AnalysisConfig {
    /// Size-range boundaries shared by every image being compared.
    #[builder(default = "BucketSchema::default_pore_ranges()")]
    pub schema: BucketSchema,

    /// Whether areas or equivalent-circle diameters are bucketed.
    #[builder(default)]
    #[serde(default)]
    pub sizing: SizingMode,

    /// Requested table cell quantity. See [`AnalysisConfig::effective_output`].
    #[builder(default)]
    #[serde(default)]
    pub output: OutputMode,

    /// Explicit scale in nm/px for images without embedded metadata.
    #[builder(default)]
    #[serde(default)]
    pub fallback_scale: Option<f64>,
}

impl AnalysisConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(scale)) = self.fallback_scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(format!("fallback scale must be positive, got {scale}"));
            }
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// The output mode actually applied to the tables.
    ///
    /// Diameter sizing forces particle-count output regardless of the
    /// requested mode. Summed diameters and diameter percentages are not
    /// physically meaningful per bucket, so the selector is overridden
    /// rather than rejected.
    pub fn effective_output(&self) -> OutputMode {
        match self.sizing {
            SizingMode::Diameter => OutputMode::ParticleCount,
            SizingMode::Area => self.output,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema: BucketSchema::default_pore_ranges(),
            sizing: SizingMode::default(),
            output: OutputMode::default(),
            fallback_scale: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config.schema.len(), 20);
        assert_eq!(config.sizing, SizingMode::Area);
        assert_eq!(config.output, OutputMode::AreaPercent);
        assert!(config.fallback_scale.is_none());
    }

    #[test]
    fn test_diameter_forces_particle_count() {
        let config = AnalysisConfig::builder()
            .sizing(SizingMode::Diameter)
            .output(OutputMode::AreaPercent)
            .build()
            .unwrap();
        assert_eq!(config.effective_output(), OutputMode::ParticleCount);

        let config = AnalysisConfig::builder()
            .output(OutputMode::AbsoluteSize)
            .build()
            .unwrap();
        assert_eq!(config.effective_output(), OutputMode::AbsoluteSize);
    }

    #[test]
    fn test_rejects_bad_fallback_scale() {
        assert!(
            AnalysisConfig::builder()
                .fallback_scale(Some(0.0))
                .build()
                .is_err()
        );
        assert!(
            AnalysisConfig::builder()
                .fallback_scale(Some(-2.5))
                .build()
                .is_err()
        );
        assert!(
            AnalysisConfig::builder()
                .fallback_scale(Some(1.45))
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_output_mode_codes() {
        assert_eq!(OutputMode::from_code(0), Some(OutputMode::AreaPercent));
        assert_eq!(OutputMode::from_code(2), Some(OutputMode::ParticleCount));
        assert_eq!(OutputMode::from_code(7), None);
        assert_eq!(OutputMode::AbsoluteSize.code(), 1);
    }
}

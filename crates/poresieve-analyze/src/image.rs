//! Per-image aggregation of classified measurements.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use poresieve_core::{
    AnalysisConfig, AnalysisError, AnalysisWarning, BucketSchema, SizingMode, classify,
};

/// Accumulated state of one bucket within one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTally {
    /// Number of pores in this bucket.
    pub count: u64,
    /// Summed size values (nm² in area mode, nm in diameter mode).
    pub summed_size: f64,
    /// Summed pore area as percent of total image area.
    ///
    /// Always derived from the physical pore area, even when diameters
    /// are bucketed.
    pub area_percent: f64,
}

/// Per-image aggregation result, consumed by the folder accumulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResult {
    /// Image file name.
    pub name: CompactString,
    /// Pixel scale the image was aggregated with, in nm/px.
    pub scale: f64,
    /// Total physical image area in nm².
    pub image_area: f64,
    /// Schema the measurements were classified against.
    pub schema: BucketSchema,
    /// One tally per bucket; index 0 is the sentinel and stays zero.
    pub buckets: Vec<BucketTally>,
    /// Measurements at or below the first boundary (sentinel landings).
    pub below_range: u64,
    /// Measurements rejected as invalid.
    pub skipped: u64,
    /// Warnings collected while aggregating.
    pub warnings: Vec<AnalysisWarning>,
}

impl ImageResult {
    /// Total number of pores counted into buckets.
    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|t| t.count).sum()
    }

    /// Summed pore area across all buckets as percent of image area.
    pub fn pore_area_percent(&self) -> f64 {
        self.buckets.iter().map(|t| t.area_percent).sum()
    }

    /// Summed physical pore area across all buckets in nm².
    pub fn pore_area(&self) -> f64 {
        self.pore_area_percent() / 100.0 * self.image_area
    }
}

/// Reduces the measurement stream of one image to an [`ImageResult`].
pub struct ImageAggregator {
    config: AnalysisConfig,
}

impl ImageAggregator {
    /// Create an aggregator with the default configuration.
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// Create an aggregator with a custom configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Classify and accumulate every measurement of one image.
    ///
    /// Invalid records are skipped with a warning and never abort the
    /// image. An empty measurement slice yields an all-zero result with
    /// the image area still computed. Fails only when the pixel scale is
    /// unusable or the image has no pixel area.
    pub fn aggregate(
        &self,
        name: &str,
        raw_areas: &[f64],
        width_px: u32,
        height_px: u32,
        pixel_scale: f64,
    ) -> Result<ImageResult, AnalysisError> {
        if !pixel_scale.is_finite() || pixel_scale <= 0.0 {
            return Err(AnalysisError::MissingScale {
                image: name.to_string(),
            });
        }
        if width_px == 0 || height_px == 0 {
            return Err(AnalysisError::InvalidImage {
                image: name.to_string(),
                message: "image has no pixel area".to_string(),
            });
        }

        let image_area = width_px as f64 * pixel_scale * height_px as f64 * pixel_scale;
        let schema = &self.config.schema;
        let mut buckets = vec![BucketTally::default(); schema.len()];
        let mut below_range = 0u64;
        let mut skipped = 0u64;
        let mut warnings = Vec::new();

        for (record, &raw) in raw_areas.iter().enumerate() {
            match classify(raw, pixel_scale, self.config.sizing, schema) {
                Ok(hit) if hit.bucket == 0 => below_range += 1,
                Ok(hit) => {
                    let tally = &mut buckets[hit.bucket];
                    tally.count += 1;
                    tally.summed_size += hit.size;
                    tally.area_percent += hit.area / image_area * 100.0;
                }
                Err(err) => {
                    skipped += 1;
                    warnings.push(AnalysisWarning::invalid_measurement(name, record, err));
                }
            }
        }

        let result = ImageResult {
            name: name.into(),
            scale: pixel_scale,
            image_area,
            schema: schema.clone(),
            buckets,
            below_range,
            skipped,
            warnings,
        };
        self.log_result(&result);
        Ok(result)
    }

    fn log_result(&self, result: &ImageResult) {
        let unit = match self.config.sizing {
            SizingMode::Area => "nm²",
            SizingMode::Diameter => "nm",
        };
        for (boundary, tally) in result
            .schema
            .boundaries()
            .iter()
            .zip(&result.buckets)
            .skip(1)
        {
            debug!(
                "  - {boundary} {unit}: {}x ({:.2} Area-%, {:.2} {unit})",
                tally.count, tally.area_percent, tally.summed_size
            );
        }
        if result.below_range > 0 {
            debug!(
                "  - below first boundary: {}x (not accumulated)",
                result.below_range
            );
        }
        debug!(
            "  summed up pore area: {:.2} Area-%, {:.2} nm²",
            result.pore_area_percent(),
            result.pore_area()
        );
    }
}

impl Default for ImageAggregator {
    fn default() -> Self {
        Self::new()
    }
}

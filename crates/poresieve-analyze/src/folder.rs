//! Cross-image accumulation for one folder group.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use poresieve_core::{
    AnalysisConfig, AnalysisError, AnalysisWarning, BucketSchema, ImageInput, OutputMode,
    SizingMode,
};

use crate::image::{ImageAggregator, ImageResult};

/// Finalized statistics of one bucket across a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Lower boundary label of this bucket.
    pub boundary: f64,
    /// Cumulative pore count across all images.
    pub count: u64,
    /// Area-percent averaged over the image count (simple average).
    pub mean_area_percent: f64,
    /// Running sum of mean area-percent in boundary order.
    pub cumulative_percent: f64,
}

/// Finalized cross-image summary of one folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderSummary {
    /// One entry per bucket, in boundary order (sentinel included).
    pub buckets: Vec<BucketSummary>,
    /// Number of images folded in.
    pub image_count: usize,
}

/// Accumulates [`ImageResult`]s of one folder into running sums.
///
/// One accumulator exists per folder group and is processed to completion
/// before the next group begins. Folding is commutative over the summary
/// sums; the fold order only determines the column order of the rendered
/// transposed table.
pub struct FolderAccumulator {
    schema: BucketSchema,
    counts: Vec<u64>,
    percent_sums: Vec<f64>,
    images: IndexMap<CompactString, ImageResult>,
}

impl FolderAccumulator {
    /// Create a zeroed accumulator for the given schema.
    pub fn new(schema: BucketSchema) -> Self {
        let len = schema.len();
        Self {
            schema,
            counts: vec![0; len],
            percent_sums: vec![0.0; len],
            images: IndexMap::new(),
        }
    }

    /// Reset to the zeroed state, keeping the schema.
    pub fn reset(&mut self) {
        self.counts.fill(0);
        self.percent_sums.fill(0.0);
        self.images.clear();
    }

    /// Fold one image result into the running sums.
    ///
    /// Fails fast with [`AnalysisError::SchemaMismatch`] when the result
    /// was aggregated against different boundaries.
    pub fn fold(&mut self, result: ImageResult) -> Result<(), AnalysisError> {
        if result.schema != self.schema {
            return Err(AnalysisError::SchemaMismatch {
                image: result.name.to_string(),
            });
        }
        for (i, tally) in result.buckets.iter().enumerate() {
            self.counts[i] += tally.count;
            self.percent_sums[i] += tally.area_percent;
        }
        self.images.insert(result.name.clone(), result);
        Ok(())
    }

    /// Number of images folded so far.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Folded image results in fold order.
    pub fn images(&self) -> impl Iterator<Item = &ImageResult> {
        self.images.values()
    }

    /// Average the running sums and build the cumulative-percent curve.
    ///
    /// Fails with [`AnalysisError::NoImagesProcessed`] when nothing was
    /// folded; the division by the image count is never taken implicitly.
    pub fn finalize(&self) -> Result<FolderSummary, AnalysisError> {
        let image_count = self.images.len();
        if image_count == 0 {
            return Err(AnalysisError::NoImagesProcessed);
        }

        let mut cumulative = 0.0;
        let buckets = self
            .schema
            .boundaries()
            .iter()
            .enumerate()
            .map(|(i, &boundary)| {
                let mean = self.percent_sums[i] / image_count as f64;
                cumulative += mean;
                BucketSummary {
                    boundary,
                    count: self.counts[i],
                    mean_area_percent: mean,
                    cumulative_percent: cumulative,
                }
            })
            .collect();

        Ok(FolderSummary {
            buckets,
            image_count,
        })
    }

    /// Consume the accumulator, yielding the image results in fold order.
    pub fn into_images(self) -> Vec<ImageResult> {
        self.images.into_values().collect()
    }
}

/// Complete per-folder report: inputs to both result tables plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderReport {
    /// Folder group label.
    pub folder: String,
    /// Sizing mode the run used.
    pub sizing: SizingMode,
    /// Output mode applied to the tables (after the diameter coupling).
    pub output: OutputMode,
    /// Per-image results in traversal order.
    pub images: Vec<ImageResult>,
    /// Finalized cross-image summary.
    pub summary: FolderSummary,
    /// Folder-level warnings, including skipped images.
    pub warnings: Vec<AnalysisWarning>,
    /// When this report was produced.
    pub generated_at: DateTime<Utc>,
}

impl FolderReport {
    /// Total pores counted across all images and buckets.
    pub fn total_count(&self) -> u64 {
        self.summary.buckets.iter().map(|b| b.count).sum()
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty() || self.images.iter().any(|i| !i.warnings.is_empty())
    }
}

/// Aggregate a folder group's images and finalize its summary.
///
/// Images are aggregated on the rayon pool; folding then happens in input
/// order, so the summary sums and the table column order are deterministic.
/// A failed image is skipped with a warning; the folder itself fails only
/// when no image could be processed.
pub fn process_group(
    folder: &str,
    mut inputs: Vec<ImageInput>,
    config: &AnalysisConfig,
) -> Result<FolderReport, AnalysisError> {
    let mut warnings: Vec<AnalysisWarning> = Vec::new();
    for input in &mut inputs {
        warnings.append(&mut input.warnings);
    }

    let aggregator = ImageAggregator::with_config(config.clone());
    let outcomes: Vec<(CompactString, Result<ImageResult, AnalysisError>)> = inputs
        .par_iter()
        .map(|input| {
            let outcome = match input.pixel_scale {
                Some(scale) => aggregator.aggregate(
                    &input.name,
                    &input.raw_areas,
                    input.width_px,
                    input.height_px,
                    scale,
                ),
                None => Err(AnalysisError::MissingScale {
                    image: input.name.to_string(),
                }),
            };
            (input.name.clone(), outcome)
        })
        .collect();

    let mut accumulator = FolderAccumulator::new(config.schema.clone());
    for (name, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                debug!("{name}: {} pores in buckets", result.total_count());
                accumulator.fold(result)?;
            }
            Err(err) => {
                warn!("Skipping {name}: {err}");
                warnings.push(AnalysisWarning::from_error(name.as_str(), &err));
            }
        }
    }

    let summary = accumulator.finalize()?;
    Ok(FolderReport {
        folder: folder.to_string(),
        sizing: config.sizing,
        output: config.effective_output(),
        images: accumulator.into_images(),
        summary,
        warnings,
        generated_at: Utc::now(),
    })
}

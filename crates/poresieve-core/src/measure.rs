//! Measurement classification and per-image input records.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{AnalysisError, AnalysisWarning};
use crate::schema::BucketSchema;

/// Which derived quantity is bucketed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum SizingMode {
    /// Bucket the physical pore area (nm²).
    #[default]
    Area,
    /// Bucket sqrt(area), an equivalent-circle diameter proxy (nm).
    Diameter,
}

/// One classified measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classified {
    /// Bucket index in the schema (0 is the sentinel).
    pub bucket: usize,
    /// The bucketed size value: area in nm², or sqrt(area) in nm.
    pub size: f64,
    /// Physical pore area in nm², regardless of sizing mode.
    ///
    /// Area-percent accumulation always uses this value, even when
    /// diameters are bucketed.
    pub area: f64,
}

/// Classify one raw pixel-area measurement against a schema.
///
/// Physical area is `raw_px_area * pixel_scale²`. The bucketed value is the
/// area itself in [`SizingMode::Area`] or its square root in
/// [`SizingMode::Diameter`]; the boundary list is interpreted in matching
/// units (nm² or nm) without being duplicated.
///
/// Pure and deterministic. Negative or non-finite raw areas fail with
/// [`AnalysisError::InvalidMeasurement`]; the caller is responsible for
/// supplying a positive, finite `pixel_scale`.
///
/// ```
/// use poresieve_core::{classify, BucketSchema, SizingMode};
///
/// let schema = BucketSchema::new(vec![0.0, 1.0, 2.0, 4.0, 8.0]).unwrap();
/// let hit = classify(9.0, 1.0, SizingMode::Area, &schema).unwrap();
/// assert_eq!(hit.bucket, 4);
/// let hit = classify(9.0, 1.0, SizingMode::Diameter, &schema).unwrap();
/// assert_eq!(hit.bucket, 3);
/// ```
pub fn classify(
    raw_px_area: f64,
    pixel_scale: f64,
    mode: SizingMode,
    schema: &BucketSchema,
) -> Result<Classified, AnalysisError> {
    if !raw_px_area.is_finite() || raw_px_area < 0.0 {
        return Err(AnalysisError::InvalidMeasurement { value: raw_px_area });
    }
    let area = raw_px_area * pixel_scale * pixel_scale;
    let size = match mode {
        SizingMode::Area => area,
        SizingMode::Diameter => area.sqrt(),
    };
    Ok(Classified {
        bucket: schema.bucket_index_of(size),
        size,
        area,
    })
}

/// Raw per-image input handed from the scan edge to the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInput {
    /// Image file name.
    pub name: CompactString,
    /// Image width in pixels.
    pub width_px: u32,
    /// Image height in pixels.
    pub height_px: u32,
    /// Resolved pixel scale in nm/px, if any source provided one.
    pub pixel_scale: Option<f64>,
    /// Raw pore areas in px², one per detected pore.
    pub raw_areas: Vec<f64>,
    /// Warnings collected while loading this image.
    pub warnings: Vec<AnalysisWarning>,
}

impl ImageInput {
    /// Create an input with no measurements.
    pub fn new(name: impl Into<CompactString>, width_px: u32, height_px: u32) -> Self {
        Self {
            name: name.into(),
            width_px,
            height_px,
            pixel_scale: None,
            raw_areas: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

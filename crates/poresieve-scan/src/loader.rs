//! Turns discovered image entries into analysis inputs.

use tracing::{debug, warn};

use poresieve_core::{AnalysisError, AnalysisWarning, ImageInput};

use crate::discover::{ImageEntry, ImageGroup};
use crate::records::read_pore_areas;
use crate::scale::pixel_scale_from_metadata;

/// The loaded inputs of one group, plus entry-level failures.
#[derive(Debug, Clone)]
pub struct LoadedGroup {
    /// Inputs in traversal order, one per loadable image.
    pub inputs: Vec<ImageInput>,
    /// One warning per image that could not be loaded.
    pub warnings: Vec<AnalysisWarning>,
}

/// Load every image of a group.
///
/// An image that cannot be loaded is dropped with a warning; the rest of
/// the group is unaffected.
pub fn load_inputs(group: &ImageGroup, fallback_scale: Option<f64>) -> LoadedGroup {
    let mut inputs = Vec::with_capacity(group.images.len());
    let mut warnings = Vec::new();
    for entry in &group.images {
        match load_input(entry, group.scale, fallback_scale) {
            Ok(input) => inputs.push(input),
            Err(err) => {
                warn!("Skipping {}: {err}", entry.name);
                warnings.push(AnalysisWarning::from_error(&entry.name, &err));
            }
        }
    }
    LoadedGroup { inputs, warnings }
}

/// Load one image entry.
///
/// Scale resolution order: embedded metadata, then the group's folder
/// scale, then the explicit fallback. No scale source leaves
/// `pixel_scale` unset; the aggregation stage decides whether to skip.
pub fn load_input(
    entry: &ImageEntry,
    group_scale: Option<f64>,
    fallback_scale: Option<f64>,
) -> Result<ImageInput, AnalysisError> {
    let scale = match pixel_scale_from_metadata(&entry.path) {
        Ok(Some(metadata_scale)) => {
            debug!("{}: detected image scale {metadata_scale} nm/px", entry.name);
            Some(metadata_scale)
        }
        Ok(None) => group_scale.or(fallback_scale),
        Err(err) => {
            warn!("{}: metadata unreadable: {err}", entry.name);
            group_scale.or(fallback_scale)
        }
    };

    let (width_px, height_px) =
        image::image_dimensions(&entry.masked_image).map_err(|err| AnalysisError::InvalidImage {
            image: entry.name.clone(),
            message: format!(
                "cannot read dimensions of {}: {err}",
                entry.masked_image.display()
            ),
        })?;
    debug!("{}: image area {} px²", entry.name, u64::from(width_px) * u64::from(height_px));

    let records = read_pore_areas(&entry.records_csv, &entry.name)?;
    debug!(
        "{}: processed {} records ({} skipped)",
        entry.name,
        records.areas.len(),
        records.skipped
    );

    Ok(ImageInput {
        name: entry.name.as_str().into(),
        width_px,
        height_px,
        pixel_scale: scale,
        raw_areas: records.areas,
        warnings: records.warnings,
    })
}

//! Per-pore measurement CSV reading.
//!
//! The segmentation tool writes one CSV per image with a header row and one
//! line per detected pore. Only the second column (the raw pixel area) is
//! consumed; the first column is a row label and is ignored.

use std::path::Path;

use tracing::warn;

use poresieve_core::{AnalysisError, AnalysisWarning};

/// Raw areas read from one measurement CSV, plus skip bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct PoreRecords {
    /// Raw pore areas in px², in file order.
    pub areas: Vec<f64>,
    /// Number of records that could not be used.
    pub skipped: u64,
    /// One warning per skipped record.
    pub warnings: Vec<AnalysisWarning>,
}

/// Read the raw pixel areas of one image's measurement CSV.
///
/// Unparseable records are skipped with a warning and never abort the
/// file. Values that parse but are negative or non-finite pass through
/// unchanged; the classifier rejects them downstream so the skip is
/// attributed to the right stage.
pub fn read_pore_areas(path: &Path, image: &str) -> Result<PoreRecords, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AnalysisError::parse(path, e.to_string()))?;

    let mut records = PoreRecords::default();
    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                warn!("{image}: record {row} unreadable: {err}");
                records.skipped += 1;
                records
                    .warnings
                    .push(AnalysisWarning::invalid_measurement(image, row, err));
                continue;
            }
        };
        // empty trailing lines come through as a single empty field
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let Some(field) = record.get(1) else {
            records.skipped += 1;
            records.warnings.push(AnalysisWarning::invalid_measurement(
                image,
                row,
                "missing area column",
            ));
            continue;
        };
        match field.parse::<f64>() {
            Ok(area) => records.areas.push(area),
            Err(err) => {
                records.skipped += 1;
                records
                    .warnings
                    .push(AnalysisWarning::invalid_measurement(image, row, err));
            }
        }
    }
    Ok(records)
}

//! Result table rendering.
//!
//! Both tables are built as structured row containers and serialized once,
//! decoupling accumulation from formatting.

use std::path::Path;

use itertools::Itertools;
use serde::Serialize;

use poresieve_core::{AnalysisConfig, AnalysisError, OutputMode, SizingMode};

use crate::folder::FolderReport;
use crate::image::BucketTally;

/// A plain comma-separated table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CsvTable {
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// The accumulated rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Serialize all rows as comma-separated lines.
    pub fn to_csv_string(&self) -> String {
        let mut out = self.rows.iter().map(|row| row.iter().join(",")).join("\n");
        out.push('\n');
        out
    }

    /// Write the serialized table to a file.
    pub fn write_to(&self, path: &Path) -> Result<(), AnalysisError> {
        std::fs::write(path, self.to_csv_string()).map_err(|e| AnalysisError::io(path, e))
    }
}

/// Renders a [`FolderReport`] into the two result table shapes.
pub struct TableFormatter {
    sizing: SizingMode,
    output: OutputMode,
}

impl TableFormatter {
    /// Create a formatter for the given modes.
    pub fn new(sizing: SizingMode, output: OutputMode) -> Self {
        Self { sizing, output }
    }

    /// Create a formatter from a run configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.sizing, config.effective_output())
    }

    /// The row-per-image table (`results.csv`).
    ///
    /// Header holds the bucket boundaries, one line per image follows, and
    /// the trailing `Summe` row carries the folder totals: per bucket the
    /// cumulative count, plus the averaged area-percent at 5 decimals when
    /// areas are bucketed.
    pub fn image_table(&self, report: &FolderReport) -> CsvTable {
        let mut table = CsvTable::new();
        let boundaries: Vec<f64> = report.summary.buckets.iter().map(|b| b.boundary).collect();

        let mut header = vec!["name".to_string()];
        header.extend(boundaries.iter().map(|&b| fmt_boundary(b)));
        table.push_row(header);

        for image in &report.images {
            let mut row = vec![image.name.to_string()];
            row.extend(image.buckets.iter().map(|t| self.image_cell(t)));
            table.push_row(row);
        }

        let mut total = vec!["Summe".to_string()];
        for bucket in &report.summary.buckets {
            total.push(bucket.count.to_string());
            if self.sizing != SizingMode::Diameter {
                total.push(fmt(bucket.mean_area_percent, 5));
            }
        }
        table.push_row(total);
        table
    }

    /// The row-per-bucket table (`mr_result.csv`), consumed by plotting.
    ///
    /// Two metadata rows (bucket labels and per-image scales), then one row
    /// per bucket with the boundary, the per-image cells in traversal
    /// order, and the finalized folder cells under `fullSum`.
    pub fn bucket_table(&self, report: &FolderReport) -> CsvTable {
        let mut table = CsvTable::new();

        let mut labels = vec!["#bucket".to_string()];
        labels.extend(report.images.iter().map(|i| stem_of(&i.name)));
        labels.push("fullSum".to_string());
        table.push_row(labels);

        let mut scales = vec!["#scale [nm/px]".to_string()];
        scales.extend(report.images.iter().map(|i| fmt(i.scale, 3)));
        scales.push("-".to_string());
        table.push_row(scales);

        for (i, bucket) in report.summary.buckets.iter().enumerate() {
            let mut row = vec![fmt_boundary(bucket.boundary)];
            row.extend(report.images.iter().map(|img| self.image_cell(&img.buckets[i])));
            if self.sizing == SizingMode::Diameter {
                row.push(bucket.count.to_string());
            } else {
                row.push(fmt(bucket.mean_area_percent, 5));
                row.push(fmt(bucket.cumulative_percent, 5));
            }
            table.push_row(row);
        }
        table
    }

    fn image_cell(&self, tally: &BucketTally) -> String {
        match self.output {
            OutputMode::AreaPercent => fmt(tally.area_percent, 2),
            OutputMode::AbsoluteSize => fmt(tally.summed_size, 2),
            OutputMode::ParticleCount => tally.count.to_string(),
        }
    }
}

/// Format a boundary label without a spurious fraction (`31.5`, but `63`).
fn fmt_boundary(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Format a value with a fixed number of decimals.
fn fmt(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Strip the extension off an image file name for column labels.
pub(crate) fn stem_of(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

//! Aggregation engine for poresieve.
//!
//! This crate reduces per-pore measurement streams to per-image results,
//! folds those into per-folder summaries, and renders the two result
//! tables plus the gnuplot script.
//!
//! # Pipeline
//!
//! ```rust
//! use poresieve_analyze::process_group;
//! use poresieve_core::{AnalysisConfig, ImageInput};
//!
//! let mut input = ImageInput::new("img_01.tif", 1024, 943);
//! input.pixel_scale = Some(1.4545);
//! input.raw_areas = vec![12.0, 260.0, 31.0];
//!
//! let config = AnalysisConfig::default();
//! let report = process_group("400nm", vec![input], &config).unwrap();
//! assert_eq!(report.summary.image_count, 1);
//! ```
//!
//! # Tables
//!
//! ```rust,ignore
//! use poresieve_analyze::TableFormatter;
//!
//! let formatter = TableFormatter::from_config(&config);
//! formatter.image_table(&report).write_to(&dir.join("results.csv"))?;
//! formatter.bucket_table(&report).write_to(&dir.join("mr_result.csv"))?;
//! ```

mod folder;
mod image;
mod plot;
mod table;

pub use folder::{
    BucketSummary, FolderAccumulator, FolderReport, FolderSummary, process_group,
};
pub use image::{BucketTally, ImageAggregator, ImageResult};
pub use plot::PlotScript;
pub use table::{CsvTable, TableFormatter};

// Re-export core types for convenience
pub use poresieve_core::{
    AnalysisConfig, AnalysisError, AnalysisWarning, BucketSchema, ImageInput, OutputMode,
    SizingMode, WarningKind, classify,
};

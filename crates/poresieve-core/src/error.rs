//! Error and warning types for the analysis pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while classifying, aggregating, or reading input.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A raw measurement was negative or non-finite.
    #[error("Invalid measurement value: {value}")]
    InvalidMeasurement { value: f64 },

    /// No pixel scale could be resolved for an image.
    #[error("No pixel scale available for image: {image}")]
    MissingScale { image: String },

    /// Finalize was called without any successfully folded image.
    #[error("No images processed, nothing to summarize")]
    NoImagesProcessed,

    /// An image result was built against a different bucket schema.
    #[error("Image {image} was aggregated against a different bucket schema")]
    SchemaMismatch { image: String },

    /// Bucket boundaries failed validation.
    #[error("Invalid bucket schema: {message}")]
    InvalidSchema { message: String },

    /// An image file could not be used (zero dimensions, undecodable).
    #[error("Unusable image {image}: {message}")]
    InvalidImage { image: String, message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A delimited input file could not be parsed.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Generic I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error with path context.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Kind of non-fatal analysis warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A single measurement record was rejected.
    InvalidMeasurement,
    /// An image was skipped because no pixel scale was available.
    MissingScale,
    /// The per-pore measurement CSV for an image was missing or unusable.
    MissingRecords,
    /// An image or metadata file could not be read.
    ReadError,
    /// A subdirectory did not match any configured scale name.
    UnrecognizedFolder,
}

/// Non-fatal warning attached to an image or folder result.
///
/// Per-record and per-image failures never abort the surrounding folder;
/// they are collected as warnings and reported alongside the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisWarning {
    /// Image (or folder entry) the warning refers to.
    pub image: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl AnalysisWarning {
    /// Create a new warning.
    pub fn new(image: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            image: image.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a rejected-measurement warning.
    pub fn invalid_measurement(
        image: impl Into<String>,
        record: usize,
        detail: impl std::fmt::Display,
    ) -> Self {
        Self {
            image: image.into(),
            message: format!("Record {record} rejected: {detail}"),
            kind: WarningKind::InvalidMeasurement,
        }
    }

    /// Create a missing-scale warning.
    pub fn missing_scale(image: impl Into<String>) -> Self {
        let image = image.into();
        Self {
            message: format!("No pixel scale for {image}, image skipped"),
            image,
            kind: WarningKind::MissingScale,
        }
    }

    /// Create a missing-records warning.
    pub fn missing_records(image: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            image: image.into(),
            message: format!("Measurement file not found: {}", path.display()),
            kind: WarningKind::MissingRecords,
        }
    }

    /// Create an unrecognized-folder warning.
    pub fn unrecognized_folder(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("{name} does not match any configured scale folder"),
            image: name,
            kind: WarningKind::UnrecognizedFolder,
        }
    }

    /// Convert a per-image error into the warning that records its skip.
    pub fn from_error(image: impl Into<String>, error: &AnalysisError) -> Self {
        let kind = match error {
            AnalysisError::InvalidMeasurement { .. } => WarningKind::InvalidMeasurement,
            AnalysisError::MissingScale { .. } => WarningKind::MissingScale,
            AnalysisError::Parse { .. } => WarningKind::MissingRecords,
            _ => WarningKind::ReadError,
        };
        Self {
            image: image.into(),
            message: error.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_context() {
        let err = AnalysisError::io(
            "/data/400nm",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/data/400nm"));
    }

    #[test]
    fn test_warning_constructors() {
        let warning = AnalysisWarning::missing_scale("img_01.tif");
        assert_eq!(warning.kind, WarningKind::MissingScale);
        assert!(warning.message.contains("img_01.tif"));

        let warning = AnalysisWarning::invalid_measurement("img_01.tif", 4, "negative area");
        assert_eq!(warning.kind, WarningKind::InvalidMeasurement);
        assert!(warning.message.contains("Record 4"));
    }

    #[test]
    fn test_warning_from_error() {
        let err = AnalysisError::MissingScale {
            image: "img_01.tif".to_string(),
        };
        let warning = AnalysisWarning::from_error("img_01.tif", &err);
        assert_eq!(warning.kind, WarningKind::MissingScale);
    }
}

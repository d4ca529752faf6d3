//! Core types and traits for poresieve.
//!
//! This crate provides the fundamental data structures shared across the
//! poresieve ecosystem: the size-range bucket schema, measurement
//! classification, run configuration, and the error and warning types.

mod config;
mod error;
mod measure;
mod schema;

pub use config::{AnalysisConfig, AnalysisConfigBuilder, OutputMode};
pub use error::{AnalysisError, AnalysisWarning, WarningKind};
pub use measure::{Classified, ImageInput, SizingMode, classify};
pub use schema::BucketSchema;

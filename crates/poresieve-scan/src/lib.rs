//! Input edge for poresieve.
//!
//! This crate finds the images to analyze and turns them into
//! [`ImageInput`]s for the aggregation engine:
//!
//! - **Discovery** of folder groups (scale-named subfolders, or one group
//!   when images carry embedded scale metadata)
//! - **Measurement CSVs** written by the external segmentation tool
//! - **Scale detection** from vendor metadata or the folder-name table
//! - **Dimension probing** of the masked images
//!
//! # Example
//!
//! ```rust,no_run
//! use poresieve_scan::{DiscoveryConfig, FolderScanner, load_inputs};
//!
//! let config = DiscoveryConfig::new("/data/run_07");
//! let groups = FolderScanner::new().discover(&config).unwrap();
//! for group in &groups {
//!     let loaded = load_inputs(group, None);
//!     println!("{}: {} images", group.name, loaded.inputs.len());
//! }
//! ```

mod discover;
mod loader;
mod records;
mod scale;

pub use discover::{
    DiscoveryConfig, DiscoveryConfigBuilder, FolderScanner, ImageEntry, ImageGroup,
    MASKED_SUFFIX, RECORDS_SUBDIR, RECORDS_SUFFIX,
};
pub use loader::{LoadedGroup, load_input, load_inputs};
pub use records::{PoreRecords, read_pore_areas};
pub use scale::{
    FolderScale, default_folder_scales, pixel_scale_from_metadata, scale_for_folder,
};

// Re-export core types for convenience
pub use poresieve_core::{AnalysisError, AnalysisWarning, ImageInput, WarningKind};

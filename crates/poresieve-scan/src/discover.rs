//! Working-directory discovery.
//!
//! Groups the images to analyze by folder. A working directory whose
//! images carry embedded scale metadata forms a single group; otherwise
//! each immediate subdirectory named after a known scale (`400nm`, ...)
//! forms one group with that folder's fixed scale.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use jwalk::WalkDir;
use tracing::debug;

use poresieve_core::{AnalysisError, AnalysisWarning};

use crate::scale::{FolderScale, default_folder_scales, pixel_scale_from_metadata, scale_for_folder};

/// Subdirectory the segmentation tool writes its outputs to.
pub const RECORDS_SUBDIR: &str = "pores";
/// Suffix of the per-image measurement CSV.
pub const RECORDS_SUFFIX: &str = "_pores_sqpx.csv";
/// Suffix of the masked image the dimensions are probed from.
pub const MASKED_SUFFIX: &str = "-masked.tif";

const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "tif"];

/// One image of a group, with its derived companion paths.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    /// Path of the source image.
    pub path: PathBuf,
    /// Image file name.
    pub name: String,
    /// File name without extension.
    pub stem: String,
    /// Path of the per-pore measurement CSV.
    pub records_csv: PathBuf,
    /// Path of the masked image holding the analyzed pixel dimensions.
    pub masked_image: PathBuf,
}

/// One folder of images sharing a scale source.
#[derive(Debug, Clone)]
pub struct ImageGroup {
    /// Directory the group's outputs are written to.
    pub dir: PathBuf,
    /// Group label, used for the plot script name.
    pub name: String,
    /// Folder-level scale in nm/px, if derived from the folder name.
    pub scale: Option<f64>,
    /// Images in traversal order.
    pub images: Vec<ImageEntry>,
    /// Warnings collected during discovery.
    pub warnings: Vec<AnalysisWarning>,
}

/// Configuration for discovery.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct DiscoveryConfig {
    /// Working directory to search.
    pub root: PathBuf,

    /// Scale-named folder table.
    #[builder(default = "default_folder_scales()")]
    pub folder_scales: Vec<FolderScale>,
}

impl DiscoveryConfig {
    /// Create a new discovery config builder.
    pub fn builder() -> DiscoveryConfigBuilder {
        DiscoveryConfigBuilder::default()
    }

    /// Create a simple config for a working directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            folder_scales: default_folder_scales(),
        }
    }
}

/// Finds image groups under a working directory.
pub struct FolderScanner;

impl FolderScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Discover the image groups of a working directory.
    pub fn discover(&self, config: &DiscoveryConfig) -> Result<Vec<ImageGroup>, AnalysisError> {
        let root = config
            .root
            .canonicalize()
            .map_err(|e| AnalysisError::io(&config.root, e))?;
        if !root.is_dir() {
            return Err(AnalysisError::NotADirectory { path: root });
        }

        let root_images = image_files(&root);
        if has_metadata_scale(&root_images) {
            debug!("scale metadata found, treating {} as one group", root.display());
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "plot".to_string());
            return Ok(vec![build_group(&root, name, None, root_images)]);
        }

        let mut groups = Vec::new();
        let mut orphan_warnings = Vec::new();
        for subdir in subdirectories(&root) {
            let name = subdir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match scale_for_folder(&name, &config.folder_scales) {
                Some(scale) => {
                    debug!("folder {name}: {scale:.3} nm/px");
                    let images = image_files(&subdir);
                    groups.push(build_group(&subdir, name, Some(scale), images));
                }
                None => {
                    debug!("skipping {name}: not a scale folder");
                    orphan_warnings.push(AnalysisWarning::unrecognized_folder(&name));
                }
            }
        }
        // attach orphan-folder warnings to the first group so they surface
        if let Some(first) = groups.first_mut() {
            first.warnings.extend(orphan_warnings);
        }
        Ok(groups)
    }
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Pair each image with its measurement CSV, dropping images without one.
fn build_group(
    dir: &Path,
    name: String,
    scale: Option<f64>,
    image_paths: Vec<PathBuf>,
) -> ImageGroup {
    let mut images = Vec::new();
    let mut warnings = Vec::new();
    for path in image_paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let records_csv = dir
            .join(RECORDS_SUBDIR)
            .join(format!("{stem}{RECORDS_SUFFIX}"));
        if !records_csv.exists() {
            warnings.push(AnalysisWarning::missing_records(&file_name, &records_csv));
            continue;
        }
        let masked_image = dir.join(RECORDS_SUBDIR).join(format!("{stem}{MASKED_SUFFIX}"));
        images.push(ImageEntry {
            path,
            name: file_name,
            stem,
            records_csv,
            masked_image,
        });
    }
    ImageGroup {
        dir: dir.to_path_buf(),
        name,
        scale,
        images,
        warnings,
    }
}

/// Image files directly inside a directory, sorted by name.
fn image_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .skip_hidden(true)
        .sort(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| is_image(path))
        .collect();
    files.sort();
    files
}

/// Immediate subdirectories, sorted by name.
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .skip_hidden(true)
        .sort(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.depth() == 1 && entry.file_type().is_dir())
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Whether any of the images carries an embedded pixel scale.
fn has_metadata_scale(images: &[PathBuf]) -> bool {
    images
        .iter()
        .any(|path| matches!(pixel_scale_from_metadata(path), Ok(Some(_))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn seed_image(dir: &Path, stem: &str, with_csv: bool) {
        touch(&dir.join(format!("{stem}.tif")), b"fake image bytes");
        if with_csv {
            touch(
                &dir.join(RECORDS_SUBDIR).join(format!("{stem}{RECORDS_SUFFIX}")),
                b" ,Area\n1,12\n",
            );
        }
    }

    #[test]
    fn test_discovers_scale_named_folders() {
        let root = TempDir::new().unwrap();
        seed_image(&root.path().join("400nm"), "img_b", true);
        seed_image(&root.path().join("400nm"), "img_a", true);
        seed_image(&root.path().join("2000nm"), "img_c", true);
        fs::create_dir(root.path().join("notes")).unwrap();

        let config = DiscoveryConfig::new(root.path());
        let groups = FolderScanner::new().discover(&config).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "2000nm");
        assert_eq!(groups[1].name, "400nm");
        assert!((groups[1].scale.unwrap() - 400.0 / 275.0).abs() < 1e-12);
        // images sorted by name
        let names: Vec<&str> = groups[1].images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["img_a.tif", "img_b.tif"]);
        // the unrecognized "notes" folder surfaces as a warning
        assert!(
            groups[0]
                .warnings
                .iter()
                .any(|w| w.kind == poresieve_core::WarningKind::UnrecognizedFolder)
        );
    }

    #[test]
    fn test_images_without_records_are_skipped_with_warning() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("400nm");
        seed_image(&dir, "with_csv", true);
        seed_image(&dir, "without_csv", false);

        let config = DiscoveryConfig::new(root.path());
        let groups = FolderScanner::new().discover(&config).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].images.len(), 1);
        assert_eq!(groups[0].images[0].stem, "with_csv");
        assert!(
            groups[0]
                .warnings
                .iter()
                .any(|w| w.kind == poresieve_core::WarningKind::MissingRecords)
        );
    }

    #[test]
    fn test_metadata_scale_makes_root_one_group() {
        let root = TempDir::new().unwrap();
        touch(
            &root.path().join("img_meta.tif"),
            b"header\nPixelWidth=2e-009\n",
        );
        touch(
            &root
                .path()
                .join(RECORDS_SUBDIR)
                .join(format!("img_meta{RECORDS_SUFFIX}")),
            b" ,Area\n1,12\n",
        );
        // a scale-named subdir that must NOT become its own group
        seed_image(&root.path().join("400nm"), "img_x", true);

        let config = DiscoveryConfig::new(root.path());
        let groups = FolderScanner::new().discover(&config).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].dir, root.path().canonicalize().unwrap());
        assert!(groups[0].scale.is_none());
        assert_eq!(groups[0].images.len(), 1);
    }

    #[test]
    fn test_entry_companion_paths() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("500nm");
        seed_image(&dir, "img_a", true);

        let config = DiscoveryConfig::new(root.path());
        let groups = FolderScanner::new().discover(&config).unwrap();
        let entry = &groups[0].images[0];

        assert!(entry.records_csv.ends_with("pores/img_a_pores_sqpx.csv"));
        assert!(entry.masked_image.ends_with("pores/img_a-masked.tif"));
    }

    #[test]
    fn test_root_must_be_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = DiscoveryConfig::new(file.path());
        let err = FolderScanner::new().discover(&config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NotADirectory { .. } | AnalysisError::Io { .. }
        ));
    }
}

//! Pixel scale detection.
//!
//! Two sources, tried in order: the vendor metadata block that SEM
//! vendors append to their TIFF/JPEG files (a `PixelWidth=<meters>` line),
//! and a table mapping scale-named folders (`400nm`, ...) to a known
//! metric/pixel ratio of the instrument's scale bar.

use std::path::Path;

use serde::{Deserialize, Serialize};

use poresieve_core::AnalysisError;

const PIXEL_WIDTH_KEY: &[u8] = b"PixelWidth";
const NM_PER_METER: f64 = 1e9;

/// Scan an image file's bytes for an embedded pixel width.
///
/// Returns the scale in nm/px, or `None` when the metadata key is absent.
/// This is a byte-level search over the trailing vendor block, not image
/// decoding.
pub fn pixel_scale_from_metadata(path: &Path) -> Result<Option<f64>, AnalysisError> {
    let bytes = std::fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    Ok(parse_pixel_width(&bytes))
}

fn parse_pixel_width(bytes: &[u8]) -> Option<f64> {
    let start = find(bytes, PIXEL_WIDTH_KEY)?;
    let rest = &bytes[start..];
    let end = rest
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .unwrap_or(rest.len());
    let line = String::from_utf8_lossy(&rest[..end]);
    let value = line.split('=').nth(1)?.trim();
    let meters: f64 = value.parse().ok()?;
    (meters.is_finite() && meters > 0.0).then(|| meters * NM_PER_METER)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// One entry of the scale-named folder table.
///
/// A folder named `<metric_nm>nm` holds images whose scale bar spans
/// `metric_nm` nanometers over `pixel_px` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderScale {
    /// Metric length of the scale bar in nm.
    pub metric_nm: u32,
    /// Pixel length of the scale bar.
    pub pixel_px: u32,
}

impl FolderScale {
    /// Create a new folder scale entry.
    pub fn new(metric_nm: u32, pixel_px: u32) -> Self {
        Self {
            metric_nm,
            pixel_px,
        }
    }

    /// The folder name this entry matches.
    pub fn folder_name(&self) -> String {
        format!("{}nm", self.metric_nm)
    }

    /// The resulting pixel scale in nm/px.
    pub fn nm_per_px(&self) -> f64 {
        f64::from(self.metric_nm) / f64::from(self.pixel_px)
    }
}

/// The scale bars this instrument's magnification steps produce.
pub fn default_folder_scales() -> Vec<FolderScale> {
    vec![
        FolderScale::new(400, 275),
        FolderScale::new(500, 170),
        FolderScale::new(2000, 345),
    ]
}

/// Look up the scale for a folder name, if it matches the table.
pub fn scale_for_folder(name: &str, table: &[FolderScale]) -> Option<f64> {
    table
        .iter()
        .find(|entry| entry.folder_name() == name)
        .map(FolderScale::nm_per_px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_pixel_width() {
        let bytes = b"garbage\x00binary\nPixelWidth=4.8828e-009\r\nPixelHeight=4.8828e-009\n";
        let scale = parse_pixel_width(bytes).unwrap();
        assert!((scale - 4.8828).abs() < 1e-9);
    }

    #[test]
    fn test_parse_pixel_width_absent() {
        assert_eq!(parse_pixel_width(b"no metadata here"), None);
        assert_eq!(parse_pixel_width(b"PixelWidth=garbage\n"), None);
        assert_eq!(parse_pixel_width(b"PixelWidth=0\n"), None);
    }

    #[test]
    fn test_metadata_scan_on_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xff\xd8fakejpeg\nPixelWidth=2e-009\n")
            .unwrap();
        let scale = pixel_scale_from_metadata(file.path()).unwrap();
        assert_eq!(scale, Some(2.0));
    }

    #[test]
    fn test_folder_scale_table() {
        let table = default_folder_scales();
        let scale = scale_for_folder("400nm", &table).unwrap();
        assert!((scale - 400.0 / 275.0).abs() < 1e-12);
        assert!(scale_for_folder("450nm", &table).is_none());
        assert!(scale_for_folder("400", &table).is_none());
    }
}

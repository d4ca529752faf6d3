//! Gnuplot script generation for the row-per-bucket table.
//!
//! The script plots `mr_result.csv` with the bucket boundary on the x axis
//! and one named series per image column. It is written to disk for the
//! user to run; poresieve never invokes gnuplot itself.

use std::fmt::Write as _;
use std::path::Path;

use poresieve_core::{OutputMode, SizingMode};

use crate::folder::FolderReport;

/// Builder for the gnuplot script of one folder group.
pub struct PlotScript<'a> {
    report: &'a FolderReport,
    include_sum: bool,
}

impl<'a> PlotScript<'a> {
    /// Create a script builder for a report.
    pub fn new(report: &'a FolderReport) -> Self {
        Self {
            report,
            include_sum: false,
        }
    }

    /// Also plot the finalized `fullSum` column.
    pub fn include_sum(mut self, include: bool) -> Self {
        self.include_sum = include;
        self
    }

    /// Render the script text. `dir` is the group directory holding
    /// `mr_result.csv`; `stem` names the script and its pdf output.
    pub fn render(&self, dir: &Path, stem: &str) -> String {
        let mut script = String::new();
        let dir = dir.display();

        writeln!(script, "set logscale x").unwrap();
        writeln!(script, "set datafile separator \",\"").unwrap();
        writeln!(script, "set terminal pdf size 17cm,10cm").unwrap();
        writeln!(script, "set output \"{dir}/{stem}.pdf\"").unwrap();
        writeln!(script, "cd \"{dir}\"").unwrap();

        match self.report.sizing {
            SizingMode::Diameter => {
                writeln!(script, "set xlabel \"Porendurchmesser in nm\"").unwrap();
            }
            SizingMode::Area => {
                writeln!(script, "set xlabel \"Porengröße in nm²\"").unwrap();
            }
        }
        match self.report.output {
            OutputMode::AreaPercent => {
                writeln!(
                    script,
                    "set ylabel \"Gesamtfläche in % der Gesamtbildfläche\""
                )
                .unwrap();
                writeln!(script, "set key left top").unwrap();
            }
            OutputMode::AbsoluteSize => {
                writeln!(script, "set ylabel \"Gesamtfläche in nm²\"").unwrap();
                writeln!(script, "set key left top").unwrap();
            }
            OutputMode::ParticleCount => {
                writeln!(script, "set ylabel \"Partikelanzahl\"").unwrap();
                writeln!(script, "set key right top").unwrap();
            }
        }

        let tics = self
            .report
            .summary
            .buckets
            .iter()
            .map(|b| {
                if b.boundary.fract() == 0.0 {
                    format!("{}", b.boundary as i64)
                } else {
                    b.boundary.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        writeln!(script, "set xtics ({tics}) rotate by 45 right").unwrap();

        // x is column 1, the first image column is 2
        let mut series: Vec<String> = self
            .report
            .images
            .iter()
            .enumerate()
            .map(|(i, image)| {
                let title = crate::table::stem_of(&image.name).replace('_', "\\_");
                format!(
                    "'mr_result.csv' using 1:{} title '{title}' with linespoints",
                    i + 2
                )
            })
            .collect();
        if self.include_sum {
            series.push(format!(
                "'mr_result.csv' using 1:{} title 'fullSum' with linespoints linewidth 3",
                self.report.images.len() + 2
            ));
        }
        writeln!(script, "plot {}", series.join(", ")).unwrap();

        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::process_group;
    use poresieve_core::{AnalysisConfig, BucketSchema, ImageInput};
    use std::path::PathBuf;

    fn report(sizing: SizingMode) -> FolderReport {
        let config = AnalysisConfig::builder()
            .schema(BucketSchema::new(vec![0.0, 1.0, 2.0, 4.0, 8.0]).unwrap())
            .sizing(sizing)
            .build()
            .unwrap();
        let mut input = ImageInput::new("img_one.tif", 100, 100);
        input.pixel_scale = Some(1.0);
        input.raw_areas = vec![0.5, 3.0];
        let mut other = ImageInput::new("img_two.tif", 100, 100);
        other.pixel_scale = Some(1.0);
        other.raw_areas = vec![9.0];
        process_group("400nm", vec![input, other], &config).unwrap()
    }

    #[test]
    fn test_script_shape() {
        let report = report(SizingMode::Area);
        let script = PlotScript::new(&report).render(&PathBuf::from("/data/400nm"), "400nm");

        assert!(script.contains("set logscale x"));
        assert!(script.contains("set output \"/data/400nm/400nm.pdf\""));
        assert!(script.contains("set xtics (0,1,2,4,8) rotate by 45 right"));
        assert!(script.contains("set xlabel \"Porengröße in nm²\""));
        assert!(script.contains("using 1:2 title 'img\\_one'"));
        assert!(script.contains("using 1:3 title 'img\\_two'"));
        assert!(!script.contains("fullSum"));
    }

    #[test]
    fn test_sum_series_column() {
        let report = report(SizingMode::Area);
        let script = PlotScript::new(&report)
            .include_sum(true)
            .render(&PathBuf::from("/data/400nm"), "400nm");

        assert!(script.contains("using 1:4 title 'fullSum' with linespoints linewidth 3"));
    }

    #[test]
    fn test_diameter_labels() {
        let report = report(SizingMode::Diameter);
        let script = PlotScript::new(&report).render(&PathBuf::from("/d"), "d");

        assert!(script.contains("set xlabel \"Porendurchmesser in nm\""));
        assert!(script.contains("set ylabel \"Partikelanzahl\""));
        assert!(script.contains("set key right top"));
    }
}

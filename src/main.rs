//! poresieve - pore size distribution analysis for SEM micrographs.
//!
//! Usage:
//!   poresieve [PATH]                 Analyze a working directory
//!   poresieve -p [PATH]              Bucket equivalent-circle diameters
//!   poresieve -o 2 [PATH]            Write particle counts per bucket
//!   poresieve --format json [PATH]   Emit the report as JSON
//!   poresieve --help                 Show help
//!
//! The working directory either holds images with embedded scale metadata,
//! or scale-named subfolders (400nm, 500nm, 2000nm) of images. Each group
//! gets a `results.csv`, a plot-ready `mr_result.csv`, and a gnuplot
//! script next to its images.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use poresieve_analyze::{FolderReport, PlotScript, TableFormatter, process_group};
use poresieve_core::{AnalysisConfig, OutputMode, SizingMode};
use poresieve_scan::{DiscoveryConfig, FolderScanner, load_inputs};

#[derive(Parser)]
#[command(
    name = "poresieve",
    version,
    about = "Pore size distribution analyzer for SEM micrographs",
    long_about = "poresieve buckets segmented pore measurements into logarithmic \
                  size ranges and aggregates them per image and per folder.\n\n\
                  Point it at a working directory containing either images with \
                  embedded scale metadata or scale-named subfolders (400nm, ...)."
)]
struct Cli {
    /// Working directory to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Bucket equivalent-circle diameters (sqrt of area) instead of areas.
    /// Forces the output type to particle count
    #[arg(short = 'p', long = "diameter")]
    diameter: bool,

    /// Output type: 0 area-%, 1 absolute size, 2 particle count
    #[arg(short = 'o', long = "output-type", default_value = "0")]
    output_type: u8,

    /// Fallback scale in nm/px for images without embedded metadata
    #[arg(long)]
    scale: Option<f64>,

    /// Include the fullSum series in the plot script
    #[arg(short = 's', long = "sum-plot")]
    sum_plot: bool,

    /// Skip writing the gnuplot script
    #[arg(short = 'g', long = "no-plot")]
    no_plot: bool,

    /// Terminal report format
    #[arg(long, default_value = "text")]
    format: ReportFormat,

    /// Show debug output
    #[arg(short = 'd', long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = OutputMode::from_code(cli.output_type).unwrap_or_else(|| {
        tracing::warn!(
            "Output type {} is undefined, resetting to area-%",
            cli.output_type
        );
        OutputMode::AreaPercent
    });
    let sizing = if cli.diameter {
        SizingMode::Diameter
    } else {
        SizingMode::Area
    };
    let config = AnalysisConfig::builder()
        .sizing(sizing)
        .output(output)
        .fallback_scale(cli.scale)
        .build()
        .context("Invalid analysis configuration")?;

    eprintln!("Searching {} for image groups...", cli.path.display());
    let discovery = DiscoveryConfig::builder()
        .root(cli.path.clone())
        .build()
        .context("Invalid discovery configuration")?;
    let groups = FolderScanner::new()
        .discover(&discovery)
        .context("Discovery failed")?;
    if groups.is_empty() {
        bail!(
            "No image groups found under {}. Expected scale-named subfolders \
             (400nm, ...) or images with embedded scale metadata.",
            cli.path.display()
        );
    }

    let mut produced = 0;
    for group in &groups {
        eprintln!("Analyzing {}...", group.dir.display());
        let loaded = load_inputs(group, config.fallback_scale);

        match process_group(&group.name, loaded.inputs, &config) {
            Ok(mut report) => {
                report.warnings.extend(group.warnings.iter().cloned());
                report.warnings.extend(loaded.warnings);

                let formatter = TableFormatter::from_config(&config);
                formatter
                    .image_table(&report)
                    .write_to(&group.dir.join("results.csv"))?;
                formatter
                    .bucket_table(&report)
                    .write_to(&group.dir.join("mr_result.csv"))?;
                if !cli.no_plot {
                    let script = PlotScript::new(&report)
                        .include_sum(cli.sum_plot)
                        .render(&group.dir, &group.name);
                    let path = group.dir.join(format!("{}.gp", group.name));
                    std::fs::write(&path, script)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                }

                match cli.format {
                    ReportFormat::Text => print_report(&report),
                    ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                }
                produced += 1;
            }
            Err(err) => {
                tracing::warn!("Skipping folder {}: {err}", group.dir.display());
            }
        }
    }

    if produced == 0 {
        bail!("No folder produced output");
    }
    Ok(())
}

/// Print a folder report as a text summary.
fn print_report(report: &FolderReport) {
    let unit = match report.sizing {
        SizingMode::Diameter => "nm",
        SizingMode::Area => "nm²",
    };

    println!();
    println!("{}", "─".repeat(70));
    println!(" Pore Size Distribution - {}", report.folder);
    println!("{}", "─".repeat(70));
    println!(
        " {} images, {} pores in buckets",
        report.summary.image_count,
        report.total_count()
    );
    println!();

    let max_percent = report
        .summary
        .buckets
        .iter()
        .map(|b| b.mean_area_percent)
        .fold(0.0f64, f64::max)
        .max(f64::MIN_POSITIVE);
    for bucket in report.summary.buckets.iter().skip(1) {
        let bar_len = (bucket.mean_area_percent / max_percent * 30.0) as usize;
        println!(
            "   ≤{:<9} {unit} {:>7} x {:>10.5} Area-%  {}",
            bucket.boundary,
            bucket.count,
            bucket.mean_area_percent,
            "█".repeat(bar_len)
        );
    }
    println!();
    println!(
        " Cumulative: {:.5} Area-%",
        report
            .summary
            .buckets
            .last()
            .map(|b| b.cumulative_percent)
            .unwrap_or(0.0)
    );

    let warning_count = report.warnings.len()
        + report
            .images
            .iter()
            .map(|i| i.warnings.len())
            .sum::<usize>();
    if warning_count > 0 {
        println!(" {warning_count} warning(s) during analysis");
    }
    println!();
}

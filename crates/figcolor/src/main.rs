//! figcolor: find the triangles, squares and circles in an image, fill
//! them with color and write their names on them.
//!
//! Figures are the regions brighter than the grayscale threshold. The
//! colored copy is written next to the input unless `--output` says
//! otherwise.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin figcolor -- -i shapes.png [-u] [-t 100] [-a 150]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use figcolor_pipeline::diagnostics::{Clock, process_staged_with_diagnostics};
use figcolor_pipeline::{
    ColoringMode, ColorizeConfig, ContourRetrieval, ShapeLabel, StagedResult, decode,
};

/// Detect simple figures in an image, color them and label them.
#[derive(Parser, Debug)]
#[command(name = "figcolor", version, allow_negative_numbers = true)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    #[arg(short = 'i', long)]
    image_path: PathBuf,

    /// Give every figure its own color instead of one color per shape.
    #[arg(short = 'u', long)]
    unique_colors: bool,

    /// Grayscale threshold (0-255); brighter pixels belong to figures.
    #[arg(short = 't', long, default_value_t = ColorizeConfig::DEFAULT_THRESHOLD)]
    grayscale_threshold: i32,

    /// Perimeter divisor for polygon approximation; larger keeps more vertices.
    #[arg(short = 'a', long, default_value_t = ColorizeConfig::DEFAULT_APPROXIMATION_ACCURACY)]
    approx_accuracy: i32,

    /// Where to write the colored image [default: <stem>_colored.png next to the input].
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Only outline top-level figures; ignore holes and anything inside them.
    #[arg(long)]
    external_only: bool,

    /// Print per-stage timing and counts to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON to stdout instead of the text report.
    #[arg(long)]
    json: bool,

    /// Full config as a JSON string.
    ///
    /// When provided, all other parameter flags are ignored. The JSON
    /// must be a valid `ColorizeConfig` serialization; missing fields
    /// take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`ColorizeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<ColorizeConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(ColorizeConfig {
        coloring: if cli.unique_colors {
            ColoringMode::Unique
        } else {
            ColoringMode::ByShape
        },
        threshold: cli.grayscale_threshold,
        approximation_accuracy: cli.approx_accuracy,
        retrieval: if cli.external_only {
            ContourRetrieval::External
        } else {
            ContourRetrieval::Tree
        },
    })
}

/// `<dir>/<stem>_colored.png` for an input at `<dir>/<stem>.<ext>`.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("figures");
    input.with_file_name(format!("{stem}_colored.png"))
}

/// Where configuration warnings are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WarningSink {
    Stdout,
    Stderr,
}

/// Warnings normally go to stdout, but `--json` reserves stdout for the
/// diagnostics document.
const fn warning_sink(cli: &Cli) -> WarningSink {
    if cli.json {
        WarningSink::Stderr
    } else {
        WarningSink::Stdout
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    // Reject unusable parameters before reading anything.
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    let sink = warning_sink(&cli);
    for warning in config.warnings() {
        match sink {
            WarningSink::Stdout => println!("Warning: {warning}"),
            WarningSink::Stderr => eprintln!("Warning: {warning}"),
        }
    }

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let image = match decode::decode_rgb(&image_bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({}x{})",
        cli.image_path.display(),
        image.width(),
        image.height(),
    );

    let staged = if cli.diagnostics || cli.json {
        match process_staged_with_diagnostics(&image, &config, &StdClock) {
            Ok((staged, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    eprintln!("{}", diagnostics.report());
                }
                staged
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        match figcolor_pipeline::process_staged(&image, &config) {
            Ok(staged) => staged,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    eprintln!("{}", summarize(&staged));

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.image_path));
    match staged.output.save(&output_path) {
        Ok(()) => {
            eprintln!("Colored image written to {}", output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", output_path.display());
            ExitCode::FAILURE
        }
    }
}

/// One-line tally of the detected figures.
fn summarize(staged: &StagedResult) -> String {
    let counts: Vec<String> = ShapeLabel::ALL
        .iter()
        .map(|&label| format!("{}: {}", label, staged.count_label(label)))
        .collect();
    format!(
        "Figures: {}  ({})",
        staged.figures.len(),
        counts.join(", ")
    )
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

//! sdfield-bench: CLI tool for distance-field parameter experimentation
//! and diagnostics.
//!
//! Loads an image, converts it to 8-bit coverage, renders a signed
//! distance field, and prints detailed per-stage diagnostics. Useful
//! for:
//!
//! - Tuning the spread radius against glyph size
//! - Measuring per-stage durations to identify bottlenecks
//! - Inspecting the rendered field as a grayscale PNG
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin sdfield-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sdfield::diagnostics::RenderDiagnostics;
use sdfield::{
    HeapAllocator, PixelFormat, RasterParams, SourceBitmap, TargetBitmap,
    render_with_diagnostics,
};

/// Distance-field parameter experimentation and diagnostics for sdfield.
///
/// Renders a signed distance field from a given image with configurable
/// parameters and prints detailed per-stage timing and count
/// diagnostics.
#[derive(Parser)]
#[command(name = "sdfield-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG). Converted to 8-bit
    /// grayscale coverage before rendering.
    image_path: PathBuf,

    /// Spread radius in pixels.
    #[arg(long, default_value_t = sdfield::SPREAD_DEFAULT)]
    spread: i32,

    /// Read source rows (and write output rows) bottom-up.
    #[arg(long)]
    flip_y: bool,

    /// Extra padding around the source, in pixels per side. Defaults to
    /// the spread so the field has room to decay.
    #[arg(long)]
    pad: Option<u32>,

    /// Write the rendered field to this path as a grayscale PNG.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full render parameters as a JSON string.
    ///
    /// When provided, `--spread` and `--flip-y` are ignored. The JSON
    /// must be a valid `RasterParams` serialization.
    #[arg(long)]
    params_json: Option<String>,
}

/// Build [`RasterParams`] from CLI arguments.
fn params_from_cli(cli: &Cli) -> Result<RasterParams, String> {
    if let Some(ref json) = cli.params_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --params-json: {e}"));
    }
    Ok(RasterParams {
        spread: cli.spread,
        flip_y: cli.flip_y,
        ..RasterParams::default()
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let params = match params_from_cli(&cli) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let coverage = match image::open(&cli.image_path) {
        Ok(img) => img.into_luma8(),
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let pad = cli.pad.unwrap_or_else(|| params.spread.unsigned_abs());
    let target_width = coverage.width() + 2 * pad;
    let target_height = coverage.height() + 2 * pad;

    eprintln!(
        "Image: {} ({}x{} coverage, {}x{} output)",
        cli.image_path.display(),
        coverage.width(),
        coverage.height(),
        target_width,
        target_height,
    );
    eprintln!("Params: {params:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let source = match SourceBitmap::new(
        coverage.width(),
        coverage.height(),
        coverage.width(),
        PixelFormat::Gray,
        coverage.as_raw(),
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Source error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut field = vec![0_u8; (target_width as usize) * (target_height as usize)];

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let mut target = match TargetBitmap::new(
            target_width,
            target_height,
            target_width,
            &mut field,
        ) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Target error: {e}");
                return ExitCode::FAILURE;
            }
        };

        match render_with_diagnostics(&source, &mut target, &params, &HeapAllocator) {
            Ok(diagnostics) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }
                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Render error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Write the field from the last run.
    if let Some(ref out_path) = cli.out {
        match image::GrayImage::from_raw(target_width, target_height, field) {
            Some(img) => match img.save(out_path) {
                Ok(()) => eprintln!("Field written to {}", out_path.display()),
                Err(e) => {
                    eprintln!("Error writing {}: {e}", out_path.display());
                    return ExitCode::FAILURE;
                }
            },
            None => {
                eprintln!("Internal error: field buffer size mismatch");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[RenderDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<12} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(26));

    let stages: &[(&str, fn(&RenderDiagnostics) -> std::time::Duration)] = &[
        ("Seed", |d| d.seed.duration),
        ("Sweep", |d| d.sweep.duration),
        ("Encode", |d| d.encode.duration),
    ];

    for (name, extract) in stages {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| extract(d).as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<12} {stage_mean:>10.3}ms");
    }
}

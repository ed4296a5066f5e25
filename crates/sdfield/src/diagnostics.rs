//! Render diagnostics: timing and counters for each pipeline stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! algorithm tuning and parameter experimentation. Every call to
//! [`render_with_diagnostics`] collects them alongside the output
//! bitmap.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::bitmap::{SourceBitmap, TargetBitmap};
use crate::map::GridAllocator;
use crate::pipeline::Pipeline;
use crate::types::{RasterParams, SdfError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source, injectable so tests can run without real
/// sleeps.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The default [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Diagnostics collected from a single render call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderDiagnostics {
    /// Stage 0: decode and edge seeding.
    pub seed: StageDiagnostics,
    /// Stage 1: distance propagation.
    pub sweep: StageDiagnostics,
    /// Stage 2: signed-distance encoding.
    pub encode: StageDiagnostics,
    /// Total wall-clock duration of the entire render (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: RenderSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Decode and seeding metrics.
    Seed {
        /// Source bitmap width in pixels.
        source_width: u32,
        /// Source bitmap height in pixels.
        source_height: u32,
        /// Working grid width in cells.
        grid_width: u32,
        /// Working grid height in cells.
        grid_height: u32,
        /// Cells seeded with a sub-pixel boundary estimate.
        edge_cells: u64,
    },
    /// Propagation metrics.
    Sweep {
        /// Cells improved during the forward sweep.
        forward_updates: u64,
        /// Cells improved during the backward sweep.
        backward_updates: u64,
    },
    /// Encoding metrics.
    Encode {
        /// Spread radius in pixels.
        spread: i32,
        /// Cells that saturated at the spread.
        clamped_cells: u64,
        /// Total cells encoded.
        total_cells: u64,
    },
}

/// High-level summary counts for the entire render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSummary {
    /// Output bitmap width in pixels.
    pub output_width: u32,
    /// Output bitmap height in pixels.
    pub output_height: u32,
    /// Total output cell count.
    pub cell_count: u64,
    /// Cells seeded on the coverage boundary.
    pub edge_cells: u64,
    /// Cells that saturated at the spread.
    pub clamped_cells: u64,
}

impl RenderDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Render Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Output: {}x{} ({} cells)",
            self.summary.output_width, self.summary.output_height, self.summary.cell_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Seed", &self.seed),
            ("Sweep", &self.sweep),
            ("Encode", &self.encode),
        ];
        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<12} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Edge cells: {}  |  Clamped cells: {}",
            self.summary.edge_cells, self.summary.clamped_cells,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Seed {
            source_width,
            source_height,
            grid_width,
            grid_height,
            edge_cells,
        } => {
            format!(
                "{source_width}x{source_height} -> {grid_width}x{grid_height}, {edge_cells} edge cells",
            )
        }
        StageMetrics::Sweep {
            forward_updates,
            backward_updates,
        } => {
            format!("fwd={forward_updates} bwd={backward_updates}")
        }
        StageMetrics::Encode {
            spread,
            clamped_cells,
            total_cells,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let pct = if *total_cells > 0 {
                *clamped_cells as f64 / *total_cells as f64 * 100.0
            } else {
                0.0
            };
            format!("spread={spread} clamped={clamped_cells} ({pct:.1}%)")
        }
    }
}

/// Render with per-stage timing, using the monotonic system clock.
///
/// # Errors
///
/// Returns every error [`crate::render_with`] reports.
pub fn render_with_diagnostics(
    source: &SourceBitmap<'_>,
    target: &mut TargetBitmap<'_>,
    params: &RasterParams,
    allocator: &dyn GridAllocator,
) -> Result<RenderDiagnostics, SdfError> {
    render_timed(source, target, params, allocator, &MonotonicClock)
}

/// Render with per-stage timing from an injected clock.
///
/// # Errors
///
/// Returns every error [`crate::render_with`] reports.
pub fn render_timed(
    source: &SourceBitmap<'_>,
    target: &mut TargetBitmap<'_>,
    params: &RasterParams,
    allocator: &dyn GridAllocator,
    clock: &dyn Clock,
) -> Result<RenderDiagnostics, SdfError> {
    let dims = target.dimensions();
    let start = clock.now();

    let seeded = Pipeline::new(*source, *params).seed(dims, allocator)?;
    let after_seed = clock.now();

    let propagated = seeded.propagate();
    let after_sweep = clock.now();

    let stats = propagated.encode(target)?.into_stats();
    let end = clock.now();

    let cell_count = u64::from(dims.width) * u64::from(dims.height);
    Ok(RenderDiagnostics {
        seed: StageDiagnostics {
            duration: after_seed.duration_since(start),
            metrics: StageMetrics::Seed {
                source_width: source.width(),
                source_height: source.height(),
                grid_width: dims.width,
                grid_height: dims.height,
                edge_cells: stats.seed.edge_cells,
            },
        },
        sweep: StageDiagnostics {
            duration: after_sweep.duration_since(after_seed),
            metrics: StageMetrics::Sweep {
                forward_updates: stats.sweep.forward_updates,
                backward_updates: stats.sweep.backward_updates,
            },
        },
        encode: StageDiagnostics {
            duration: end.duration_since(after_sweep),
            metrics: StageMetrics::Encode {
                spread: params.spread,
                clamped_cells: stats.encode.clamped_cells,
                total_cells: cell_count,
            },
        },
        total_duration: end.duration_since(start),
        summary: RenderSummary {
            output_width: dims.width,
            output_height: dims.height,
            cell_count,
            edge_cells: stats.seed.edge_cells,
            clamped_cells: stats.encode.clamped_cells,
        },
    })
}

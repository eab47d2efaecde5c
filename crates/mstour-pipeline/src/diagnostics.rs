//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Timestamps come from a caller-supplied [`Clock`], so this crate never
//! touches the system clock itself. Durations are serialized as
//! fractional seconds (`f64`) for JSON compatibility, since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{PipelineConfig, PipelineError, Point, Solution, WalkState};

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

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: complete-graph construction.
    pub build_edges: StageDiagnostics,
    /// Stage 2: sorting candidate edges.
    pub sort: StageDiagnostics,
    /// Stage 3: Kruskal's algorithm.
    pub spanning_tree: StageDiagnostics,
    /// Stage 4: tour walk.
    pub walk: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary across all stages.
    pub summary: PipelineSummary,
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
    /// Complete-graph construction.
    BuildEdges {
        /// Number of input points.
        point_count: usize,
        /// Number of candidate edges (`n * (n - 1) / 2`).
        edge_count: usize,
    },
    /// Sorting by weight.
    Sort {
        /// Number of edges sorted.
        edge_count: usize,
        /// Lightest edge weight (0 with no edges).
        min_weight: f32,
        /// Heaviest edge weight (0 with no edges).
        max_weight: f32,
    },
    /// Kruskal's algorithm.
    SpanningTree {
        /// Termination rule (e.g. `"edge-count"`).
        termination: String,
        /// Candidate edges available.
        candidate_count: usize,
        /// Candidate edges inspected before stopping.
        examined_count: usize,
        /// Edges accepted into the tree.
        tree_edge_count: usize,
        /// Sum of tree edge weights.
        total_weight: f64,
    },
    /// Tour walk.
    Walk {
        /// Edge crossings, including the seed.
        steps: usize,
        /// Vertices in the tour.
        tour_len: usize,
        /// Terminal walk state (e.g. `"done"`).
        state: String,
        /// Closed-cycle tour length, if computable.
        tour_length: Option<f64>,
    },
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of input points.
    pub point_count: usize,
    /// Total MST weight.
    pub mst_weight: f64,
    /// Closed-cycle tour length.
    pub tour_length: f64,
    /// How the walk ended.
    pub walk_state: WalkState,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Points: {}", self.summary.point_count));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Build Edges", &self.build_edges),
            ("Sort", &self.sort),
            ("Spanning Tree", &self.spanning_tree),
            ("Walk", &self.walk),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "MST weight: {:.3}  |  Tour length: {:.3}  |  Walk: {}",
            self.summary.mst_weight, self.summary.tour_length, self.summary.walk_state,
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
        StageMetrics::BuildEdges {
            point_count,
            edge_count,
        } => format!("{point_count} points -> {edge_count} edges"),
        StageMetrics::Sort {
            edge_count,
            min_weight,
            max_weight,
        } => format!("{edge_count} edges, weights {min_weight:.3}..{max_weight:.3}"),
        StageMetrics::SpanningTree {
            termination,
            candidate_count,
            examined_count,
            tree_edge_count,
            total_weight,
        } => format!(
            "{termination}: examined {examined_count}/{candidate_count}, \
             {tree_edge_count} edges, weight={total_weight:.3}",
        ),
        StageMetrics::Walk {
            steps,
            tour_len,
            state,
            tour_length,
        } => {
            let length = tour_length.map_or_else(|| "n/a".to_string(), |l| format!("{l:.3}"));
            format!("{state}: {steps} steps, {tour_len} vertices, length={length}")
        }
    }
}

/// Run the full pipeline, timing each stage with `clock`.
///
/// Produces the same [`Solution`] as [`crate::process`] plus
/// per-stage [`PipelineDiagnostics`].
///
/// # Errors
///
/// Returns the first [`PipelineError`] raised by any stage.
pub fn process_with_diagnostics<C: Clock>(
    points: &[Point],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(Solution, PipelineDiagnostics), PipelineError> {
    let start = clock.now();

    let t = clock.now();
    let built = Pipeline::new(points.to_vec(), config.clone()).build_edges()?;
    let build_edges = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: built.stage_metrics(),
    };

    let t = clock.now();
    let sorted = built.sort();
    let sort = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: sorted.stage_metrics(),
    };

    let t = clock.now();
    let spanned = sorted.span()?;
    let spanning_tree = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: spanned.stage_metrics(),
    };

    let t = clock.now();
    let walked = spanned.walk()?;
    let walk = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: walked.stage_metrics(),
    };

    let summary = PipelineSummary {
        point_count: points.len(),
        mst_weight: walked.mst().total_weight(),
        tour_length: walked.tour_length()?,
        walk_state: walked.walk_state(),
    };
    let total_duration = clock.elapsed(&start);

    Ok((
        walked.into_result(),
        PipelineDiagnostics {
            build_edges,
            sort,
            spanning_tree,
            walk,
            total_duration,
            summary,
        },
    ))
}

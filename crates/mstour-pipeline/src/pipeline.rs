//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use mstour_pipeline::{Pipeline, PipelineConfig, PipelineError, Point};
//! # fn run(points: Vec<Point>) -> Result<(), PipelineError> {
//! let walked = Pipeline::new(points, PipelineConfig::default())
//!     .build_edges()?
//!     .sort()
//!     .span()?
//!     .walk()?;
//!
//! println!("tour: {:?}", walked.tour().vertices());
//! let solution = walked.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages). The caller can inspect the current
//! stage's output via accessor methods at any point.
//!
//! # Memory
//!
//! [`EdgesBuilt`] and [`EdgesSorted`] hold all `n * (n - 1) / 2`
//! candidate edges. [`EdgesSorted::span`] drops them once the tree is
//! built, so later stages only carry `n - 1` edges.

use crate::diagnostics::StageMetrics;
use crate::edge_store::EdgeStore;
use crate::mst::MstBuilder;
use crate::tour::{TourWalker, WalkOutcome};
use crate::types::{Edge, Mst, PipelineConfig, PipelineError, Point, Solution, Tour, WalkState};

/// Entry point for the incremental pipeline.
///
/// `Pipeline::new` returns the [`Pending`] stage.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over `points` with the given configuration.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(points: Vec<Point>, config: PipelineConfig) -> Pending {
        Pending { config, points }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`build_edges`](Self::build_edges) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .build_edges() to continue"]
pub struct Pending {
    config: PipelineConfig,
    points: Vec<Point>,
}

impl Pending {
    /// The input points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Build the complete graph and advance to [`EdgesBuilt`].
    ///
    /// # Errors
    ///
    /// See [`EdgeStore::build_complete`].
    pub fn build_edges(self) -> Result<EdgesBuilt, PipelineError> {
        let store = EdgeStore::build_complete(&self.points)?;
        Ok(EdgesBuilt {
            config: self.config,
            points: self.points,
            store,
        })
    }
}

// ───────────────────────── Stage 1: EdgesBuilt ───────────────────────

/// Pipeline state after building the complete graph.
///
/// Edges are in construction order. Call [`sort`](Self::sort) to
/// advance.
#[must_use = "pipeline stages are consumed by advancing; call .sort() to continue"]
pub struct EdgesBuilt {
    config: PipelineConfig,
    points: Vec<Point>,
    store: EdgeStore,
}

impl EdgesBuilt {
    /// The candidate edges in construction order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        self.store.edges()
    }

    /// Sort the candidate edges and advance to [`EdgesSorted`].
    pub fn sort(mut self) -> EdgesSorted {
        self.store.sort_ascending();
        EdgesSorted {
            config: self.config,
            points: self.points,
            store: self.store,
        }
    }
}

// ───────────────────────── Stage 2: EdgesSorted ──────────────────────

/// Pipeline state after sorting candidate edges by weight.
///
/// Call [`span`](Self::span) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .span() to continue"]
pub struct EdgesSorted {
    config: PipelineConfig,
    points: Vec<Point>,
    store: EdgeStore,
}

impl EdgesSorted {
    /// The candidate edges in ascending weight order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        self.store.edges()
    }

    /// Run Kruskal's algorithm and advance to [`Spanned`].
    ///
    /// # Errors
    ///
    /// See [`MstBuilder::build`].
    pub fn span(self) -> Result<Spanned, PipelineError> {
        let candidate_count = self.store.len();
        let tree = MstBuilder::from_config(&self.config)
            .build(self.store.edges(), self.store.point_count())?;
        Ok(Spanned {
            config: self.config,
            points: self.points,
            mst: tree.mst,
            candidate_count,
            examined: tree.examined,
        })
    }
}

// ───────────────────────── Stage 3: Spanned ──────────────────────────

/// Pipeline state after building the minimum spanning tree.
///
/// Call [`walk`](Self::walk) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .walk() to continue"]
pub struct Spanned {
    config: PipelineConfig,
    points: Vec<Point>,
    mst: Mst,
    candidate_count: usize,
    examined: usize,
}

impl Spanned {
    /// The minimum spanning tree.
    #[must_use]
    pub const fn mst(&self) -> &Mst {
        &self.mst
    }

    /// How many candidate edges Kruskal's algorithm inspected.
    #[must_use]
    pub const fn examined(&self) -> usize {
        self.examined
    }

    /// Walk the tree and advance to [`Walked`], the final stage.
    ///
    /// # Errors
    ///
    /// See [`TourWalker::new`] and [`TourWalker::step`].
    pub fn walk(mut self) -> Result<Walked, PipelineError> {
        let n = self.mst.vertex_count();
        let outcome = TourWalker::new(self.mst.edges_mut(), n)?.run()?;
        Ok(Walked {
            points: self.points,
            mst: self.mst,
            outcome,
        })
    }
}

// ───────────────────────── Stage 4: Walked ───────────────────────────

/// Pipeline state after the tour walk, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`Solution`].
#[must_use = "call .into_result() to extract the Solution"]
pub struct Walked {
    points: Vec<Point>,
    mst: Mst,
    outcome: WalkOutcome,
}

impl Walked {
    /// The spanning tree, with traversal counts left by the walk.
    #[must_use]
    pub const fn mst(&self) -> &Mst {
        &self.mst
    }

    /// The visiting order.
    #[must_use]
    pub const fn tour(&self) -> &Tour {
        &self.outcome.tour
    }

    /// How the walk ended.
    #[must_use]
    pub const fn walk_state(&self) -> WalkState {
        self.outcome.state
    }

    /// Closed-cycle length of the tour over the input points.
    ///
    /// # Errors
    ///
    /// See [`Tour::length`].
    pub fn tour_length(&self) -> Result<f64, PipelineError> {
        self.outcome.tour.length(&self.points)
    }

    /// Consume the pipeline and return the [`Solution`].
    #[must_use]
    pub fn into_result(self) -> Solution {
        Solution {
            mst: self.mst,
            tour: self.outcome.tour,
            walk_state: self.outcome.state,
        }
    }
}

// ─────────────────────────── PipelineStage ───────────────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 5;

/// Trait implemented by every pipeline stage.
///
/// Gives each stage a stable name and index, and the metrics describing
/// the work done to reach it.
pub trait PipelineStage {
    /// Human-readable name of this stage (e.g. `"sort"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `4` for
    /// Walked).
    const INDEX: usize;

    /// Stage-specific metrics for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage which has not
    /// yet performed any processing.
    fn metrics(&self) -> Option<StageMetrics>;
}

impl PipelineStage for Pending {
    const NAME: &str = "points";
    const INDEX: usize = 0;

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }
}

impl PipelineStage for EdgesBuilt {
    const NAME: &str = "build_edges";
    const INDEX: usize = 1;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }
}

impl PipelineStage for EdgesSorted {
    const NAME: &str = "sort";
    const INDEX: usize = 2;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }
}

impl PipelineStage for Spanned {
    const NAME: &str = "spanning_tree";
    const INDEX: usize = 3;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }
}

impl PipelineStage for Walked {
    const NAME: &str = "walk";
    const INDEX: usize = 4;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }
}

// ───────────────────────── Stage metrics ─────────────────────────────

impl EdgesBuilt {
    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::BuildEdges {
            point_count: self.store.point_count(),
            edge_count: self.store.len(),
        }
    }
}

impl EdgesSorted {
    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        let edges = self.store.edges();
        StageMetrics::Sort {
            edge_count: edges.len(),
            min_weight: edges.first().map_or(0.0, Edge::weight),
            max_weight: edges.last().map_or(0.0, Edge::weight),
        }
    }
}

impl Spanned {
    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::SpanningTree {
            termination: self.config.termination.to_string(),
            candidate_count: self.candidate_count,
            examined_count: self.examined,
            tree_edge_count: self.mst.len(),
            total_weight: self.mst.total_weight(),
        }
    }
}

impl Walked {
    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::Walk {
            steps: self.outcome.steps,
            tour_len: self.outcome.tour.len(),
            state: self.outcome.state.to_string(),
            tour_length: self.tour_length().ok(),
        }
    }
}

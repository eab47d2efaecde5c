//! mstour-pipeline: Pure MST-walk TSP approximation (sans-IO).
//!
//! Turns a set of 2D points into a visiting order through:
//! complete graph -> sort by length -> Kruskal MST -> tree walk.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! point slices and returns structured data. Parsing instance files and
//! writing results lives in `mstour-format`.

pub mod diagnostics;
pub mod disjoint_set;
pub mod edge_store;
pub mod mst;
pub mod pipeline;
pub mod tour;
pub mod types;

pub use disjoint_set::DisjointSet;
pub use edge_store::EdgeStore;
pub use mst::{MstBuilder, SpanningTree};
pub use pipeline::Pipeline;
pub use tour::{TourWalker, WalkOutcome};
pub use types::{
    Edge, ErrorKind, Mst, PipelineConfig, PipelineError, Point, Solution, Termination, Tour,
    WalkState,
};

/// Run the full pipeline.
///
/// # Pipeline steps
///
/// 1. Build all `n * (n - 1) / 2` edges of the complete graph
/// 2. Sort edges by ascending length
/// 3. Kruskal's algorithm, stopping per `config.termination`
/// 4. Walk the tree into a visiting order
///
/// A walk that ends before visiting every point is not an error: the
/// partial tour is returned with [`WalkState::Stuck`].
///
/// # Errors
///
/// Returns [`PipelineError::NonFiniteCoordinate`] for NaN or infinite
/// coordinates, and [`PipelineError::TooManyPoints`] when the complete
/// graph cannot be stored. Other variants signal broken internal
/// invariants; see [`PipelineError::kind`].
pub fn process(points: &[Point], config: &PipelineConfig) -> Result<Solution, PipelineError> {
    // 1-2. Complete graph, sorted.
    let mut store = EdgeStore::build_complete(points)?;
    store.sort_ascending();

    // 3. Spanning tree.
    let SpanningTree { mut mst, .. } =
        MstBuilder::from_config(config).build(store.edges(), points.len())?;
    drop(store);

    // 4. Tour.
    let outcome = tour::walk(&mut mst)?;

    Ok(Solution {
        mst,
        tour: outcome.tour,
        walk_state: outcome.state,
    })
}

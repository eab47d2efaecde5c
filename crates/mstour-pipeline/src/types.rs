//! Shared types for the mstour pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D point in the plane.
///
/// Points are identified by their position in the input slice; the
/// pipeline never reorders or mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An undirected, weighted edge between two distinct vertices.
///
/// The traversal counter records how often the tour walker crossed the
/// edge. A tree edge is crossed at most twice (down and back up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EdgeRecord")]
pub struct Edge {
    a: usize,
    b: usize,
    weight: f32,
    traversals: u8,
}

impl Edge {
    /// Maximum number of times a tree edge may be crossed.
    pub const MAX_TRAVERSALS: u8 = 2;

    /// Create an untraversed edge.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SelfLoop`] if `a == b`.
    pub const fn new(a: usize, b: usize, weight: f32) -> Result<Self, PipelineError> {
        if a == b {
            return Err(PipelineError::SelfLoop { vertex: a });
        }
        Ok(Self {
            a,
            b,
            weight,
            traversals: 0,
        })
    }

    /// First endpoint.
    #[must_use]
    pub const fn a(&self) -> usize {
        self.a
    }

    /// Second endpoint.
    #[must_use]
    pub const fn b(&self) -> usize {
        self.b
    }

    /// Euclidean length of the edge.
    #[must_use]
    pub const fn weight(&self) -> f32 {
        self.weight
    }

    /// How many times the tour walker has crossed this edge.
    #[must_use]
    pub const fn traversals(&self) -> u8 {
        self.traversals
    }

    /// Whether `vertex` is one of the endpoints.
    #[must_use]
    pub const fn touches(&self, vertex: usize) -> bool {
        self.a == vertex || self.b == vertex
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not an
    /// endpoint.
    #[must_use]
    pub const fn other(&self, vertex: usize) -> Option<usize> {
        if self.a == vertex {
            Some(self.b)
        } else if self.b == vertex {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether the edge can still be crossed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.traversals < Self::MAX_TRAVERSALS
    }

    /// Record one crossing of this edge.
    ///
    /// `index` is the edge's position in its list and only feeds the
    /// error report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TraversalOverflow`] if the edge was
    /// already crossed [`MAX_TRAVERSALS`](Self::MAX_TRAVERSALS) times.
    pub const fn traverse(&mut self, index: usize) -> Result<(), PipelineError> {
        if !self.is_available() {
            return Err(PipelineError::TraversalOverflow { edge: index });
        }
        self.traversals += 1;
        Ok(())
    }
}

/// Serialized form of [`Edge`], checked again on the way in.
#[derive(Deserialize)]
struct EdgeRecord {
    a: usize,
    b: usize,
    weight: f32,
    traversals: u8,
}

impl TryFrom<EdgeRecord> for Edge {
    type Error = PipelineError;

    fn try_from(record: EdgeRecord) -> Result<Self, Self::Error> {
        let mut edge = Self::new(record.a, record.b, record.weight)?;
        edge.traversals = record.traversals;
        Ok(edge)
    }
}

/// A minimum spanning tree over `vertex_count` points.
///
/// Edges are stored in acceptance order, which is ascending weight
/// order when produced by Kruskal's algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MstRecord")]
pub struct Mst {
    vertex_count: usize,
    edges: Vec<Edge>,
    total_weight: f64,
}

impl Mst {
    /// Assemble a spanning tree from its accepted edges.
    ///
    /// The total weight is the sum of the edge weights, accumulated in
    /// `f64`.
    #[must_use]
    pub fn new(vertex_count: usize, edges: Vec<Edge>) -> Self {
        let total_weight = edges.iter().map(|e| f64::from(e.weight())).sum();
        Self {
            vertex_count,
            edges,
            total_weight,
        }
    }

    /// Number of vertices the tree spans.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// The tree edges in acceptance order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Mutable access to the edges, for traversal bookkeeping.
    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Number of tree edges.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the tree has no edges (`vertex_count <= 1`).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of all edge weights.
    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// The edges as `(a, b, weight)` triples, in order.
    pub fn triples(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.edges.iter().map(|e| (e.a(), e.b(), e.weight()))
    }
}

/// Serialized form of [`Mst`]. The stored total is ignored and
/// recomputed from the edges.
#[derive(Deserialize)]
struct MstRecord {
    vertex_count: usize,
    edges: Vec<Edge>,
}

impl TryFrom<MstRecord> for Mst {
    type Error = PipelineError;

    fn try_from(record: MstRecord) -> Result<Self, Self::Error> {
        if let Some(index) = record
            .edges
            .iter()
            .flat_map(|e| [e.a(), e.b()])
            .find(|&v| v >= record.vertex_count)
        {
            return Err(PipelineError::IndexOutOfRange {
                index,
                len: record.vertex_count,
            });
        }
        Ok(Self::new(record.vertex_count, record.edges))
    }
}

/// An ordered visiting sequence over vertex indices.
///
/// A complete tour is a permutation of `0..n`; the consumer closes it
/// into a cycle by returning to the first vertex.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Create a tour from a vertex sequence.
    #[must_use]
    pub const fn new(vertices: Vec<usize>) -> Self {
        Self(vertices)
    }

    /// Returns `true` if the tour visits no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of vertices visited.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The visiting order.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    /// Consumes the tour and returns the underlying vertex sequence.
    #[must_use]
    pub fn into_vertices(self) -> Vec<usize> {
        self.0
    }

    /// Whether the tour visits every vertex of `0..n` exactly once.
    #[must_use]
    pub fn is_permutation_of(&self, n: usize) -> bool {
        if self.0.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &v in &self.0 {
            match seen.get_mut(v) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Length of the closed cycle through `points` in tour order.
    ///
    /// Includes the closing leg from the last vertex back to the first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IndexOutOfRange`] if the tour refers to
    /// a vertex outside `points`.
    pub fn length(&self, points: &[Point]) -> Result<f64, PipelineError> {
        let lookup = |v: usize| {
            points.get(v).copied().ok_or(PipelineError::IndexOutOfRange {
                index: v,
                len: points.len(),
            })
        };
        let mut total = 0.0;
        for (i, &v) in self.0.iter().enumerate() {
            let next = self.0[(i + 1) % self.0.len()];
            total += f64::from(lookup(v)?.distance(lookup(next)?));
        }
        Ok(total)
    }
}

/// Progress of the tour walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkState {
    /// The first tree edge has been crossed.
    Seeded,
    /// The walker is crossing tree edges.
    Advancing,
    /// Every vertex was visited and every tree edge crossed twice.
    Done,
    /// The walk ran out of crossable edges before visiting every
    /// vertex. The partial tour is still returned.
    Stuck,
}

impl WalkState {
    /// Whether the walk has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Stuck)
    }
}

impl fmt::Display for WalkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seeded => "seeded",
            Self::Advancing => "advancing",
            Self::Done => "done",
            Self::Stuck => "stuck",
        };
        f.write_str(name)
    }
}

/// When Kruskal's algorithm stops consuming candidate edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Termination {
    /// Stop once `n - 1` edges have been accepted.
    #[default]
    EdgeCount,
    /// Stop once every item shares a root with item 0, checked by an
    /// O(n) scan after each accepted edge.
    SpanningScan,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EdgeCount => "edge-count",
            Self::SpanningScan => "spanning-scan",
        };
        f.write_str(name)
    }
}

/// Configuration for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Early-termination rule for the spanning tree builder.
    pub termination: Termination,

    /// Whether the spanning tree builder checks that its input is
    /// sorted by ascending weight before consuming it.
    pub verify_sorted: bool,
}

impl PipelineConfig {
    /// Default termination rule.
    pub const DEFAULT_TERMINATION: Termination = Termination::EdgeCount;

    /// Default for [`verify_sorted`](Self::verify_sorted).
    pub const DEFAULT_VERIFY_SORTED: bool = true;
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            termination: Self::DEFAULT_TERMINATION,
            verify_sorted: Self::DEFAULT_VERIFY_SORTED,
        }
    }
}

/// Result of running the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// The minimum spanning tree, with traversal counts as left by the
    /// walk.
    pub mst: Mst,

    /// The visiting order derived from the tree.
    pub tour: Tour,

    /// Terminal state of the walk ([`WalkState::Done`] or
    /// [`WalkState::Stuck`]).
    pub walk_state: WalkState,
}

/// Broad classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The caller supplied input that breaks a documented precondition.
    Precondition,
    /// An algorithm reached a state its invariants rule out.
    Internal,
}

/// Errors that can occur during pipeline processing.
///
/// Every error aborts the computation. Use [`PipelineError::kind`] to
/// tell caller bugs from algorithm bugs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// A vertex index is outside the valid range.
    #[error("index {index} is out of range for {len} items")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of valid items.
        len: usize,
    },

    /// An edge would join a vertex to itself.
    #[error("edge endpoints must differ (both are {vertex})")]
    SelfLoop {
        /// The repeated endpoint.
        vertex: usize,
    },

    /// A point has a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },

    /// The complete graph over this many points cannot be stored.
    #[error("too many points for a complete graph: {count}")]
    TooManyPoints {
        /// Number of input points.
        count: usize,
    },

    /// The spanning tree builder was handed edges out of weight order.
    #[error("edges are not sorted by ascending weight at position {position}")]
    UnsortedEdges {
        /// Index of the first edge lighter than its predecessor.
        position: usize,
    },

    /// The candidate edges did not connect every vertex.
    #[error("spanning tree is incomplete: expected {expected} edges, found {found}")]
    IncompleteSpanningTree {
        /// `n - 1` for `n` vertices.
        expected: usize,
        /// Number of edges accepted.
        found: usize,
    },

    /// The tour walker was handed an edge that was already crossed.
    #[error("edge {edge} was already traversed {count} time(s) before the walk")]
    EdgeAlreadyTraversed {
        /// Index of the edge in the tree.
        edge: usize,
        /// Its traversal count on entry.
        count: u8,
    },

    /// A tree edge was crossed more than twice.
    #[error("edge {edge} would be traversed more than twice")]
    TraversalOverflow {
        /// Index of the edge in the tree.
        edge: usize,
    },

    /// A completed walk left a tree edge with fewer than two crossings.
    #[error("edge {edge} was traversed {count} time(s) in a completed walk, expected 2")]
    UnconsumedEdge {
        /// Index of the edge in the tree.
        edge: usize,
        /// Its final traversal count.
        count: u8,
    },
}

impl PipelineError {
    /// Classify the error as a precondition or internal violation.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::SelfLoop { .. }
            | Self::NonFiniteCoordinate { .. }
            | Self::TooManyPoints { .. }
            | Self::UnsortedEdges { .. }
            | Self::IncompleteSpanningTree { .. }
            | Self::EdgeAlreadyTraversed { .. } => ErrorKind::Precondition,
            Self::TraversalOverflow { .. } | Self::UnconsumedEdge { .. } => ErrorKind::Internal,
        }
    }
}

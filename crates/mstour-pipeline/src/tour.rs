//! Tour extraction by walking the spanning tree.
//!
//! The walker follows tree edges from vertex to vertex, crossing each
//! edge at most twice: once on the way down into a subtree and once on
//! the way back. Vertices are appended to the tour the first time they
//! are reached, so the return trips are shortcut in the final visiting
//! order.
//!
//! At every step, edges never crossed are preferred over edges crossed
//! once. This makes the walk a depth-first traversal: a subtree is
//! finished before the walker climbs back toward the seed.

use crate::types::{Edge, Mst, PipelineError, Tour, WalkState};

/// Result of a completed walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Vertices in first-visit order.
    pub tour: Tour,
    /// [`WalkState::Done`] or [`WalkState::Stuck`].
    pub state: WalkState,
    /// Number of edge crossings, including the seed.
    pub steps: usize,
}

/// Step-by-step walker over a tree's edge list.
///
/// Construction seeds the walk on the first edge. Call
/// [`step`](Self::step) until the state is terminal, or
/// [`run`](Self::run) to do that in one go.
#[derive(Debug)]
pub struct TourWalker<'a> {
    edges: &'a mut [Edge],
    vertex_count: usize,
    visited: Vec<bool>,
    tour: Vec<usize>,
    current: usize,
    cursor: usize,
    state: WalkState,
    steps: usize,
}

impl<'a> TourWalker<'a> {
    /// Validate the edges and seed the walk.
    ///
    /// With no vertices the walk is immediately [`WalkState::Done`]
    /// with an empty tour. With one vertex it is `Done` with tour
    /// `[0]`. With two or more vertices and no edges it is
    /// [`WalkState::Stuck`] with tour `[0]`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::IndexOutOfRange`] if an endpoint is not below
    ///   `vertex_count`.
    /// - [`PipelineError::EdgeAlreadyTraversed`] if an edge has a
    ///   non-zero traversal count.
    pub fn new(edges: &'a mut [Edge], vertex_count: usize) -> Result<Self, PipelineError> {
        for (i, e) in edges.iter().enumerate() {
            for v in [e.a(), e.b()] {
                if v >= vertex_count {
                    return Err(PipelineError::IndexOutOfRange {
                        index: v,
                        len: vertex_count,
                    });
                }
            }
            if e.traversals() != 0 {
                return Err(PipelineError::EdgeAlreadyTraversed {
                    edge: i,
                    count: e.traversals(),
                });
            }
        }

        let mut walker = Self {
            edges,
            vertex_count,
            visited: vec![false; vertex_count],
            tour: Vec::with_capacity(vertex_count),
            current: 0,
            cursor: 0,
            state: WalkState::Done,
            steps: 0,
        };

        if vertex_count == 0 {
            return Ok(walker);
        }
        let Some(&first) = walker.edges.first() else {
            walker.visit(0);
            walker.state = if vertex_count == 1 {
                WalkState::Done
            } else {
                WalkState::Stuck
            };
            return Ok(walker);
        };

        walker.edges[0].traverse(0)?;
        walker.visit(first.a());
        walker.visit(first.b());
        walker.current = first.b();
        walker.cursor = 1 % walker.edges.len();
        walker.state = WalkState::Seeded;
        walker.steps = 1;
        Ok(walker)
    }

    /// Current walk state.
    #[must_use]
    pub const fn state(&self) -> WalkState {
        self.state
    }

    /// The vertex the walker stands on.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Vertices visited so far, in first-visit order.
    #[must_use]
    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    /// Number of edge crossings so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Cross one edge, or end the walk if none is eligible.
    ///
    /// Returns the state after the step. Stepping a finished walk is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::TraversalOverflow`] if an edge would be
    ///   crossed a third time.
    /// - [`PipelineError::UnconsumedEdge`] if every vertex was visited
    ///   but some edge was crossed fewer than twice.
    pub fn step(&mut self) -> Result<WalkState, PipelineError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let Some(index) = self.next_edge() else {
            self.state = self.conclude()?;
            return Ok(self.state);
        };

        self.edges[index].traverse(index)?;
        let far = self.edges[index]
            .other(self.current)
            .ok_or(PipelineError::IndexOutOfRange {
                index: self.current,
                len: self.vertex_count,
            })?;
        self.visit(far);
        self.current = far;
        self.cursor = (index + 1) % self.edges.len();
        self.steps += 1;
        self.state = WalkState::Advancing;
        Ok(self.state)
    }

    /// Walk until the state is terminal.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`step`](Self::step).
    pub fn run(mut self) -> Result<WalkOutcome, PipelineError> {
        while !self.state.is_terminal() {
            self.step()?;
        }
        Ok(self.into_outcome())
    }

    /// Consume the walker and return what it has so far.
    #[must_use]
    pub fn into_outcome(self) -> WalkOutcome {
        WalkOutcome {
            tour: Tour::new(self.tour),
            state: self.state,
            steps: self.steps,
        }
    }

    fn visit(&mut self, v: usize) {
        if let Some(seen) = self.visited.get_mut(v)
            && !*seen
        {
            *seen = true;
            self.tour.push(v);
        }
    }

    /// One cyclic pass from the cursor: the first untouched edge at
    /// `current`, else the first edge crossed once.
    fn next_edge(&self) -> Option<usize> {
        let len = self.edges.len();
        let mut fallback = None;
        for offset in 0..len {
            let i = (self.cursor + offset) % len;
            let e = &self.edges[i];
            if !e.touches(self.current) {
                continue;
            }
            match e.traversals() {
                0 => return Some(i),
                1 if fallback.is_none() => fallback = Some(i),
                _ => {}
            }
        }
        fallback
    }

    fn conclude(&self) -> Result<WalkState, PipelineError> {
        if self.tour.len() < self.vertex_count {
            return Ok(WalkState::Stuck);
        }
        if let Some((edge, e)) = self
            .edges
            .iter()
            .enumerate()
            .find(|(_, e)| e.traversals() != Edge::MAX_TRAVERSALS)
        {
            return Err(PipelineError::UnconsumedEdge {
                edge,
                count: e.traversals(),
            });
        }
        Ok(WalkState::Done)
    }
}

/// Walk `mst` to completion, recording traversal counts on its edges.
///
/// # Errors
///
/// See [`TourWalker::new`] and [`TourWalker::step`].
pub fn walk(mst: &mut Mst) -> Result<WalkOutcome, PipelineError> {
    let n = mst.vertex_count();
    TourWalker::new(mst.edges_mut(), n)?.run()
}

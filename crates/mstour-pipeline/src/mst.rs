//! Minimum spanning tree via Kruskal's algorithm.
//!
//! Candidate edges are consumed in ascending weight order. An edge is
//! accepted iff its endpoints lie in different components of a
//! [`DisjointSet`], after which the two components are merged. The
//! builder stops early according to the configured [`Termination`].

use crate::disjoint_set::DisjointSet;
use crate::types::{Edge, Mst, PipelineConfig, PipelineError, Termination};

/// Output of [`MstBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpanningTree {
    /// The accepted edges and their total weight.
    pub mst: Mst,
    /// How many candidate edges were inspected before stopping.
    pub examined: usize,
}

/// Kruskal's algorithm over a pre-sorted edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MstBuilder {
    termination: Termination,
    verify_sorted: bool,
}

impl Default for MstBuilder {
    fn default() -> Self {
        Self::new(
            PipelineConfig::DEFAULT_TERMINATION,
            PipelineConfig::DEFAULT_VERIFY_SORTED,
        )
    }
}

impl MstBuilder {
    /// Create a builder with an explicit termination rule.
    #[must_use]
    pub const fn new(termination: Termination, verify_sorted: bool) -> Self {
        Self {
            termination,
            verify_sorted,
        }
    }

    /// Create a builder from the pipeline configuration.
    #[must_use]
    pub const fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.termination, config.verify_sorted)
    }

    /// The termination rule in use.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    /// Build the spanning tree over `vertex_count` vertices.
    ///
    /// `edges` must be sorted by ascending weight. Accepted edges are
    /// copied into the tree in acceptance order.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::IndexOutOfRange`] if an edge endpoint is not
    ///   below `vertex_count`.
    /// - [`PipelineError::UnsortedEdges`] if sorting is verified and an
    ///   edge is lighter than its predecessor.
    /// - [`PipelineError::IncompleteSpanningTree`] if the edges do not
    ///   connect every vertex.
    pub fn build(&self, edges: &[Edge], vertex_count: usize) -> Result<SpanningTree, PipelineError> {
        if let Some(bad) = edges
            .iter()
            .flat_map(|e| [e.a(), e.b()])
            .find(|&v| v >= vertex_count)
        {
            return Err(PipelineError::IndexOutOfRange {
                index: bad,
                len: vertex_count,
            });
        }
        if self.verify_sorted
            && let Some(position) = first_unsorted(edges)
        {
            return Err(PipelineError::UnsortedEdges { position });
        }

        let target = vertex_count.saturating_sub(1);
        if target == 0 {
            return Ok(SpanningTree {
                mst: Mst::new(vertex_count, Vec::new()),
                examined: 0,
            });
        }

        let mut ds = DisjointSet::new(vertex_count);
        let mut accepted = Vec::with_capacity(target);
        let mut examined = 0;

        for edge in edges {
            examined += 1;
            if !ds.union(edge.a(), edge.b())? {
                continue;
            }
            accepted.push(*edge);
            let complete = match self.termination {
                Termination::EdgeCount => accepted.len() == target,
                Termination::SpanningScan => ds.is_spanning(),
            };
            if complete {
                break;
            }
        }

        if accepted.len() < target {
            return Err(PipelineError::IncompleteSpanningTree {
                expected: target,
                found: accepted.len(),
            });
        }

        Ok(SpanningTree {
            mst: Mst::new(vertex_count, accepted),
            examined,
        })
    }
}

/// Index of the first edge lighter than its predecessor, if any.
fn first_unsorted(edges: &[Edge]) -> Option<usize> {
    edges
        .windows(2)
        .position(|w| w[1].weight().total_cmp(&w[0].weight()).is_lt())
        .map(|i| i + 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::edge_store::EdgeStore;
    use crate::types::Point;

    fn sorted_edges(points: &[Point]) -> Vec<Edge> {
        let mut store = EdgeStore::build_complete(points).unwrap();
        store.sort_ascending();
        store.into_edges()
    }

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn unit_square_takes_three_unit_edges() {
        let edges = sorted_edges(&unit_square());
        let tree = MstBuilder::default().build(&edges, 4).unwrap();
        assert_eq!(tree.mst.len(), 3);
        assert!((tree.mst.total_weight() - 3.0).abs() < 1e-6);
        for e in tree.mst.edges() {
            assert!((e.weight() - 1.0).abs() < 1e-6, "diagonal accepted: {e:?}");
        }
        // (0,1), (0,3), (1,2) are accepted before (2,3) is reached.
        assert_eq!(tree.examined, 3);
    }

    #[test]
    fn collinear_skips_long_edge() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let tree = MstBuilder::default()
            .build(&sorted_edges(&points), 3)
            .unwrap();
        assert!((tree.mst.total_weight() - 2.0).abs() < 1e-6);
        assert!(
            tree.mst
                .edges()
                .iter()
                .all(|e| !(e.touches(0) && e.touches(2)))
        );
    }

    #[test]
    fn acceptance_order_is_ascending() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 1.0),
            Point::new(9.0, 3.0),
        ];
        let tree = MstBuilder::default()
            .build(&sorted_edges(&points), 4)
            .unwrap();
        let weights: Vec<f32> = tree.mst.edges().iter().map(Edge::weight).collect();
        assert!(weights.is_sorted());
    }

    #[test]
    fn tree_edges_form_no_cycle() {
        let points: Vec<Point> = (0..12_u8)
            .map(|i| {
                let t = f32::from(i);
                Point::new((t * 1.7).sin() * 10.0, (t * 0.9).cos() * 7.0)
            })
            .collect();
        let tree = MstBuilder::default()
            .build(&sorted_edges(&points), points.len())
            .unwrap();
        assert_eq!(tree.mst.len(), points.len() - 1);
        let mut ds = DisjointSet::new(points.len());
        for e in tree.mst.edges() {
            assert!(ds.union(e.a(), e.b()).unwrap(), "cycle through {e:?}");
        }
        assert!(ds.is_spanning());
    }

    #[test]
    fn termination_rules_agree() {
        let points: Vec<Point> = (0..9_u8)
            .map(|i| Point::new(f32::from(i % 3) * 2.0, f32::from(i / 3) * 3.0))
            .collect();
        let edges = sorted_edges(&points);
        let by_count = MstBuilder::new(Termination::EdgeCount, true)
            .build(&edges, points.len())
            .unwrap();
        let by_scan = MstBuilder::new(Termination::SpanningScan, true)
            .build(&edges, points.len())
            .unwrap();
        assert_eq!(by_count, by_scan);
    }

    #[test]
    fn degenerate_vertex_counts() {
        let none = MstBuilder::default().build(&[], 0).unwrap();
        assert!(none.mst.is_empty());
        assert_eq!(none.examined, 0);
        let one = MstBuilder::default().build(&[], 1).unwrap();
        assert!(one.mst.is_empty());
        assert_eq!(one.mst.vertex_count(), 1);
    }

    #[test]
    fn disconnected_input_is_incomplete() {
        let edges = vec![Edge::new(0, 1, 1.0).unwrap(), Edge::new(2, 3, 1.0).unwrap()];
        assert_eq!(
            MstBuilder::default().build(&edges, 4),
            Err(PipelineError::IncompleteSpanningTree {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn unsorted_input_is_rejected() {
        let edges = vec![
            Edge::new(0, 1, 1.0).unwrap(),
            Edge::new(1, 2, 3.0).unwrap(),
            Edge::new(0, 2, 2.0).unwrap(),
        ];
        assert_eq!(
            MstBuilder::default().build(&edges, 3),
            Err(PipelineError::UnsortedEdges { position: 2 })
        );
        // Without verification the greedy pass runs on the given order.
        let tree = MstBuilder::new(Termination::EdgeCount, false)
            .build(&edges, 3)
            .unwrap();
        assert!((tree.mst.total_weight() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_endpoint_is_rejected() {
        let edges = vec![Edge::new(0, 5, 1.0).unwrap()];
        assert_eq!(
            MstBuilder::default().build(&edges, 3),
            Err(PipelineError::IndexOutOfRange { index: 5, len: 3 })
        );
    }

    #[test]
    fn from_config_copies_settings() {
        let config = PipelineConfig {
            termination: Termination::SpanningScan,
            verify_sorted: false,
        };
        let builder = MstBuilder::from_config(&config);
        assert_eq!(builder, MstBuilder::new(Termination::SpanningScan, false));
        assert_eq!(builder.termination(), Termination::SpanningScan);
    }
}

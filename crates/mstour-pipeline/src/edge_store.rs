//! Candidate edges of the complete graph over the input points.
//!
//! Every unordered pair `(i, j)` with `i < j` becomes one [`Edge`]
//! weighted by the Euclidean distance between the two points. The store
//! is built once and sorted once before Kruskal's algorithm consumes it.

use crate::types::{Edge, PipelineError, Point};

/// All `n * (n - 1) / 2` edges of the complete graph over `n` points.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStore {
    point_count: usize,
    edges: Vec<Edge>,
}

/// Number of edges in the complete graph over `n` vertices, or `None`
/// on overflow.
#[must_use]
pub const fn complete_edge_count(n: usize) -> Option<usize> {
    if n < 2 {
        return Some(0);
    }
    // One of n, n - 1 is even, so halve that one before multiplying.
    if n % 2 == 0 {
        (n / 2).checked_mul(n - 1)
    } else {
        n.checked_mul((n - 1) / 2)
    }
}

impl EdgeStore {
    /// Build the complete graph over `points`.
    ///
    /// Edges are emitted pair by pair in row-major order: `(0, 1)`,
    /// `(0, 2)`, ..., `(1, 2)`, and so on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NonFiniteCoordinate`] if any point has a
    /// NaN or infinite coordinate, and [`PipelineError::TooManyPoints`]
    /// if the edge list cannot be allocated.
    pub fn build_complete(points: &[Point]) -> Result<Self, PipelineError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PipelineError::NonFiniteCoordinate { index });
        }
        let n = points.len();
        let mut edges = allocate_edges(n)?;
        for (i, &pi) in points.iter().enumerate() {
            for (j, &pj) in points.iter().enumerate().skip(i + 1) {
                edges.push(Edge::new(i, j, pi.distance(pj))?);
            }
        }

        Ok(Self {
            point_count: n,
            edges,
        })
    }

    /// Sort edges by ascending weight.
    ///
    /// The sort is stable: edges of equal weight keep their construction
    /// order, so results are reproducible and sorting an already sorted
    /// store changes nothing.
    pub fn sort_ascending(&mut self) {
        self.edges
            .sort_by(|a, b| a.weight().total_cmp(&b.weight()));
    }

    /// Whether the edges are in ascending weight order.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.edges
            .is_sorted_by(|a, b| a.weight().total_cmp(&b.weight()).is_le())
    }

    /// Number of points the graph was built over.
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.point_count
    }

    /// Number of edges.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the store holds no edges (fewer than 2 points).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The edges in their current order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Consumes the store and returns the edges.
    #[must_use]
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

/// Reserve room for every edge over `point_count` points.
///
/// The count must fit in `usize` and the byte size in `isize`; on
/// 32-bit targets the latter fails long before the former.
fn allocate_edges(point_count: usize) -> Result<Vec<Edge>, PipelineError> {
    let too_many = || PipelineError::TooManyPoints { count: point_count };
    let capacity = complete_edge_count(point_count).ok_or_else(too_many)?;
    let mut edges = Vec::new();
    edges.try_reserve_exact(capacity).map_err(|_| too_many())?;
    Ok(edges)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn complete_edge_counts() {
        assert_eq!(complete_edge_count(0), Some(0));
        assert_eq!(complete_edge_count(1), Some(0));
        assert_eq!(complete_edge_count(2), Some(1));
        assert_eq!(complete_edge_count(4), Some(6));
        assert_eq!(complete_edge_count(5), Some(10));
        assert_eq!(complete_edge_count(280), Some(39_060));
        assert_eq!(complete_edge_count(usize::MAX), None);
    }

    #[test]
    fn allocation_overflow_is_an_error() {
        // The edge count fits in usize, its byte size does not fit in isize.
        let n = 1usize << (usize::BITS / 2);
        assert!(complete_edge_count(n).is_some());
        assert_eq!(
            allocate_edges(n),
            Err(PipelineError::TooManyPoints { count: n })
        );
        assert_eq!(
            allocate_edges(usize::MAX),
            Err(PipelineError::TooManyPoints { count: usize::MAX })
        );
        assert!(allocate_edges(5).unwrap().capacity() >= 10);
    }

    #[test]
    fn build_complete_unit_square() {
        let store = EdgeStore::build_complete(&unit_square()).unwrap();
        assert_eq!(store.point_count(), 4);
        assert_eq!(store.len(), 6);
        for e in store.edges() {
            assert!(e.a() < e.b());
            assert_eq!(e.traversals(), 0);
        }
        let diagonals = store
            .edges()
            .iter()
            .filter(|e| (e.weight() - 2.0_f32.sqrt()).abs() < 1e-6)
            .count();
        assert_eq!(diagonals, 2);
    }

    #[test]
    fn build_complete_row_major_order() {
        let store = EdgeStore::build_complete(&unit_square()).unwrap();
        let pairs: Vec<(usize, usize)> = store.edges().iter().map(|e| (e.a(), e.b())).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn build_complete_degenerate() {
        assert!(EdgeStore::build_complete(&[]).unwrap().is_empty());
        let single = EdgeStore::build_complete(&[Point::new(1.0, 1.0)]).unwrap();
        assert!(single.is_empty());
        assert_eq!(single.point_count(), 1);
    }

    #[test]
    fn build_complete_rejects_non_finite() {
        let points = [Point::new(0.0, 0.0), Point::new(f32::NAN, 1.0)];
        assert_eq!(
            EdgeStore::build_complete(&points),
            Err(PipelineError::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn coincident_points_give_zero_weight() {
        let points = [Point::new(2.0, 2.0), Point::new(2.0, 2.0)];
        let store = EdgeStore::build_complete(&points).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.edges()[0].weight().abs() < f32::EPSILON);
    }

    #[test]
    fn sort_ascending_orders_by_weight() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(1.0, 0.0),
        ];
        let mut store = EdgeStore::build_complete(&points).unwrap();
        assert!(!store.is_sorted());
        store.sort_ascending();
        assert!(store.is_sorted());
        let weights: Vec<f32> = store.edges().iter().map(Edge::weight).collect();
        assert_eq!(weights, vec![1.0, 9.0, 10.0]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut store = EdgeStore::build_complete(&unit_square()).unwrap();
        store.sort_ascending();
        // The four unit edges keep construction order: (0,1), (0,3), (1,2), (2,3).
        let pairs: Vec<(usize, usize)> = store.edges()[..4]
            .iter()
            .map(|e| (e.a(), e.b()))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn sorting_sorted_store_is_noop() {
        let mut store = EdgeStore::build_complete(&unit_square()).unwrap();
        store.sort_ascending();
        let once = store.clone();
        store.sort_ascending();
        assert_eq!(store, once);
    }
}

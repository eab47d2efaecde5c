//! Disjoint-set forest: weighted quick-union with path halving.
//!
//! Tracks connected components over a fixed universe of `n` items
//! identified by `usize` indices in `[0, n)`. Kruskal's algorithm uses
//! it to reject candidate edges whose endpoints are already connected.
//!
//! Parent links and component sizes live in plain vectors indexed by
//! item, so there are no pointer graphs to keep consistent.

use crate::types::PipelineError;

/// A union-find structure with union-by-size and path halving.
///
/// `parent[i] == i` marks a root. `size[r]` is only meaningful when
/// `r` is a root and holds the number of items in its component.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Creates `n` singleton components, each its own root of size 1.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Number of items in the universe.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if the universe is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn check(&self, index: usize) -> Result<(), PipelineError> {
        if index < self.parent.len() {
            Ok(())
        } else {
            Err(PipelineError::IndexOutOfRange {
                index,
                len: self.parent.len(),
            })
        }
    }

    /// Returns the root of the component containing `i`.
    ///
    /// Every node visited on the way up is re-linked to its
    /// grandparent (path halving), which keeps later lookups near
    /// constant time without a second pass.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IndexOutOfRange`] if `i >= len()`.
    pub fn find(&mut self, i: usize) -> Result<usize, PipelineError> {
        self.check(i)?;
        let mut x = i;
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        Ok(x)
    }

    /// Merges the components containing `p` and `q`.
    ///
    /// The root of the smaller component is attached under the root of
    /// the larger one, whose size becomes the sum. On equal sizes the
    /// root of `q` goes under the root of `p`.
    ///
    /// Returns `Ok(false)` without changing anything if `p` and `q` are
    /// already connected.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IndexOutOfRange`] if either index is out
    /// of range.
    pub fn union(&mut self, p: usize, q: usize) -> Result<bool, PipelineError> {
        let rp = self.find(p)?;
        let rq = self.find(q)?;
        if rp == rq {
            return Ok(false);
        }

        let (absorbing, absorbed) = if self.size[rp] < self.size[rq] {
            (rq, rp)
        } else {
            (rp, rq)
        };
        self.parent[absorbed] = absorbing;
        self.size[absorbing] += self.size[absorbed];
        Ok(true)
    }

    /// Whether `p` and `q` belong to the same component.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IndexOutOfRange`] if either index is out
    /// of range.
    pub fn connected(&mut self, p: usize, q: usize) -> Result<bool, PipelineError> {
        Ok(self.find(p)? == self.find(q)?)
    }

    /// Number of items in the component containing `i`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IndexOutOfRange`] if `i >= len()`.
    pub fn component_size(&mut self, i: usize) -> Result<usize, PipelineError> {
        let root = self.find(i)?;
        Ok(self.size[root])
    }

    /// Whether every item shares a root with item 0.
    ///
    /// This is an O(n) scan. An empty or singleton universe is
    /// trivially spanning.
    pub fn is_spanning(&mut self) -> bool {
        let n = self.parent.len();
        if n <= 1 {
            return true;
        }
        // Indices below `n` always pass the range check.
        let Ok(first_root) = self.find(0) else {
            return false;
        };
        (1..n).all(|i| self.find(i).is_ok_and(|root| root == first_root))
    }
}

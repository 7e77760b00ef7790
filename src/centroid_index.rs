//! Sorted element-centroid index enabling tolerance-aware point queries.

use crate::error::MatchError;
use crate::mesh::Mesh;
use crate::sort::index_sort_f64;
use crate::tolerance::{Tolerance, ToleranceKind};

/// One centroid per element of a mesh, iterated blocks-in-order, plus a
/// permutation sorted ascending by the x coordinate. The centroid arrays are
/// never reordered; only the permutation is.
#[derive(Clone, Debug)]
pub struct CentroidIndex {
    dim: usize,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    perm: Vec<usize>,
}

impl CentroidIndex {
    /// Build the index over every element of `mesh`.
    pub fn build(mesh: &Mesh) -> Self {
        let n = mesh.num_elements();
        let dim = mesh.dimension;
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(if dim > 1 { n } else { 0 });
        let mut z = Vec::with_capacity(if dim > 2 { n } else { 0 });
        for block in &mesh.blocks {
            for e in 0..block.num_elements {
                let mid = mesh.centroid(block.element(e));
                x.push(mid[0]);
                if dim > 1 {
                    y.push(mid[1]);
                }
                if dim > 2 {
                    z.push(mid[2]);
                }
            }
        }
        let perm = index_sort_f64(&x);
        Self { dim, x, y, z, perm }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Centroid of element `e` (original, pre-sort index); absent axes 0.0.
    fn coords(&self, e: usize) -> [f64; 3] {
        [
            self.x[e],
            if self.dim > 1 { self.y[e] } else { 0.0 },
            if self.dim > 2 { self.z[e] } else { 0.0 },
        ]
    }

    /// Locate the element whose centroid matches `(x0, y0, z0)` within `tol`
    /// on every present axis.
    ///
    /// Returns the element's original (pre-sort) index, or `Ok(None)` when no
    /// candidate lies in the tolerance window. Finding a second candidate in
    /// the same window is an ambiguity: with `ignore_dups` the first match
    /// wins, otherwise [`MatchError::DuplicateMidpoint`] reports both
    /// candidates.
    ///
    /// A lookup needs a metric, so an `Ignore` tolerance is evaluated as
    /// `Absolute` with the same value.
    pub fn find(
        &self,
        x0: f64,
        y0: f64,
        z0: f64,
        tol: &Tolerance,
        ignore_dups: bool,
    ) -> Result<Option<usize>, MatchError> {
        let tol = if tol.kind == ToleranceKind::Ignore {
            tol.with_kind(ToleranceKind::Absolute)
        } else {
            *tol
        };
        let n = self.perm.len();
        if n == 0 {
            return Ok(None);
        }

        // Binary search for the smallest `low` with x[perm[low]] >= x0.
        let mut low = 0;
        let mut high = n;
        while low < high {
            let mid = (low + high) / 2;
            if self.x[self.perm[mid]] < x0 {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        let mut i = if low == n { n - 1 } else { low };

        // Several entries may tie on x within tolerance; walk back to the
        // first candidate of the window rather than the landing point.
        while i > 0 && !tol.is_different(self.x[self.perm[i - 1]], x0) {
            i -= 1;
        }

        // Scan the window. The loop keeps going after a match so duplicates
        // are detected.
        let mut index: Option<usize> = None;
        while i < n && !tol.is_different(self.x[self.perm[i]], x0) {
            let e = self.perm[i];
            let y_ok = self.dim < 2 || !tol.is_different(self.y[e], y0);
            let z_ok = self.dim < 3 || !tol.is_different(self.z[e], z0);
            if y_ok && z_ok {
                match index {
                    None => index = Some(e),
                    Some(first) => {
                        if ignore_dups {
                            return Ok(Some(first));
                        }
                        return Err(MatchError::DuplicateMidpoint {
                            elem1: e,
                            coords1: self.coords(e),
                            elem2: first,
                            coords2: self.coords(first),
                            tolerance: tol,
                        });
                    }
                }
            }
            i += 1;
        }

        Ok(index)
    }
}

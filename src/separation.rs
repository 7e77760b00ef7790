//! Minimum coordinate separation between any two nodes of a mesh.
//!
//! Shares the index-sort machinery with matching but sorts on the axis of
//! largest coordinate range, then prunes adjacent pairs in sorted order whose
//! along-axis separation already exceeds the running minimum. Used for
//! summary-mode reporting.

use crate::mesh::Mesh;
use crate::sort::index_sort_f64;

fn range(vals: &[f64]) -> f64 {
    let mut min = vals[0];
    let mut max = vals[0];
    for &v in &vals[1..] {
        min = min.min(v);
        max = max.max(v);
    }
    max - min
}

/// Smallest Euclidean distance between any two nodes of `mesh`.
///
/// Returns 0.0 for meshes with fewer than two nodes.
pub fn min_coord_separation(mesh: &Mesh) -> f64 {
    let n = mesh.num_nodes();
    if n < 2 {
        return 0.0;
    }

    // Sort on the coordinate with the largest range to keep the pruning
    // window tight against degenerate clustering.
    let mut axis: &[f64] = &mesh.x;
    let mut largest = range(&mesh.x);
    if mesh.dimension > 1 {
        let yr = range(&mesh.y);
        if yr > largest {
            largest = yr;
            axis = &mesh.y;
        }
    }
    if mesh.dimension > 2 {
        let zr = range(&mesh.z);
        if zr > largest {
            axis = &mesh.z;
        }
    }
    let perm = index_sort_f64(axis);

    let mut min = f64::MAX;
    for i in 0..n {
        for j in (i + 1)..n {
            let along = axis[perm[j]] - axis[perm[i]];
            if along * along > min {
                break;
            }
            let a = mesh.node_coord(perm[i]);
            let b = mesh.node_coord(perm[j]);
            let mut d = 0.0;
            for k in 0..mesh.dimension {
                let dk = b[k] - a[k];
                d += dk * dk;
            }
            min = min.min(d);
        }
    }
    min.sqrt()
}

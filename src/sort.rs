//! Index-sort helpers.
//!
//! The key arrays are never reordered; the returned permutation is sorted so
//! that walking it visits the keys in ascending order. The sort is stable, so
//! ties keep their original order and duplicate handling stays deterministic
//! from run to run.

/// Identity permutation of `keys` sorted ascending by key value.
///
/// `NaN` keys sort via IEEE total ordering rather than panicking; matching
/// inputs are expected to be free of them.
pub fn index_sort_f64(keys: &[f64]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..keys.len()).collect();
    perm.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    perm
}

/// Identity permutation of `keys` sorted ascending by key value.
pub fn index_sort_i64(keys: &[i64]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..keys.len()).collect();
    perm.sort_by_key(|&a| keys[a]);
    perm
}

use approx::assert_relative_eq;
use meshdiff::{
    compute_fileid_maps, compute_maps, compute_partial_maps, min_coord_separation,
    ComparisonConfig, ElementBlock, MatchError, Mesh, Tolerance, ToleranceKind,
};

/// 2D quad grid: nodes at integer coordinates, `nx * ny` quads in one block.
fn quad_grid(nx: usize, ny: usize) -> Mesh {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            x.push(i as f64);
            y.push(j as f64);
        }
    }
    let mut conn = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let n0 = j * (nx + 1) + i + 1; // 1-based
            conn.extend([n0, n0 + 1, n0 + nx + 2, n0 + nx + 1]);
        }
    }
    let mut mesh = Mesh::new(2, x, y, Vec::new());
    mesh.blocks.push(ElementBlock::new(1, 4, conn));
    mesh
}

/// Reorder a single-block mesh by known permutations. `node_perm[i]` is the
/// output position of input node `i`; likewise `elem_perm` for elements.
fn permute_mesh(mesh: &Mesh, node_perm: &[usize], elem_perm: &[usize]) -> Mesh {
    let n = mesh.num_nodes();
    let mut x = vec![0.0; n];
    let mut y = vec![0.0; n];
    for i in 0..n {
        x[node_perm[i]] = mesh.x[i];
        y[node_perm[i]] = mesh.y[i];
    }
    let block = &mesh.blocks[0];
    let npe = block.nodes_per_element;
    let mut conn = vec![0; block.connectivity.len()];
    for e in 0..block.num_elements {
        let dst = elem_perm[e];
        for (k, &node) in block.element(e).iter().enumerate() {
            conn[dst * npe + k] = node_perm[node - 1] + 1;
        }
    }
    let mut out = Mesh::new(2, x, y, Vec::new());
    out.blocks.push(ElementBlock::new(1, npe, conn));
    out
}

fn absolute_config(value: f64) -> ComparisonConfig {
    ComparisonConfig {
        coord_tol: Tolerance::new(ToleranceKind::Absolute, value, 0.0),
        ..ComparisonConfig::default()
    }
}

#[test]
fn round_trip_recovers_known_permutation() {
    let a = quad_grid(3, 2);
    let node_perm: Vec<usize> = (0..a.num_nodes()).rev().collect();
    let elem_perm: Vec<usize> = (0..a.num_elements()).rev().collect();
    let b = permute_mesh(&a, &node_perm, &elem_perm);

    let map = compute_maps(&a, &b, &absolute_config(1.0e-6)).unwrap();
    for (i, m) in map.node_map.iter().enumerate() {
        assert_eq!(*m, Some(node_perm[i]));
    }
    for (e, m) in map.elmt_map.iter().enumerate() {
        assert_eq!(*m, Some(elem_perm[e]));
    }
}

#[test]
fn matching_is_idempotent() {
    let a = quad_grid(2, 2);
    let node_perm: Vec<usize> = (0..a.num_nodes()).map(|i| (i + 3) % a.num_nodes()).collect();
    let elem_perm: Vec<usize> = (0..a.num_elements()).map(|e| (e + 1) % a.num_elements()).collect();
    let b = permute_mesh(&a, &node_perm, &elem_perm);

    let config = absolute_config(1.0e-6);
    let first = compute_maps(&a, &b, &config).unwrap();
    let second = compute_maps(&a, &b, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn self_match_is_identity() {
    let a = quad_grid(3, 3);
    let map = compute_maps(&a, &a, &absolute_config(1.0e-6)).unwrap();
    assert!(map.is_identity());
}

#[test]
fn relative_coordinate_tolerance_also_matches() {
    // default config uses a relative coordinate tolerance
    let a = quad_grid(2, 2);
    let node_perm: Vec<usize> = (0..a.num_nodes()).rev().collect();
    let elem_perm: Vec<usize> = (0..a.num_elements()).rev().collect();
    let b = permute_mesh(&a, &node_perm, &elem_perm);
    let map = compute_maps(&a, &b, &ComparisonConfig::default()).unwrap();
    assert_eq!(map.node_map[0], Some(node_perm[0]));
}

#[test]
fn ignore_coordinate_tolerance_is_forced_to_absolute() {
    // matching with an Ignore coordinate tolerance would accept anything;
    // the pass substitutes Absolute with the same value instead
    let a = quad_grid(2, 1);
    let config = ComparisonConfig {
        coord_tol: Tolerance::new(ToleranceKind::Ignore, 1.0e-6, 0.0),
        ..ComparisonConfig::default()
    };
    let map = compute_maps(&a, &a, &config).unwrap();
    assert!(map.is_identity());
}

/// 1D mesh whose two 2-node elements share a midpoint.
fn duplicate_midpoint_mesh() -> Mesh {
    let mut mesh = Mesh::new(1, vec![0.0, 1.0, 1.0, 0.0], Vec::new(), Vec::new());
    mesh.blocks
        .push(ElementBlock::new(1, 2, vec![1, 2, 3, 4]));
    mesh
}

#[test]
fn duplicate_midpoints_are_fatal() {
    let a = duplicate_midpoint_mesh();
    let err = compute_maps(&a, &a, &absolute_config(1.0e-6)).unwrap_err();
    assert!(matches!(err, MatchError::DuplicateMidpoint { .. }), "{err}");
}

#[test]
fn duplicate_midpoints_pick_first_when_ignored() {
    let a = duplicate_midpoint_mesh();
    let config = ComparisonConfig {
        ignore_dups: true,
        ..absolute_config(1.0e-6)
    };
    let map = compute_maps(&a, &a, &config).unwrap();
    // both elements resolve to the sort-first candidate
    assert_eq!(map.elmt_map, vec![Some(0), Some(0)]);
}

#[test]
fn unmatched_element_is_fatal_for_full_matching() {
    let a = quad_grid(2, 2);
    let mut b = quad_grid(2, 2);
    for v in &mut b.x {
        *v += 10.0; // disjoint geometry
    }
    let err = compute_maps(&a, &b, &absolute_config(1.0e-6)).unwrap_err();
    assert!(matches!(err, MatchError::ElementUnmatched { .. }), "{err}");
}

#[test]
fn partial_matching_records_missing_elements() {
    let a = quad_grid(3, 2);
    // drop the last element of b, keeping all nodes
    let mut b = quad_grid(3, 2);
    let npe = b.blocks[0].nodes_per_element;
    let conn = &b.blocks[0].connectivity;
    let truncated = conn[..conn.len() - npe].to_vec();
    b.blocks[0] = ElementBlock::new(1, npe, truncated);

    let map = compute_partial_maps(&a, &b, &absolute_config(1.0e-6)).unwrap();
    let unmatched: Vec<usize> = map
        .elmt_map
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_none())
        .map(|(e, _)| e)
        .collect();
    assert_eq!(unmatched, vec![a.num_elements() - 1]);
}

#[test]
fn free_nodes_are_matched_by_fallback() {
    let mut a = quad_grid(2, 2);
    a.x.push(10.0);
    a.y.push(10.0); // isolated node, referenced by no element
    let node_perm: Vec<usize> = (0..a.num_nodes()).rev().collect();
    let elem_perm: Vec<usize> = (0..a.num_elements()).collect();
    let b = permute_mesh(&a, &node_perm, &elem_perm);

    let map = compute_maps(&a, &b, &absolute_config(1.0e-6)).unwrap();
    let free = a.num_nodes() - 1;
    assert_eq!(map.node_map[free], Some(node_perm[free]));
}

#[test]
fn unmatched_free_nodes_are_fatal() {
    // identical segment element, but the isolated nodes sit far apart
    let mut a = Mesh::new(1, vec![0.0, 1.0, 5.0], Vec::new(), Vec::new());
    a.blocks.push(ElementBlock::new(1, 2, vec![1, 2]));
    let mut b = Mesh::new(1, vec![0.0, 1.0, 6.0], Vec::new(), Vec::new());
    b.blocks.push(ElementBlock::new(1, 2, vec![1, 2]));

    let err = compute_maps(&a, &b, &absolute_config(1.0e-6)).unwrap_err();
    assert!(
        matches!(err, MatchError::FreeNodesUnmatched { remaining: 1 }),
        "{err}"
    );
}

#[test]
fn free_node_count_mismatch_is_fatal() {
    // two coincident-centroid elements collapse onto one element of b under
    // ignore_dups, leaving b with two never-targeted nodes against a's one
    // free node
    let mut a = Mesh::new(1, vec![0.0, 0.0, 1.0, 5.0], Vec::new(), Vec::new());
    a.blocks.push(ElementBlock::new(1, 2, vec![1, 3, 2, 3]));
    let mut b = Mesh::new(1, vec![0.0, 1.0, 5.0, 5.0], Vec::new(), Vec::new());
    b.blocks.push(ElementBlock::new(1, 2, vec![1, 2, 1, 2]));

    let config = ComparisonConfig {
        ignore_dups: true,
        ..absolute_config(1.0e-6)
    };
    let err = compute_maps(&a, &b, &config).unwrap_err();
    assert!(
        matches!(
            err,
            MatchError::FreeNodeCountMismatch {
                count1: 1,
                count2: 2
            }
        ),
        "{err}"
    );
}

#[test]
fn unmatched_local_node_is_fatal() {
    // centroids coincide but the node positions are disjoint
    let mut a = Mesh::new(1, vec![0.0, 1.0], Vec::new(), Vec::new());
    a.blocks.push(ElementBlock::new(1, 2, vec![1, 2]));
    let mut b = Mesh::new(1, vec![0.25, 0.75], Vec::new(), Vec::new());
    b.blocks.push(ElementBlock::new(1, 2, vec![1, 2]));

    let err = compute_maps(&a, &b, &absolute_config(1.0e-6)).unwrap_err();
    assert!(
        matches!(
            err,
            MatchError::NodeUnmatched {
                element1: 1,
                block_id1: 1,
                local_node: 0,
                ..
            }
        ),
        "{err}"
    );
}

/// Mesh pair where a's shared node (x = 1) is within tolerance of two
/// distinct b nodes, one per matched element.
fn ambiguous_node_pair() -> (Mesh, Mesh) {
    let mut a = Mesh::new(1, vec![0.0, 1.0, 2.0, 1.0], Vec::new(), Vec::new());
    a.blocks.push(ElementBlock::new(1, 2, vec![1, 2, 2, 3]));
    let mut b = Mesh::new(1, vec![0.0, 1.0, 1.0 + 1.0e-9, 2.0], Vec::new(), Vec::new());
    b.blocks.push(ElementBlock::new(1, 2, vec![1, 2, 3, 4]));
    (a, b)
}

#[test]
fn conflicting_node_assignments_are_fatal() {
    // a's node 1 maps to b's node 1 through the first element pair and to
    // b's node 2 through the second
    let (a, b) = ambiguous_node_pair();
    let err = compute_maps(&a, &b, &absolute_config(1.0e-6)).unwrap_err();
    assert!(
        matches!(
            err,
            MatchError::AmbiguousNodeMapping {
                node1: 1,
                prev: 1,
                next: 2,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn conflicting_node_assignments_keep_first_when_ignored() {
    let (a, b) = ambiguous_node_pair();
    let config = ComparisonConfig {
        ignore_dups: true,
        ..absolute_config(1.0e-6)
    };
    let map = compute_maps(&a, &b, &config).unwrap();
    // the earlier assignment stands; b's node 2 is mopped up by the
    // free-node fallback against a's free node at the same position
    assert_eq!(
        map.node_map,
        vec![Some(0), Some(1), Some(3), Some(2)]
    );
}

#[test]
fn mismatched_node_counts_per_element_are_fatal() {
    // partial matching skips the upfront count checks, exposing the
    // per-element topology check
    let mut a = Mesh::new(1, vec![0.0, 1.0], Vec::new(), Vec::new());
    a.blocks.push(ElementBlock::new(1, 2, vec![1, 2]));
    let mut b = Mesh::new(1, vec![0.0, 0.5, 1.0], Vec::new(), Vec::new());
    b.blocks.push(ElementBlock::new(1, 3, vec![1, 2, 3]));

    let err = compute_partial_maps(&a, &b, &absolute_config(1.0e-6)).unwrap_err();
    assert!(matches!(err, MatchError::ElementSizeMismatch { .. }), "{err}");
}

#[test]
fn fileid_maps_follow_global_ids() {
    let mut a = quad_grid(1, 1);
    a.node_ids = Some(vec![10, 20, 30, 40]);
    a.elem_ids = Some(vec![7]);
    let mut b = quad_grid(1, 1);
    b.node_ids = Some(vec![40, 10, 20, 30]);
    b.elem_ids = Some(vec![7]);

    let map = compute_fileid_maps(&a, &b).unwrap().expect("non-identity map");
    // id 10 sits at index 0 in a and index 1 in b, and so on
    assert_eq!(map.node_map, vec![Some(1), Some(2), Some(3), Some(0)]);
    assert_eq!(map.elmt_map, vec![Some(0)]);
}

#[test]
fn fileid_identity_map_reports_mapping_not_needed() {
    let mut a = quad_grid(1, 1);
    a.node_ids = Some(vec![1, 2, 3, 4]);
    let b = a.clone();
    assert!(compute_fileid_maps(&a, &b).unwrap().is_none());
}

#[test]
fn fileid_unmatched_id_is_fatal() {
    let mut a = quad_grid(1, 1);
    a.node_ids = Some(vec![1, 2, 3, 4]);
    let mut b = quad_grid(1, 1);
    b.node_ids = Some(vec![1, 2, 3, 99]);
    let err = compute_fileid_maps(&a, &b).unwrap_err();
    assert!(matches!(err, MatchError::IdUnmatched { .. }), "{err}");
}

#[test]
fn min_separation_uses_true_euclidean_distance() {
    let mut mesh = Mesh::new(2, vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 0.25], Vec::new());
    mesh.blocks.push(ElementBlock::new(1, 3, vec![1, 2, 3]));
    assert_relative_eq!(min_coord_separation(&mesh), 0.25, epsilon = 1e-12);
}

#[test]
fn min_separation_degenerate_mesh() {
    let mesh = Mesh::new(1, vec![4.2], Vec::new(), Vec::new());
    assert_relative_eq!(min_coord_separation(&mesh), 0.0);
}

//! Node and element correspondence between two independently ordered meshes.
//!
//! Three strategies produce a [`CorrespondenceMap`]: full geometric matching
//! ([`compute_maps`]), best-effort geometric matching
//! ([`compute_partial_maps`]) and exact matching via externally stored global
//! ids ([`compute_fileid_maps`]). The two geometric strategies share one
//! parameterized pass; a policy controls how an unmatched element is handled
//! and whether the free-node fallback runs.

use log::{debug, info};
use serde::Serialize;

use crate::centroid_index::CentroidIndex;
use crate::config::ComparisonConfig;
use crate::error::{EntityKind, MatchError};
use crate::mesh::Mesh;
use crate::sort::index_sort_i64;
use crate::tolerance::{Tolerance, ToleranceKind};

/// Index-to-index mapping from the first mesh's nodes and elements to the
/// second's. Both arrays are 0-based and as long as the first mesh's node and
/// element counts; `None` entries only occur under partial matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CorrespondenceMap {
    pub node_map: Vec<Option<usize>>,
    /// Targets are global element indices: 0-based positions with blocks
    /// concatenated in block order.
    pub elmt_map: Vec<Option<usize>>,
}

impl CorrespondenceMap {
    /// True when every node and element maps to its own index.
    ///
    /// Despite mapping being requested, the two orders may already agree; the
    /// driver can then discard the map and compare in file order.
    pub fn is_identity(&self) -> bool {
        self.node_map.iter().enumerate().all(|(i, m)| *m == Some(i))
            && self.elmt_map.iter().enumerate().all(|(i, m)| *m == Some(i))
    }

    /// Print both maps in a readable format, collapsing one-to-one maps.
    pub fn print(&self) {
        println!("=== node map (first -> second), 0-based");
        if self.node_map.iter().enumerate().all(|(i, m)| *m == Some(i)) {
            println!(" *** node map is one-to-one");
        } else {
            for (i, m) in self.node_map.iter().enumerate() {
                match m {
                    Some(t) => println!("{i} -> {t}"),
                    None => println!("{i} -> (unmatched)"),
                }
            }
        }
        println!("=== element map (first -> second), 0-based");
        if self.elmt_map.iter().enumerate().all(|(i, m)| *m == Some(i)) {
            println!(" *** element map is one-to-one");
        } else {
            for (i, m) in self.elmt_map.iter().enumerate() {
                match m {
                    Some(t) => println!("{i} -> {t}"),
                    None => println!("{i} -> (unmatched)"),
                }
            }
        }
    }
}

/// How the shared geometric pass reacts to entities it cannot place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MatchPolicy {
    /// Unmatched elements are fatal; leftover nodes go through the free-node
    /// fallback.
    Full,
    /// Unmatched elements are counted and reported; leftover nodes are
    /// tolerated silently.
    Partial,
}

/// Match every element and node of `mesh1` to a counterpart in `mesh2` by
/// centroid and coordinate proximity.
///
/// Fails on the first element or node without a counterpart, on ambiguous
/// matches (unless `config.ignore_dups`), and on topology mismatches.
pub fn compute_maps(
    mesh1: &Mesh,
    mesh2: &Mesh,
    config: &ComparisonConfig,
) -> Result<CorrespondenceMap, MatchError> {
    compute_geometric_maps(mesh1, mesh2, config, MatchPolicy::Full)
}

/// Best-effort variant of [`compute_maps`]: node and element counts of the
/// two meshes may differ, and an element with no counterpart is recorded as
/// unmapped instead of aborting.
pub fn compute_partial_maps(
    mesh1: &Mesh,
    mesh2: &Mesh,
    config: &ComparisonConfig,
) -> Result<CorrespondenceMap, MatchError> {
    compute_geometric_maps(mesh1, mesh2, config, MatchPolicy::Partial)
}

/// Coordinate tolerance to use while matching. Matching cannot proceed
/// without a metric, so an `Ignore` coordinate tolerance is replaced by an
/// `Absolute` copy for the duration of the pass.
fn effective_coord_tol(config: &ComparisonConfig) -> Tolerance {
    if config.coord_tol.kind == ToleranceKind::Ignore {
        config.coord_tol.with_kind(ToleranceKind::Absolute)
    } else {
        config.coord_tol
    }
}

/// True when `a` and `b` agree within `tol` on every axis present in `dim`.
#[inline]
fn coords_match(tol: &Tolerance, dim: usize, a: [f64; 3], b: [f64; 3]) -> bool {
    !tol.is_different(a[0], b[0])
        && (dim < 2 || !tol.is_different(a[1], b[1]))
        && (dim < 3 || !tol.is_different(a[2], b[2]))
}

fn compute_geometric_maps(
    mesh1: &Mesh,
    mesh2: &Mesh,
    config: &ComparisonConfig,
    policy: MatchPolicy,
) -> Result<CorrespondenceMap, MatchError> {
    let dim = mesh1.dimension;
    debug_assert_eq!(dim, mesh2.dimension);

    if policy == MatchPolicy::Full {
        if mesh1.num_nodes() != mesh2.num_nodes() {
            return Err(MatchError::CountMismatch {
                entity: EntityKind::Node,
                count1: mesh1.num_nodes(),
                count2: mesh2.num_nodes(),
            });
        }
        if mesh1.num_elements() != mesh2.num_elements() {
            return Err(MatchError::CountMismatch {
                entity: EntityKind::Element,
                count1: mesh1.num_elements(),
                count2: mesh2.num_elements(),
            });
        }
    }

    let tol = effective_coord_tol(config);
    let index = CentroidIndex::build(mesh2);

    let mut node_map: Vec<Option<usize>> = vec![None; mesh1.num_nodes()];
    let mut elmt_map: Vec<Option<usize>> = Vec::with_capacity(mesh1.num_elements());

    let mut unmatched = 0_usize;
    let mut unmatched_list: Vec<String> = Vec::new();

    for block1 in &mesh1.blocks {
        for i in 0..block1.num_elements {
            let conn1 = block1.element(i);
            let mid = mesh1.centroid(conn1);

            let e2 = match index.find(mid[0], mid[1], mid[2], &tol, config.ignore_dups)? {
                Some(e2) => e2,
                None => match policy {
                    MatchPolicy::Full => {
                        return Err(MatchError::ElementUnmatched {
                            element: i + 1,
                            block_id: block1.id,
                            tolerance: tol,
                        });
                    }
                    MatchPolicy::Partial => {
                        unmatched += 1;
                        if config.show_unmatched {
                            unmatched_list.push(format!("{}.{}", block1.id, i + 1));
                        }
                        elmt_map.push(None);
                        continue;
                    }
                },
            };
            elmt_map.push(Some(e2));

            let (b2, l2) = mesh2
                .global_to_block_local(e2)
                .expect("centroid index yields in-range element indices");
            let block2 = &mesh2.blocks[b2];

            if block1.nodes_per_element != block2.nodes_per_element {
                return Err(MatchError::ElementSizeMismatch {
                    element1: i + 1,
                    block_id1: block1.id,
                    element2: l2 + 1,
                    block_id2: block2.id,
                    nodes1: block1.nodes_per_element,
                    nodes2: block2.nodes_per_element,
                });
            }
            let conn2 = block2.element(l2);

            // Map every local node of the first element onto a local node of
            // the matched element.
            for (ln1, &n1) in conn1.iter().enumerate() {
                let c1 = mesh1.node_coord(n1 - 1);
                let mut found = false;
                for &n2 in conn2 {
                    let c2 = mesh2.node_coord(n2 - 1);
                    if !coords_match(&tol, dim, c1, c2) {
                        continue;
                    }
                    match node_map[n1 - 1] {
                        Some(prev) if prev != n2 - 1 => {
                            if config.ignore_dups {
                                // Keep the earlier assignment.
                                found = true;
                                break;
                            }
                            return Err(MatchError::AmbiguousNodeMapping {
                                node1: n1 - 1,
                                coords1: c1,
                                prev,
                                prev_coords: mesh2.node_coord(prev),
                                next: n2 - 1,
                                next_coords: c2,
                            });
                        }
                        _ => {
                            node_map[n1 - 1] = Some(n2 - 1);
                            found = true;
                            break;
                        }
                    }
                }
                if !found {
                    return Err(MatchError::NodeUnmatched {
                        element1: i + 1,
                        block_id1: block1.id,
                        element2: l2 + 1,
                        block_id2: block2.id,
                        local_node: ln1,
                        nodes1: conn1.iter().map(|&n| mesh1.node_coord(n - 1)).collect(),
                        nodes2: conn2.iter().map(|&n| mesh2.node_coord(n - 1)).collect(),
                        tolerance: tol,
                    });
                }
            }
        }
    }

    match policy {
        MatchPolicy::Full => {
            // Nodes never touched by a matched element are typically free
            // (unconnected) nodes; match them by brute force.
            if node_map.iter().any(Option::is_none) {
                match_free_nodes(mesh1, mesh2, &tol, &mut node_map)?;
            }
        }
        MatchPolicy::Partial => {
            if unmatched > 0 {
                info!("partial matching: {unmatched} elements unmatched");
                if config.show_unmatched {
                    info!(
                        "no match for (block.element): {}",
                        unmatched_list.join(", ")
                    );
                }
            } else if mesh1.num_elements() == mesh2.num_elements() {
                info!("partial matching was requested but not needed; all elements matched");
            }
        }
    }

    Ok(CorrespondenceMap { node_map, elmt_map })
}

/// Brute-force fallback for nodes left unmapped by the element-driven pass.
///
/// Quadratic in the number of free nodes, which are expected to be a small
/// minority of the mesh.
fn match_free_nodes(
    mesh1: &Mesh,
    mesh2: &Mesh,
    tol: &Tolerance,
    node_map: &mut [Option<usize>],
) -> Result<(), MatchError> {
    let dim = mesh1.dimension;

    let mut used = vec![false; mesh2.num_nodes()];
    for &m in node_map.iter().flatten() {
        used[m] = true;
    }

    let free1: Vec<usize> = node_map
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_none())
        .map(|(i, _)| i)
        .collect();
    let free2: Vec<usize> = (0..mesh2.num_nodes()).filter(|&i| !used[i]).collect();

    if free1.len() != free2.len() {
        return Err(MatchError::FreeNodeCountMismatch {
            count1: free1.len(),
            count2: free2.len(),
        });
    }
    debug!("matching {} free nodes by brute force", free1.len());

    let mut consumed = vec![false; free2.len()];
    let mut matched = 0_usize;
    for &id1 in &free1 {
        let c1 = mesh1.node_coord(id1);
        for (j, &id2) in free2.iter().enumerate() {
            if consumed[j] {
                continue;
            }
            if coords_match(tol, dim, c1, mesh2.node_coord(id2)) {
                node_map[id1] = Some(id2);
                consumed[j] = true;
                matched += 1;
                break;
            }
        }
    }

    if matched != free1.len() {
        return Err(MatchError::FreeNodesUnmatched {
            remaining: free1.len() - matched,
        });
    }
    Ok(())
}

/// Match nodes and elements through the files' externally stored global id
/// arrays instead of geometry.
///
/// Both id arrays are index-sorted and walked in lockstep; the first id
/// present in one file but not the other is fatal. Returns `None` when the
/// resulting map is the identity ("mapping not needed"), in which case the
/// caller may compare in file order. Meshes without a stored id array get the
/// identity id map, matching the file format's default.
pub fn compute_fileid_maps(
    mesh1: &Mesh,
    mesh2: &Mesh,
) -> Result<Option<CorrespondenceMap>, MatchError> {
    let node_ids1 = ids_or_default(&mesh1.node_ids, mesh1.num_nodes());
    let node_ids2 = ids_or_default(&mesh2.node_ids, mesh2.num_nodes());
    let node_map = lockstep_map(&node_ids1, &node_ids2, EntityKind::Node)?;

    let elem_ids1 = ids_or_default(&mesh1.elem_ids, mesh1.num_elements());
    let elem_ids2 = ids_or_default(&mesh2.elem_ids, mesh2.num_elements());
    let elmt_map = lockstep_map(&elem_ids1, &elem_ids2, EntityKind::Element)?;

    let map = CorrespondenceMap {
        node_map: node_map.into_iter().map(Some).collect(),
        elmt_map: elmt_map.into_iter().map(Some).collect(),
    };
    if map.is_identity() {
        info!("file id maps are one-to-one; mapping not needed");
        Ok(None)
    } else {
        Ok(Some(map))
    }
}

fn ids_or_default(ids: &Option<Vec<i64>>, count: usize) -> Vec<i64> {
    match ids {
        Some(ids) => ids.clone(),
        None => (1..=count as i64).collect(),
    }
}

fn lockstep_map(
    ids1: &[i64],
    ids2: &[i64],
    entity: EntityKind,
) -> Result<Vec<usize>, MatchError> {
    if ids1.len() != ids2.len() {
        return Err(MatchError::CountMismatch {
            entity,
            count1: ids1.len(),
            count2: ids2.len(),
        });
    }
    let p1 = index_sort_i64(ids1);
    let p2 = index_sort_i64(ids2);

    let mut map = vec![0_usize; ids1.len()];
    for i in 0..ids1.len() {
        if ids1[p1[i]] != ids2[p2[i]] {
            return Err(MatchError::IdUnmatched {
                entity,
                id: ids1[p1[i]],
            });
        }
        map[p1[i]] = p2[i];
    }
    Ok(map)
}

//! Failure taxonomy for the matching and alignment passes.
//!
//! Every fatal condition is raised at the point of detection with enough
//! context (ids, both candidates' coordinates, the active tolerance) to
//! diagnose a genuine mesh mismatch. None of these have a transient-failure
//! mode; the driver decides whether to abort the process.

use thiserror::Error;

use crate::tolerance::Tolerance;

/// Which entity an id-based mismatch refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Element,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Element => write!(f, "element"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    /// Two elements of the second mesh have midpoints within tolerance of
    /// each other; no unique element mapping is possible.
    #[error(
        "two elements in the second mesh have the same midpoint (within {tolerance}): \
         element {elem1} at {coords1:?} and element {elem2} at {coords2:?}; \
         no unique element mapping possible"
    )]
    DuplicateMidpoint {
        /// 0-based global element indices in the second mesh.
        elem1: usize,
        coords1: [f64; 3],
        elem2: usize,
        coords2: [f64; 3],
        tolerance: Tolerance,
    },

    /// An element of the first mesh has no counterpart within tolerance.
    #[error(
        "meshes are different: could not match element {element} from block {block_id} \
         of the first mesh to the second (coordinate tolerance {tolerance})"
    )]
    ElementUnmatched {
        /// 1-based element index within its block.
        element: usize,
        block_id: i64,
        tolerance: Tolerance,
    },

    /// A matched element pair has different node counts; the meshes are not
    /// the same topology.
    #[error(
        "meshes are different: element {element1} of block {block_id1} matched \
         element {element2} of block {block_id2}, but they have {nodes1} and {nodes2} \
         nodes per element"
    )]
    ElementSizeMismatch {
        element1: usize,
        block_id1: i64,
        element2: usize,
        block_id2: i64,
        nodes1: usize,
        nodes2: usize,
    },

    /// A local node of a matched element pair has no counterpart within
    /// tolerance. Carries both elements' local node coordinates.
    #[error(
        "meshes are different: element {element1} of block {block_id1} matched \
         element {element2} of block {block_id2}, but local node {local_node} has no \
         counterpart within {tolerance}\n  first element nodes:  {nodes1:?}\n  \
         second element nodes: {nodes2:?}"
    )]
    NodeUnmatched {
        element1: usize,
        block_id1: i64,
        element2: usize,
        block_id2: i64,
        /// 0-based local node index within the first element.
        local_node: usize,
        nodes1: Vec<[f64; 3]>,
        nodes2: Vec<[f64; 3]>,
        tolerance: Tolerance,
    },

    /// A node of the first mesh mapped to two different nodes of the second
    /// across different elements.
    #[error(
        "no unique node mapping possible: node {node1} of the first mesh at \
         {coords1:?} maps to both node {prev} at {prev_coords:?} and node {next} \
         at {next_coords:?} of the second"
    )]
    AmbiguousNodeMapping {
        /// 0-based node index in the first mesh.
        node1: usize,
        coords1: [f64; 3],
        /// 0-based node indices in the second mesh.
        prev: usize,
        prev_coords: [f64; 3],
        next: usize,
        next_coords: [f64; 3],
    },

    /// The two meshes have different numbers of free (unconnected) nodes.
    #[error(
        "meshes are different: free node count is {count1} in the first mesh \
         but {count2} in the second"
    )]
    FreeNodeCountMismatch { count1: usize, count2: usize },

    /// Some free nodes could not be paired within tolerance.
    #[error("unable to match all free nodes: {remaining} unmatched nodes remain")]
    FreeNodesUnmatched { remaining: usize },

    /// An externally stored global id exists in one file but not the other.
    #[error("unable to match {entity} {id} in the first file with a {entity} in the second")]
    IdUnmatched { entity: EntityKind, id: i64 },

    /// Entity counts disagree where the strategy requires them to match.
    #[error("meshes have different {entity} counts: {count1} vs {count2}")]
    CountMismatch {
        entity: EntityKind,
        count1: usize,
        count2: usize,
    },
}

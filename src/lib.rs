//! Geometric correspondence and tolerance-based comparison of
//! finite-element meshes.
//!
//! Given two datasets of the same physical mesh whose nodes and elements may
//! be stored in different orders, this crate recovers the node and element
//! index maps between them ([`compute_maps`] and friends), decides whether
//! two scalar samples differ under a configurable tolerance policy
//! ([`Tolerance`]), and aligns time steps of one file against the sample list
//! of the other ([`find_bracket`]).
//!
//! Reading and writing the on-disk results format, option parsing and diff
//! reporting are left to the caller.

pub mod centroid_index;
pub mod config;
pub mod error;
pub mod mapping;
pub mod mesh;
pub mod separation;
pub mod sort;
pub mod time_align;
pub mod tolerance;

pub use centroid_index::CentroidIndex;
pub use config::ComparisonConfig;
pub use error::{EntityKind, MatchError};
pub use mapping::{compute_fileid_maps, compute_maps, compute_partial_maps, CorrespondenceMap};
pub use mesh::{ElementBlock, Mesh};
pub use separation::min_coord_separation;
pub use time_align::{find_bracket, interpolate, TimeInterp};
pub use tolerance::{FloorMode, Tolerance, ToleranceKind};

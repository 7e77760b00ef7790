//! Per-run comparison configuration.
//!
//! An explicit value passed by reference into every entry point; nothing in
//! the crate keeps comparison state in globals.

use crate::tolerance::{FloorMode, Tolerance, ToleranceKind};

/// Settings shared by one mesh-comparison run.
#[derive(Clone, Copy, Debug)]
pub struct ComparisonConfig {
    /// Tolerance applied to nodal and centroid coordinates during matching.
    pub coord_tol: Tolerance,
    /// Tolerance for time-step alignment; the driver forwards it to
    /// [`find_bracket`](crate::time_align::find_bracket), which takes its
    /// tolerance as a parameter.
    pub time_tol: Tolerance,
    /// Accept the first candidate when several elements share a midpoint
    /// within tolerance, instead of failing.
    pub ignore_dups: bool,
    /// Log the list of unmatched elements during partial matching.
    pub show_unmatched: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            coord_tol: Tolerance::new(ToleranceKind::Relative, 1.0e-6, 0.0),
            time_tol: Tolerance::new(ToleranceKind::Relative, 1.0e-6, 0.0),
            ignore_dups: false,
            show_unmatched: false,
        }
    }
}

impl ComparisonConfig {
    /// Select one floor semantics for every tolerance in this run.
    ///
    /// Keeping the mode on the config rather than on individual tolerances
    /// guarantees it is applied identically everywhere a tolerance is
    /// evaluated within a run.
    pub fn set_floor_mode(&mut self, mode: FloorMode) {
        self.coord_tol.floor_mode = mode;
        self.time_tol.floor_mode = mode;
    }
}

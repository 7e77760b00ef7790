//! Time-step alignment between two result files.

use serde::Serialize;

use crate::tolerance::{Tolerance, ToleranceKind};

/// Bracketing sample pair for one target time.
///
/// `step1 == step2` signals an exact (within-tolerance) match with
/// `proportion == 0`. Computed fresh per time step; immutable value type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimeInterp {
    /// `None` when the target time precedes every sample.
    pub step1: Option<usize>,
    /// `None` when the target time follows every sample.
    pub step2: Option<usize>,
    /// The target time this bracket was computed for.
    pub time: f64,
    /// Position of the target inside the bracket, in `[0, 1)`.
    pub proportion: f64,
}

/// Find the pair of samples in `times` (ascending) bracketing `target_time`.
///
/// The scan is tolerance-aware: a sample past the target that `time_tol`
/// reports as effectively equal to it is absorbed into the bracket rather
/// than left strictly above, and a bracket whose lower sample matches the
/// target within tolerance collapses to an exact match.
pub fn find_bracket(target_time: f64, times: &[f64], time_tol: &Tolerance) -> TimeInterp {
    let mut out = TimeInterp {
        step1: None,
        step2: None,
        time: target_time,
        proportion: 0.0,
    };
    if times.is_empty() {
        return out;
    }
    if target_time < times[0] {
        out.step2 = Some(0);
        return out;
    }
    let last = times.len() - 1;
    if target_time > times[last] {
        out.step1 = Some(last);
        return out;
    }

    // Last index at or below the target, snapping within-tolerance samples.
    let mut tbef = 0;
    for (i, &t) in times.iter().enumerate().skip(1) {
        if t <= target_time {
            tbef = i;
        } else if time_tol.kind != ToleranceKind::Ignore
            && !time_tol.is_different(target_time, t)
        {
            tbef = i;
        } else {
            break;
        }
    }

    if !time_tol.is_different(target_time, times[tbef]) {
        out.step1 = Some(tbef);
        out.step2 = Some(tbef);
        return out;
    }

    debug_assert!(tbef + 1 <= last);
    out.step1 = Some(tbef);
    out.step2 = Some(tbef + 1);
    let t1 = times[tbef];
    let t2 = times[tbef + 1];
    out.proportion = (target_time - t1) / (t2 - t1);
    out
}

/// Linear interpolation between the two bracketing samples.
#[inline]
pub fn interpolate(v1: f64, v2: f64, proportion: f64) -> f64 {
    (1.0 - proportion) * v1 + proportion * v2
}

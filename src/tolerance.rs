//! Tolerance policies deciding whether two scalar samples differ.

use std::fmt;

use serde::Serialize;

/// Comparison rule applied by a [`Tolerance`].
///
/// The `Eigen*` kinds apply the same formulas as their plain counterparts but
/// to `|v1|` and `|v2|`, so that eigenvector-like data with arbitrary sign
/// compares equal under a sign flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ToleranceKind {
    Relative,
    Absolute,
    Combined,
    EigenRelative,
    EigenAbsolute,
    EigenCombined,
    UlpsFloat,
    UlpsDouble,
    Ignore,
}

/// Which floor semantics a run uses.
///
/// The two modes are not equivalent: `Default` gates on the magnitudes of the
/// two values, `Legacy` gates on the magnitude of their difference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FloorMode {
    /// Values are equal outright when `|v1| <= floor` and `|v2| <= floor`.
    #[default]
    Default,
    /// Values are equal outright when `|v1 - v2| < floor`.
    Legacy,
}

/// A single comparison policy: rule, threshold and floor.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Tolerance {
    pub kind: ToleranceKind,
    /// Threshold magnitude, `>= 0`.
    pub value: f64,
    /// Sub-threshold below which values are deemed equal outright, `>= 0`.
    pub floor: f64,
    pub floor_mode: FloorMode,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(ToleranceKind::Relative, 1.0e-6, 0.0)
    }
}

impl Tolerance {
    pub fn new(kind: ToleranceKind, value: f64, floor: f64) -> Self {
        Self {
            kind,
            value,
            floor,
            floor_mode: FloorMode::default(),
        }
    }

    /// Copy of this tolerance with a different comparison rule.
    ///
    /// Used by the matching passes to substitute `Absolute` for `Ignore`
    /// without touching the caller's configuration.
    pub fn with_kind(&self, kind: ToleranceKind) -> Self {
        Self { kind, ..*self }
    }

    /// True when the floor gate treats `v1` and `v2` as equal outright.
    #[inline]
    fn floored(&self, v1: f64, v2: f64) -> bool {
        match self.floor_mode {
            FloorMode::Default => v1.abs() <= self.floor && v2.abs() <= self.floor,
            FloorMode::Legacy => (v1 - v2).abs() < self.floor,
        }
    }

    /// Decide whether `v1` and `v2` differ under this policy.
    ///
    /// `NaN` handling is the caller's responsibility; invalid-value scanning
    /// is a separate concern.
    pub fn is_different(&self, v1: f64, v2: f64) -> bool {
        if self.kind == ToleranceKind::Ignore {
            return false;
        }
        if self.floored(v1, v2) {
            return false;
        }
        match self.kind {
            ToleranceKind::Relative => {
                if v1 == 0.0 && v2 == 0.0 {
                    return false;
                }
                let max = v1.abs().max(v2.abs());
                (v1 - v2).abs() / max > self.value
            }
            ToleranceKind::Absolute => (v1 - v2).abs() > self.value,
            ToleranceKind::Combined => {
                // Absolute tolerance when both magnitudes are below 1,
                // relative tolerance otherwise. The historical decision
                // operator is `>=`, unlike the other kinds.
                let tol = 1.0_f64.max(v1.abs().max(v2.abs()));
                (v1 - v2).abs() >= self.value * tol
            }
            ToleranceKind::EigenRelative => {
                if v1 == 0.0 && v2 == 0.0 {
                    return false;
                }
                let max = v1.abs().max(v2.abs());
                (v1.abs() - v2.abs()).abs() / max > self.value
            }
            ToleranceKind::EigenAbsolute => (v1.abs() - v2.abs()).abs() > self.value,
            ToleranceKind::EigenCombined => {
                let tol = 1.0_f64.max(v1.abs().max(v2.abs()));
                (v1.abs() - v2.abs()).abs() >= self.value * tol
            }
            ToleranceKind::UlpsFloat => ulps_distance_f32(v1 as f32, v2 as f32) > self.value,
            ToleranceKind::UlpsDouble => ulps_distance_f64(v1, v2) > self.value,
            ToleranceKind::Ignore => false,
        }
    }

    /// Magnitude of the difference between `v1` and `v2` under this policy.
    ///
    /// Always `>= 0` and symmetric in its arguments. The same quantity
    /// [`is_different`](Self::is_different) compares against the threshold,
    /// except that `Combined` divides by its scale factor unconditionally
    /// (historical inconsistency, preserved as-is).
    pub fn difference(&self, v1: f64, v2: f64) -> f64 {
        if self.kind == ToleranceKind::Ignore {
            return 0.0;
        }
        if self.floored(v1, v2) {
            return 0.0;
        }
        match self.kind {
            ToleranceKind::Relative => {
                if v1 == 0.0 && v2 == 0.0 {
                    return 0.0;
                }
                let max = v1.abs().max(v2.abs());
                (v1 - v2).abs() / max
            }
            ToleranceKind::Absolute => (v1 - v2).abs(),
            ToleranceKind::Combined => {
                let tol = 1.0_f64.max(v1.abs().max(v2.abs()));
                (v1 - v2).abs() / tol
            }
            ToleranceKind::EigenRelative => {
                if v1 == 0.0 && v2 == 0.0 {
                    return 0.0;
                }
                let max = v1.abs().max(v2.abs());
                (v1.abs() - v2.abs()).abs() / max
            }
            ToleranceKind::EigenAbsolute => (v1.abs() - v2.abs()).abs(),
            ToleranceKind::EigenCombined => {
                let tol = 1.0_f64.max(v1.abs().max(v2.abs()));
                (v1.abs() - v2.abs()).abs() / tol
            }
            ToleranceKind::UlpsFloat => ulps_distance_f32(v1 as f32, v2 as f32),
            ToleranceKind::UlpsDouble => ulps_distance_f64(v1, v2),
            ToleranceKind::Ignore => 0.0,
        }
    }

    /// Stable long-form name of the comparison rule, for reporting.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ToleranceKind::Relative => "relative",
            ToleranceKind::Absolute => "absolute",
            ToleranceKind::Combined => "combined",
            ToleranceKind::EigenRelative => "eigen_relative",
            ToleranceKind::EigenAbsolute => "eigen_absolute",
            ToleranceKind::EigenCombined => "eigen_combined",
            ToleranceKind::UlpsFloat => "ulps_float",
            ToleranceKind::UlpsDouble => "ulps_double",
            ToleranceKind::Ignore => "ignore",
        }
    }

    /// Stable 3-letter abbreviation of the comparison rule, for reporting.
    pub fn abbrev(&self) -> &'static str {
        match self.kind {
            ToleranceKind::Relative => "rel",
            ToleranceKind::Absolute => "abs",
            ToleranceKind::Combined => "com",
            ToleranceKind::EigenRelative => "erl",
            ToleranceKind::EigenAbsolute => "eab",
            ToleranceKind::EigenCombined => "ecm",
            ToleranceKind::UlpsFloat => "upf",
            ToleranceKind::UlpsDouble => "upd",
            ToleranceKind::Ignore => "ign",
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:e} floor {:e}", self.type_name(), self.value, self.floor)
    }
}

/// Map IEEE-754 bits onto a monotone integer line: sign-magnitude becomes a
/// two's-complement ordering where adjacent representable values are adjacent
/// integers and both zeros coincide.
#[inline]
fn ordered_bits_f64(v: f64) -> i64 {
    let b = v.to_bits() as i64;
    if b < 0 {
        i64::MIN - b
    } else {
        b
    }
}

#[inline]
fn ordered_bits_f32(v: f32) -> i32 {
    let b = v.to_bits() as i32;
    if b < 0 {
        i32::MIN - b
    } else {
        b
    }
}

/// Bit-pattern distance between two doubles: how many representable steps
/// separate them on the number line.
pub fn ulps_distance_f64(v1: f64, v2: f64) -> f64 {
    let a = ordered_bits_f64(v1) as i128;
    let b = ordered_bits_f64(v2) as i128;
    (a - b).unsigned_abs() as f64
}

/// Bit-pattern distance between two values after rounding both to `f32`.
pub fn ulps_distance_f32(v1: f32, v2: f32) -> f64 {
    let a = ordered_bits_f32(v1) as i64;
    let b = ordered_bits_f32(v2) as i64;
    (a - b).unsigned_abs() as f64
}

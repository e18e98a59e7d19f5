use crate::SkError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SkError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SkError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, SkError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(SkError::NonPositive { what, value: v })
    }
}

/// Closed interval `[lower, upper]` on a single joint coordinate.
///
/// Either end may be infinite; an interval with `lower > upper` is rejected
/// by [`Bounds::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub lower: Real,
    pub upper: Real,
}

impl Bounds {
    pub fn new(lower: Real, upper: Real) -> Result<Self, SkError> {
        if lower.is_nan() || upper.is_nan() {
            return Err(SkError::InvalidArg {
                what: "bounds contain NaN",
            });
        }
        if lower > upper {
            return Err(SkError::InvalidArg {
                what: "bounds lower exceeds upper",
            });
        }
        Ok(Self { lower, upper })
    }

    /// `[-limit, limit]`; `limit` is taken by magnitude.
    pub fn symmetric(limit: Real) -> Self {
        let limit = limit.abs();
        Self {
            lower: -limit,
            upper: limit,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            lower: Real::NEG_INFINITY,
            upper: Real::INFINITY,
        }
    }

    /// The degenerate interval `[0, 0]`.
    pub fn zero() -> Self {
        Self {
            lower: 0.0,
            upper: 0.0,
        }
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.lower && v <= self.upper
    }

    pub fn is_zero(&self) -> bool {
        self.lower == 0.0 && self.upper == 0.0
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn symmetric_bounds_contain_origin(limit in -1e6_f64..1e6_f64) {
            let b = Bounds::symmetric(limit);
            prop_assert!(b.contains(0.0));
            prop_assert_eq!(b.lower, -b.upper);
        }
    }
}

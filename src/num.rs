//! Small numerical helpers shared by the geometry and the sweep.

use std::hash::Hash;

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the more principled wrappers in the `ordered_float` crate, this
/// one doesn't order NaNs, nor does it guard against them on construction.
/// Everything that reaches the sweep has already been checked for NaN by
/// [`crate::find_intersections`], so comparisons here never see one.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CheapOrderedFloat(f64);

impl CheapOrderedFloat {
    /// Retrieve the inner `f64`.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

impl Hash for CheapOrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // -0.0 and 0.0 compare equal, so they need to hash equally too.
        if self.0 == 0.0 {
            0.0f64.to_bits().hash(state)
        } else {
            self.0.to_bits().hash(state)
        }
    }
}

// Now comes the fishy stuff.
impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 < other.0 {
            std::cmp::Ordering::Less
        } else if self.0 > other.0 {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }
}

/// Are `a` and `b` equal, up to an absolute slack of `eps` or a relative slack
/// of a few ulps (whichever is bigger)?
///
/// Points computed by intersecting two segments get fed back in as sweep
/// heights, and they rarely land exactly on either segment.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    let slack = eps.max(a.abs().max(b.abs()) * (8.0 * f64::EPSILON));
    (a - b).abs() <= slack
}

/// A tolerance suitable for coordinates no larger (in absolute value) than `max_abs`.
pub fn default_eps(max_abs: f64) -> f64 {
    (max_abs * (f64::EPSILON * 64.0)).max(1e-9)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    // Kind of like Arbitrary, but
    // - it's a local trait, so we can impl it for whatever we want, and
    // - it only returns "reasonable" values.
    pub trait Reasonable {
        type Strategy: Strategy<Value = Self>;
        fn reasonable() -> Self::Strategy;
    }

    impl<S: Reasonable, T: Reasonable> Reasonable for (S, T) {
        type Strategy = (S::Strategy, T::Strategy);

        fn reasonable() -> Self::Strategy {
            (S::reasonable(), T::reasonable())
        }
    }

    impl Reasonable for f64 {
        type Strategy = BoxedStrategy<f64>;

        fn reasonable() -> Self::Strategy {
            (-1e3..1e3).boxed()
        }
    }

    #[test]
    fn signed_zeros() {
        let pos = CheapOrderedFloat::from(0.0);
        let neg = CheapOrderedFloat::from(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(pos.cmp(&neg), std::cmp::Ordering::Equal);

        let hash = |x: CheapOrderedFloat| {
            use std::hash::Hasher;
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            x.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(pos), hash(neg));
    }

    #[test]
    fn approx() {
        assert!(approx_eq(1.0, 1.0 + 1e-12, 1e-9));
        assert!(!approx_eq(1.0, 1.0 + 1e-6, 1e-9));
        // Large magnitudes get relative slack.
        assert!(approx_eq(1e12, 1e12 + 1e-3, 1e-9));
        assert_eq!(default_eps(0.0), 1e-9);
        assert!(default_eps(1e9) > 1e-9);
    }

    proptest! {
        #[test]
        fn order_matches_partial_cmp((a, b) in <(f64, f64)>::reasonable()) {
            let lhs = CheapOrderedFloat::from(a).cmp(&CheapOrderedFloat::from(b));
            prop_assert_eq!(Some(lhs), a.partial_cmp(&b));
        }
    }
}

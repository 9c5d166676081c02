//! Lattice operations shared by the value domains of the monitors.
//!
//! Boolean verdicts and robustness values are both bounded lattices: `false <= true` and
//! `-inf <= x <= inf`. Disjunction, `once` and the right operand of `since` accumulate with the
//! [`Join`], conjunction, `historically` and the left operand of `since` with the [`Meet`].

/// Greatest element of a type, the value of a formula that always holds.
///
/// ```rust
/// use pastel_core::Top;
///
/// assert_eq!(f64::top(), f64::INFINITY);
/// assert!(bool::top());
/// ```
pub trait Top {
    fn top() -> Self;
}

/// Least element of a type, the value of a formula that never held.
///
/// ```rust
/// use pastel_core::Bottom;
///
/// assert_eq!(f64::bottom(), f64::NEG_INFINITY);
/// ```
pub trait Bottom {
    fn bottom() -> Self;
}

/// Greatest lower bound of two values.
///
/// ```rust
/// use pastel_core::Meet;
///
/// assert_eq!(Meet::min(&1.0, &-2.0), -2.0);
/// assert!(!Meet::min(&true, &false));
/// ```
pub trait Meet: PartialOrd {
    fn min(&self, other: &Self) -> Self;
}

/// Least upper bound of two values, the dual of [`Meet`].
pub trait Join: PartialOrd {
    fn max(&self, other: &Self) -> Self;
}

macro_rules! lattice {
    ($t:ty, top = $top:expr, bottom = $bottom:expr, meet = $meet:expr, join = $join:expr) => {
        impl Top for $t {
            fn top() -> Self {
                $top
            }
        }

        impl Bottom for $t {
            fn bottom() -> Self {
                $bottom
            }
        }

        impl Meet for $t {
            fn min(&self, other: &Self) -> Self {
                $meet(*self, *other)
            }
        }

        impl Join for $t {
            fn max(&self, other: &Self) -> Self {
                $join(*self, *other)
            }
        }
    };
}

lattice!(f64, top = f64::INFINITY, bottom = f64::NEG_INFINITY, meet = f64::min, join = f64::max);
lattice!(bool, top = true, bottom = false, meet = |a, b| a && b, join = |a, b| a || b);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinities_absorb() {
        assert_eq!(Join::max(&f64::top(), &3.0), f64::INFINITY);
        assert_eq!(Meet::min(&f64::bottom(), &3.0), f64::NEG_INFINITY);
        assert_eq!(Meet::min(&f64::top(), &3.0), 3.0);
    }

    #[test]
    fn boolean_lattice() {
        assert!(Join::max(&false, &true));
        assert!(!Meet::min(&bool::top(), &bool::bottom()));
    }
}

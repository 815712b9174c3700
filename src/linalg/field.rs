//! The scalar abstraction used by the solver.

use std::fmt::Debug;
use std::ops::{Div, Mul, Sub};

use num_traits::{One, Zero};

/// A field the Gauss-Jordan solver can work over.
///
/// Besides the arithmetic operators, the solver needs two things from a
/// scalar: a magnitude to rank pivot candidates, and a zero test to decide
/// that no usable pivot exists.
pub trait Field:
    Copy + PartialOrd + Debug + Zero + One + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self>
{
    /// Magnitude used to rank pivot candidates.
    fn magnitude(self) -> Self;

    /// Whether `self` must be treated as zero as a pivot of a column whose
    /// largest entry has magnitude `scale`.
    fn is_negligible(self, scale: Self) -> bool;
}

impl Field for f64 {
    fn magnitude(self) -> Self {
        self.abs()
    }

    fn is_negligible(self, scale: Self) -> bool {
        // Relative to the column, but never looser than the absolute epsilon
        self.abs() <= f64::EPSILON * scale.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_negligible_is_relative() {
        assert!(0.0f64.is_negligible(1.0));
        assert!(1e-17f64.is_negligible(1.0));
        assert!(!1e-3f64.is_negligible(1.0));
        // Small against a 10 MOhm-sized entry
        assert!(1e-10f64.is_negligible(1e7));
        assert!(!1e-3f64.is_negligible(1e7));
    }

    #[test]
    fn test_f64_magnitude() {
        assert_eq!((-2.5f64).magnitude(), 2.5);
        assert_eq!(2.5f64.magnitude(), 2.5);
    }
}

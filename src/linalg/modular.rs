//! Integers modulo a prime, an exact field for checking the solver.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

use super::Field;

/// An element of Z/PZ.
///
/// `P` must be prime for division to be defined; this is checked when the
/// type is first used for division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModInt<const P: u64>(u64);

impl<const P: u64> ModInt<P> {
    const PRIME: () = assert!(is_prime(P), "ModInt modulus must be prime");

    /// Reduce `value` into the field.
    pub fn new(value: u64) -> Self {
        Self(value % P)
    }

    /// Canonical representative in `0..P`.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Raise to a power by repeated squaring.
    pub fn pow(self, mut exp: u64) -> Self {
        let mut base = self;
        let mut acc = Self::one();
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc * base;
            }
            base = base * base;
            exp >>= 1;
        }
        acc
    }

    /// Multiplicative inverse by Fermat's little theorem.
    ///
    /// # Panics
    /// On zero.
    pub fn inverse(self) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::PRIME;
        assert!(self.0 != 0, "zero has no inverse in Z/{}Z", P);
        self.pow(P - 2)
    }
}

const fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

impl<const P: u64> fmt::Display for ModInt<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mod {})", self.0, P)
    }
}

impl<const P: u64> Add for ModInt<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self((self.0 + rhs.0) % P)
    }
}

impl<const P: u64> Sub for ModInt<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self((self.0 + P - rhs.0) % P)
    }
}

impl<const P: u64> Neg for ModInt<P> {
    type Output = Self;

    fn neg(self) -> Self {
        Self((P - self.0) % P)
    }
}

impl<const P: u64> Mul for ModInt<P> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as u128 * rhs.0 as u128) % P as u128) as u64)
    }
}

impl<const P: u64> Div for ModInt<P> {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Self) -> Self {
        self * rhs.inverse()
    }
}

impl<const P: u64> Zero for ModInt<P> {
    fn zero() -> Self {
        Self(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl<const P: u64> One for ModInt<P> {
    fn one() -> Self {
        Self(1 % P)
    }
}

impl<const P: u64> Field for ModInt<P> {
    fn magnitude(self) -> Self {
        self
    }

    fn is_negligible(self, _scale: Self) -> bool {
        self.0 == 0
    }
}

//! Dense linear algebra over an abstract field.
//!
//! The circuit solver only ever needs one operation: solve a square system
//! `A·x = b`. It is written once, generically over [`Field`], so the exact
//! same elimination code runs on `f64` circuit matrices and on exact
//! [`ModInt`] systems used to check it.
//!
//! ## Algorithm
//!
//! Gauss-Jordan elimination with partial pivoting:
//!
//! 1. For column `k`, pick the remaining row with the largest-magnitude entry
//! 2. If that entry is negligible, the matrix is singular
//! 3. Scale the pivot row so the pivot becomes one
//! 4. Eliminate column `k` from *every* other row (above and below)
//!
//! After the last column the right-hand side holds the solution directly.

mod dense;
mod field;
mod modular;

pub use dense::{solve_in_place, DenseMatrix, SolveError};
pub use field::Field;
pub use modular::ModInt;

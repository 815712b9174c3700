//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for circuit simulation.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C couple branch currents to the nodes they flow between
//! - D holds the branch self-terms (0 for ideal sources and closed switches,
//!   -L/dt for inductors, -R_off for open switches)
//! - v is the vector of node voltages
//! - j is the vector of branch currents
//! - i is the sum of current sources into each node
//! - e is the vector of branch right-hand sides
//!
//! Rows are handed out afresh every step: node voltages first in node-creation
//! order, then branch currents in device-insertion order. Ground never gets a
//! row.

mod mna;
mod simulator;

pub use mna::{CircuitMatrix, StampContext};
pub use simulator::{RunReport, SimulationConfig};

/// Default time step: one sample at 44.1 kHz.
pub const DEFAULT_TIMESTEP: f64 = 1.0 / 44_100.0;

/// Default resistance of an open switch (10 MOhm).
pub const DEFAULT_SWITCH_OFF_RESISTANCE: f64 = 10e6;

//! # SimLogue
//!
//! A discrete-time analog circuit simulator.
//!
//! This library provides:
//! - A line-oriented netlist language for describing circuits
//! - Modified Nodal Analysis (MNA) based transient simulation
//! - Linear components (R, C, L), ideal sources and scheduled switches
//! - Scopes that record voltages and currents every step and export CSV tables
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Interpreter for the netlist language
//! - [`circuit`] - Node/device arenas, connection and validation
//! - [`components`] - Component models and their stamping contract
//! - [`solver`] - MNA matrix assembly and the step/run loop
//! - [`linalg`] - Dense Gauss-Jordan solver over an abstract field
//! - [`scope`] - Recorded probes and their tables
//!
//! ## Usage
//!
//! ```no_run
//! use simlogue::{dsl, Circuit};
//!
//! let mut circuit = Circuit::new(1e-5);
//! dsl::load_file("rc.circuit", &mut circuit)?;
//! circuit.run_for_seconds(0.005)?;
//! circuit.export_scopes("./tables/")?;
//! # Ok::<(), simlogue::SimError>(())
//! ```
//!
//! ## Circuit Simulation Method
//!
//! For each time step dt:
//!
//! 1. Number the unknowns: node voltages, then branch currents
//! 2. Let every device stamp its contribution into A and z
//! 3. Solve Ax = z and hand the solution back to the devices
//!
//! Reactive elements (C, L) are discretized with backward Euler, so every
//! step is a single linear solve.

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod linalg;
pub mod scope;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Circuit, DeviceId, NodeId, Pin, ScopeId};
pub use error::{Result, SimError};
pub use solver::{RunReport, SimulationConfig};

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

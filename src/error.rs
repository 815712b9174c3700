//! Error types for the SimLogue circuit simulator.
//!
//! This module provides a unified error type [`SimError`] that covers
//! all recoverable error conditions that can occur while loading a netlist,
//! building a circuit, and stepping the simulation.
//!
//! Misuse of the programmatic API (a terminal index a device does not have,
//! a current query across two devices) is not represented here: those are
//! programmer errors and panic.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for all SimLogue operations.
#[derive(Error, Debug)]
pub enum SimError {
    // ============ Netlist Errors ============
    /// Malformed netlist line
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    // ============ Circuit Errors ============
    /// A device terminal was never connected to a net
    #[error("Pin '{pin}' is not connected to any node")]
    UnconnectedPin { pin: String },

    /// A switch operation was requested on another kind of device
    #[error("Device '{name}' is not a switch")]
    NotASwitch { name: String },

    // ============ Simulation Errors ============
    /// The solver found no usable pivot
    #[error("Singular matrix at time={time:.6e}s (step={step}, column={column}) - circuit may have conflicting sources or a floating node")]
    SingularMatrix {
        step: usize,
        time: f64,
        column: usize,
    },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a scope table
    #[error("Failed to export scope table '{}': {source}", path.display())]
    ScopeExport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SimError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }

    /// Whether this error is a numerical failure of the solver.
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::SingularMatrix { .. })
    }
}

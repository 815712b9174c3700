//! Circuit graph representation and validation.
//!
//! This module provides the in-memory circuit: the node and device arenas,
//! the handles used to address them, and the net-unification rule applied
//! by [`Circuit::connect`]. The per-step solve lives in [`crate::solver`].

mod graph;
mod types;
mod validate;

pub use graph::{Circuit, GROUND_NAME};
pub use types::*;
pub use validate::validate_circuit;

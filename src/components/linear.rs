//! Linear passive components: Resistor, Capacitor, Inductor.

use crate::circuit::NodeId;
use crate::solver::{CircuitMatrix, StampContext};

/// A resistor component.
#[derive(Debug, Clone)]
pub struct Resistor {
    pub name: String,
    pub nodes: [Option<NodeId>; 2],
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(name: impl Into<String>, resistance: f64) -> Self {
        Self {
            name: name.into(),
            nodes: [None; 2],
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        let n1 = ctx.row(self.nodes[0]);
        let n2 = ctx.row(self.nodes[1]);
        matrix.stamp_conductance(n1, n2, self.conductance());
    }

    /// Current from terminal a to terminal b at the latest solved voltages.
    pub fn current(&self, ctx: &StampContext) -> f64 {
        self.conductance() * (ctx.voltage(self.nodes[0]) - ctx.voltage(self.nodes[1]))
    }
}

/// A capacitor component.
///
/// In discrete-time simulation, a capacitor is modeled using a companion model.
/// Using backward Euler:
///   i(n) = (C/dt) * (v(n) - v(n-1))
///
/// This gives an equivalent conductance G_eq = C/dt in parallel with a
/// history current source G_eq * v(n-1).
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub name: String,
    pub nodes: [Option<NodeId>; 2],
    pub capacitance: f64,

    // State for discrete-time model
    /// Voltage across the capacitor after the previous step
    pub v_prev: f64,
    /// Current through the capacitor during the previous step
    pub i_prev: f64,
    /// C/dt for the step being computed
    admittance: f64,
}

impl Capacitor {
    /// Create a new, discharged capacitor.
    pub fn new(name: impl Into<String>, capacitance: f64) -> Self {
        Self {
            name: name.into(),
            nodes: [None; 2],
            capacitance,
            v_prev: 0.0,
            i_prev: 0.0,
            admittance: 0.0,
        }
    }

    /// Get the equivalent conductance for the backward-Euler companion model.
    pub fn conductance(&self, dt: f64) -> f64 {
        self.capacitance / dt
    }

    pub(crate) fn pre_stamp(&mut self, ctx: &StampContext) {
        self.admittance = self.conductance(ctx.timestep);
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        let n1 = ctx.row(self.nodes[0]);
        let n2 = ctx.row(self.nodes[1]);
        matrix.stamp_conductance(n1, n2, self.admittance);
        // History term pushes G_eq * v_prev back into n+
        matrix.stamp_current(n1, n2, -self.admittance * self.v_prev);
    }

    pub(crate) fn post_stamp(&mut self, ctx: &StampContext) {
        let v_now = ctx.voltage(self.nodes[0]) - ctx.voltage(self.nodes[1]);
        self.i_prev = self.admittance * (v_now - self.v_prev);
        self.v_prev = v_now;
    }
}

/// An inductor component.
///
/// Backward Euler gives
///   v(n) = (L/dt) * (i(n) - i(n-1))
///
/// The inductor current is kept as an explicit branch unknown, so the
/// inductor reserves one matrix row per step.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub name: String,
    pub nodes: [Option<NodeId>; 2],
    pub inductance: f64,
    /// Branch row for the step being computed
    pub branch: Option<usize>,

    /// Current through the inductor after the previous step
    pub i_prev: f64,
}

impl Inductor {
    /// Create a new inductor carrying no current.
    pub fn new(name: impl Into<String>, inductance: f64) -> Self {
        Self {
            name: name.into(),
            nodes: [None; 2],
            inductance,
            branch: None,
            i_prev: 0.0,
        }
    }

    /// Get the equivalent series resistance L/dt of the companion model.
    pub fn resistance(&self, dt: f64) -> f64 {
        self.inductance / dt
    }

    pub(crate) fn pre_stamp(&mut self, matrix: &mut CircuitMatrix) {
        self.branch = Some(matrix.reserve_row());
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        let br = self.branch.expect("inductor branch row is reserved in pre_stamp");
        let n1 = ctx.row(self.nodes[0]);
        let n2 = ctx.row(self.nodes[1]);
        let r_eq = self.resistance(ctx.timestep);

        matrix.stamp_branch(n1, n2, br, -r_eq);
        matrix.stamp_branch_rhs(br, -r_eq * self.i_prev);
    }

    pub(crate) fn post_stamp(&mut self, matrix: &CircuitMatrix) {
        if let Some(br) = self.branch {
            self.i_prev = matrix.solution(br);
        }
    }
}

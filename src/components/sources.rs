//! Voltage and current sources.

use crate::circuit::NodeId;
use crate::solver::{CircuitMatrix, StampContext};

/// A single-terminal voltage source, referenced to ground.
///
/// Forces V[a] = voltage through a branch current unknown. When its terminal
/// sits on the ground node there is nothing to enforce and no row is
/// reserved; the circuit's own ground device is such a source.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub name: String,
    pub nodes: [Option<NodeId>; 1],
    pub voltage: f64,
    /// Branch row for the step being computed, if any
    pub branch: Option<usize>,
    /// Branch current from the terminal into the source
    pub current: f64,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(name: impl Into<String>, voltage: f64) -> Self {
        Self {
            name: name.into(),
            nodes: [None],
            voltage,
            branch: None,
            current: 0.0,
        }
    }

    pub(crate) fn pre_stamp(&mut self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        self.branch = match ctx.row(self.nodes[0]) {
            Some(_) => Some(matrix.reserve_row()),
            None => None,
        };
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        if let Some(br) = self.branch {
            let n = ctx.row(self.nodes[0]);
            matrix.stamp_branch(n, None, br, 0.0);
            matrix.stamp_branch_rhs(br, self.voltage);
        }
    }

    pub(crate) fn post_stamp(&mut self, matrix: &CircuitMatrix) {
        self.current = match self.branch {
            Some(br) => matrix.solution(br),
            None => 0.0,
        };
    }
}

/// A voltage source between two terminals.
///
/// The source enforces: V[a] - V[b] = voltage
#[derive(Debug, Clone)]
pub struct VoltageSource2Pin {
    pub name: String,
    pub nodes: [Option<NodeId>; 2],
    pub voltage: f64,
    pub branch: Option<usize>,
    /// Branch current from a to b through the source
    pub current: f64,
}

impl VoltageSource2Pin {
    /// Create a new two-terminal voltage source.
    pub fn new(name: impl Into<String>, voltage: f64) -> Self {
        Self {
            name: name.into(),
            nodes: [None; 2],
            voltage,
            branch: None,
            current: 0.0,
        }
    }

    pub(crate) fn pre_stamp(&mut self, matrix: &mut CircuitMatrix) {
        self.branch = Some(matrix.reserve_row());
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        let br = self.branch.expect("source branch row is reserved in pre_stamp");
        let n1 = ctx.row(self.nodes[0]);
        let n2 = ctx.row(self.nodes[1]);
        matrix.stamp_branch(n1, n2, br, 0.0);
        matrix.stamp_branch_rhs(br, self.voltage);
    }

    pub(crate) fn post_stamp(&mut self, matrix: &CircuitMatrix) {
        if let Some(br) = self.branch {
            self.current = matrix.solution(br);
        }
    }
}

/// A current source component.
///
/// Current sources add directly to the RHS vector of the MNA equations.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub name: String,
    pub nodes: [Option<NodeId>; 2], // current flows from a to b through the source
    pub current: f64,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(name: impl Into<String>, current: f64) -> Self {
        Self {
            name: name.into(),
            nodes: [None; 2],
            current,
        }
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        let n1 = ctx.row(self.nodes[0]);
        let n2 = ctx.row(self.nodes[1]);
        matrix.stamp_current(n1, n2, self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Node;

    #[test]
    fn test_grounded_source_reserves_nothing() {
        let nodes = vec![Node::ground()];
        let ctx = StampContext::new(&nodes, 1e-3, 0);
        let mut gnd = VoltageSource::new("GND", 0.0);
        gnd.nodes = [Some(NodeId::GROUND)];

        let mut m = CircuitMatrix::new();
        gnd.pre_stamp(&mut m, &ctx);
        assert_eq!(gnd.branch, None);
        assert_eq!(m.size(), 0);

        m.init();
        gnd.stamp(&mut m, &ctx);
        gnd.post_stamp(&m);
        assert_eq!(gnd.current, 0.0);
    }

    #[test]
    fn test_two_pin_source_stamp() {
        let mut a = Node::new();
        a.row = Some(0);
        let mut b = Node::new();
        b.row = Some(1);
        let nodes = vec![Node::ground(), a, b];
        let ctx = StampContext::new(&nodes, 1e-3, 0);

        let mut v = VoltageSource2Pin::new("V1", 3.0);
        v.nodes = [Some(NodeId(1)), Some(NodeId(2))];

        let mut m = CircuitMatrix::new();
        m.reserve_row();
        m.reserve_row();
        v.pre_stamp(&mut m);
        m.init();
        v.stamp(&mut m, &ctx);

        assert_eq!(v.branch, Some(2));
        assert_eq!(m.get(2, 0), 1.0);
        assert_eq!(m.get(2, 1), -1.0);
        assert_eq!(m.get(2, 2), 0.0);
        assert_eq!(m.source(2), 3.0);
    }

    #[test]
    fn test_current_source_rhs_only() {
        let mut a = Node::new();
        a.row = Some(0);
        let nodes = vec![Node::ground(), a];
        let ctx = StampContext::new(&nodes, 1e-3, 0);

        let mut i = CurrentSource::new("I1", 2e-3);
        i.nodes = [Some(NodeId::GROUND), Some(NodeId(1))];

        let mut m = CircuitMatrix::new();
        m.reserve_row();
        m.init();
        i.stamp(&mut m, &ctx);

        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.source(0), 2e-3);
    }
}

//! MNA matrix assembly and solving.

use crate::circuit::{Node, NodeId};
use crate::linalg::{solve_in_place, DenseMatrix, SolveError};

/// Step-scoped MNA system `A·x = z`.
///
/// Built in two phases every step: rows are reserved (node voltages first,
/// then device branch currents), then [`init`](Self::init) allocates a zeroed
/// system of that size and devices add their stamps. All stamps are additive,
/// so the order in which devices stamp does not matter.
///
/// Row arguments are `Option<usize>`; `None` stands for the ground terminal,
/// whose equation and unknown are not part of the system.
#[derive(Debug)]
pub struct CircuitMatrix {
    /// System matrix A
    a: DenseMatrix<f64>,
    /// Source vector z
    z: Vec<f64>,
    /// Solution vector x (empty until solved)
    x: Vec<f64>,
    /// Rows reserved so far
    num_rows: usize,
}

impl CircuitMatrix {
    /// Create an empty matrix with no reserved rows.
    pub fn new() -> Self {
        Self {
            a: DenseMatrix::zeros(0, 0),
            z: Vec::new(),
            x: Vec::new(),
            num_rows: 0,
        }
    }

    /// Forget all reserved rows.
    pub fn reset_row_count(&mut self) {
        self.num_rows = 0;
    }

    /// Reserve the next row and return its index.
    pub fn reserve_row(&mut self) -> usize {
        let row = self.num_rows;
        self.num_rows += 1;
        row
    }

    /// Matrix dimension (the number of reserved rows).
    pub fn size(&self) -> usize {
        self.num_rows
    }

    /// Allocate a zeroed system sized to the reserved rows.
    pub fn init(&mut self) {
        self.a = DenseMatrix::zeros(self.num_rows, self.num_rows);
        self.z = vec![0.0; self.num_rows];
        self.x.clear();
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a.get(row, col)
    }

    /// Get source vector element.
    pub fn source(&self, row: usize) -> f64 {
        self.z[row]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a.add(row, col, value);
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp the coupling of a branch current unknown `br` flowing from n+ to
    /// n- through the device.
    ///
    /// The branch current leaves n+ and enters n- (KCL rows get +1/-1), and
    /// the branch equation reads
    ///   V[n+] - V[n-] + cross_value * I[br] = z[br]
    /// with `z[br]` supplied separately through [`stamp_branch_rhs`](Self::stamp_branch_rhs).
    ///
    /// - ideal voltage source: cross_value = 0, z = E
    /// - resistance R:         cross_value = -R, z = 0
    /// - inductor companion:   cross_value = -L/dt, z = -(L/dt) * i_prev
    pub fn stamp_branch(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, br: usize, cross_value: f64) {
        if let Some(i) = n_pos {
            self.add(br, i, 1.0);
            self.add(i, br, 1.0);
        }
        if let Some(j) = n_neg {
            self.add(br, j, -1.0);
            self.add(j, br, -1.0);
        }
        self.add(br, br, cross_value);
    }

    /// Add a constant to the right-hand side of a branch equation.
    pub fn stamp_branch_rhs(&mut self, br: usize, value: f64) {
        self.add_source(br, value);
    }

    /// Stamp a current source between two nodes.
    /// Current flows from n+ to n- through the source.
    pub fn stamp_current(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: f64) {
        // Current leaves n+ and enters n-
        if let Some(i) = n_pos {
            self.add_source(i, -current);
        }
        if let Some(j) = n_neg {
            self.add_source(j, current);
        }
    }

    /// Solve the assembled system.
    ///
    /// The matrix and source vector are consumed; on success the solution is
    /// available through [`solution`](Self::solution).
    pub fn solve(&mut self) -> Result<(), SolveError> {
        let mut a = std::mem::replace(&mut self.a, DenseMatrix::zeros(0, 0));
        let mut z = std::mem::take(&mut self.z);
        solve_in_place(&mut a, &mut z)?;
        self.x = z;
        Ok(())
    }

    /// Check whether a solution is available.
    pub fn is_solved(&self) -> bool {
        self.x.len() == self.num_rows && self.num_rows > 0
    }

    /// Get a solved unknown.
    ///
    /// # Panics
    /// If called before a successful [`solve`](Self::solve).
    pub fn solution(&self, row: usize) -> f64 {
        assert!(self.is_solved(), "solution read before the matrix was solved");
        self.x[row]
    }
}

impl Default for CircuitMatrix {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a device may look at while taking part in a step.
#[derive(Debug, Clone, Copy)]
pub struct StampContext<'a> {
    nodes: &'a [Node],
    /// Time step dt in seconds
    pub timestep: f64,
    /// 1 / dt
    pub timestep_inv: f64,
    /// Index of the step being computed
    pub step: usize,
}

impl<'a> StampContext<'a> {
    /// Create a context over the circuit's node arena.
    pub fn new(nodes: &'a [Node], timestep: f64, step: usize) -> Self {
        Self {
            nodes,
            timestep,
            timestep_inv: 1.0 / timestep,
            step,
        }
    }

    /// Matrix row of a terminal's node; `None` for ground.
    ///
    /// # Panics
    /// If the terminal was never connected. Circuits are validated before
    /// they are stepped.
    pub fn row(&self, node: Option<NodeId>) -> Option<usize> {
        let node = node.expect("stamping an unconnected terminal");
        let entry = &self.nodes[node.0];
        if entry.is_ground() {
            None
        } else {
            Some(entry.row.expect("node has no row for this step"))
        }
    }

    /// Latest solved voltage of a terminal's node.
    ///
    /// # Panics
    /// If the terminal was never connected.
    pub fn voltage(&self, node: Option<NodeId>) -> f64 {
        let node = node.expect("reading the voltage of an unconnected terminal");
        self.nodes[node.0].voltage
    }
}

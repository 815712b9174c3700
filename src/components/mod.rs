//! Component models for circuit simulation.
//!
//! This module provides models for all supported circuit components:
//! - Linear: Resistor, Capacitor, Inductor
//! - Sources: Voltage Source (1-pin and 2-pin), Current Source
//! - Controls: scheduled Switch
//!
//! Every component takes part in each simulation step in three phases,
//! always in device-insertion order:
//!
//! 1. `pre_stamp`: reserve branch rows, apply due events, precompute
//!    step-dependent coefficients
//! 2. `stamp`: add contributions to the MNA matrix (never mutates the device)
//! 3. `post_stamp`: read the solution back into the device's memory

mod controls;
mod linear;
mod sources;

pub use controls::{Switch, SwitchEvent, SwitchState};
pub use linear::{Capacitor, Inductor, Resistor};
pub use sources::{CurrentSource, VoltageSource, VoltageSource2Pin};

use crate::circuit::{terminal_name, NodeId};
use crate::solver::{CircuitMatrix, StampContext};

/// A circuit component.
#[derive(Debug, Clone)]
pub enum Device {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    VoltageSource(VoltageSource),
    VoltageSource2Pin(VoltageSource2Pin),
    CurrentSource(CurrentSource),
    Switch(Switch),
}

impl Device {
    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Device::Resistor(r) => &r.name,
            Device::Capacitor(c) => &c.name,
            Device::Inductor(l) => &l.name,
            Device::VoltageSource(v) => &v.name,
            Device::VoltageSource2Pin(v) => &v.name,
            Device::CurrentSource(i) => &i.name,
            Device::Switch(s) => &s.name,
        }
    }

    /// Netlist keyword for this kind of device.
    pub fn kind(&self) -> &'static str {
        match self {
            Device::Resistor(_) => "resistor",
            Device::Capacitor(_) => "capacitor",
            Device::Inductor(_) => "inductor",
            Device::VoltageSource(_) => "voltage_source",
            Device::VoltageSource2Pin(_) => "voltage_source_2pin",
            Device::CurrentSource(_) => "current_source",
            Device::Switch(_) => "switch",
        }
    }

    /// Terminal-to-node table.
    pub fn nodes(&self) -> &[Option<NodeId>] {
        match self {
            Device::Resistor(r) => &r.nodes,
            Device::Capacitor(c) => &c.nodes,
            Device::Inductor(l) => &l.nodes,
            Device::VoltageSource(v) => &v.nodes,
            Device::VoltageSource2Pin(v) => &v.nodes,
            Device::CurrentSource(i) => &i.nodes,
            Device::Switch(s) => &s.nodes,
        }
    }

    fn nodes_mut(&mut self) -> &mut [Option<NodeId>] {
        match self {
            Device::Resistor(r) => &mut r.nodes,
            Device::Capacitor(c) => &mut c.nodes,
            Device::Inductor(l) => &mut l.nodes,
            Device::VoltageSource(v) => &mut v.nodes,
            Device::VoltageSource2Pin(v) => &mut v.nodes,
            Device::CurrentSource(i) => &mut i.nodes,
            Device::Switch(s) => &mut s.nodes,
        }
    }

    /// Number of terminals (1 or 2).
    pub fn terminal_count(&self) -> usize {
        self.nodes().len()
    }

    /// Node of a terminal, `None` until connected.
    ///
    /// # Panics
    /// If the device has no such terminal.
    pub fn node(&self, terminal: usize) -> Option<NodeId> {
        self.check_terminal(terminal);
        self.nodes()[terminal]
    }

    /// Attach a terminal to a node.
    ///
    /// # Panics
    /// If the device has no such terminal.
    pub fn set_node(&mut self, terminal: usize, node: NodeId) {
        self.check_terminal(terminal);
        self.nodes_mut()[terminal] = Some(node);
    }

    /// Move every terminal on `from` to `to`.
    pub(crate) fn relabel_node(&mut self, from: NodeId, to: NodeId) {
        for slot in self.nodes_mut() {
            if *slot == Some(from) {
                *slot = Some(to);
            }
        }
    }

    /// Shift node handles above a removed arena slot down by one.
    pub(crate) fn compact_nodes_after(&mut self, removed: NodeId) {
        for node in self.nodes_mut().iter_mut().flatten() {
            if node.0 > removed.0 {
                node.0 -= 1;
            }
        }
    }

    /// Display name of a terminal, e.g. `R1.a`.
    pub fn pin_name(&self, terminal: usize) -> String {
        self.check_terminal(terminal);
        format!("{}.{}", self.name(), terminal_name(terminal))
    }

    fn check_terminal(&self, terminal: usize) {
        assert!(
            terminal < self.terminal_count(),
            "{} '{}' does not have terminal {}",
            self.kind(),
            self.name(),
            terminal
        );
    }

    /// Phase 1: reserve rows and update step-dependent state.
    pub fn pre_stamp(&mut self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        match self {
            Device::Capacitor(c) => c.pre_stamp(ctx),
            Device::Inductor(l) => l.pre_stamp(matrix),
            Device::VoltageSource(v) => v.pre_stamp(matrix, ctx),
            Device::VoltageSource2Pin(v) => v.pre_stamp(matrix),
            Device::Switch(s) => s.pre_stamp(matrix, ctx),
            Device::Resistor(_) | Device::CurrentSource(_) => {}
        }
    }

    /// Phase 2: add this device's contribution to the matrix.
    pub fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        match self {
            Device::Resistor(r) => r.stamp(matrix, ctx),
            Device::Capacitor(c) => c.stamp(matrix, ctx),
            Device::Inductor(l) => l.stamp(matrix, ctx),
            Device::VoltageSource(v) => v.stamp(matrix, ctx),
            Device::VoltageSource2Pin(v) => v.stamp(matrix, ctx),
            Device::CurrentSource(i) => i.stamp(matrix, ctx),
            Device::Switch(s) => s.stamp(matrix, ctx),
        }
    }

    /// Phase 3: refresh transient memory from the solved step.
    ///
    /// Node voltages in `ctx` are already the solved ones.
    pub fn post_stamp(&mut self, matrix: &CircuitMatrix, ctx: &StampContext) {
        match self {
            Device::Capacitor(c) => c.post_stamp(ctx),
            Device::Inductor(l) => l.post_stamp(matrix),
            Device::VoltageSource(v) => v.post_stamp(matrix),
            Device::VoltageSource2Pin(v) => v.post_stamp(matrix),
            Device::Switch(s) => s.post_stamp(matrix),
            Device::Resistor(_) | Device::CurrentSource(_) => {}
        }
    }

    /// Current through the device from terminal a to terminal b after the
    /// latest step (for a 1-pin source: from its terminal into the source).
    pub fn current(&self, ctx: &StampContext) -> f64 {
        match self {
            Device::Resistor(r) => r.current(ctx),
            Device::Capacitor(c) => c.i_prev,
            Device::Inductor(l) => l.i_prev,
            Device::VoltageSource(v) => v.current,
            Device::VoltageSource2Pin(v) => v.current,
            Device::CurrentSource(i) => i.current,
            Device::Switch(s) => s.current,
        }
    }

    /// Borrow as a switch, if it is one.
    pub fn as_switch_mut(&mut self) -> Option<&mut Switch> {
        match self {
            Device::Switch(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a switch, if it is one.
    pub fn as_switch(&self) -> Option<&Switch> {
        match self {
            Device::Switch(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_from_device {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Device {
                fn from(d: $variant) -> Self {
                    Device::$variant(d)
                }
            }
        )*
    };
}

impl_from_device!(
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    VoltageSource2Pin,
    CurrentSource,
    Switch,
);

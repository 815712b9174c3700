//! Circuit graph structure.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::types::{DeviceId, Node, NodeId, Pin, ScopeId};
use crate::components::{Device, SwitchState, VoltageSource};
use crate::error::{Result, SimError};
use crate::scope::{Scope, ScopeKind};
use crate::solver::{CircuitMatrix, SimulationConfig, StampContext};

/// Name of the predeclared ground device.
pub const GROUND_NAME: &str = "GND";

/// A circuit: node and device arenas, scopes, and the simulation clock.
///
/// Devices are added first and wired with [`connect`](Self::connect); the
/// run loop then repeatedly solves the circuit (see [`step`](Self::step)).
/// Device 0 is always the ground device, a 0 V source whose single terminal
/// sits on node 0.
#[derive(Debug)]
pub struct Circuit {
    /// Nets; index 0 is ground
    pub(crate) nodes: Vec<Node>,
    /// All devices in insertion order
    pub(crate) devices: Vec<Device>,
    /// Registered probes
    pub(crate) scopes: Vec<Scope>,
    pub(crate) config: SimulationConfig,
    pub(crate) matrix: CircuitMatrix,
    /// Steps simulated so far
    pub(crate) elapsed_steps: usize,
}

impl Circuit {
    /// Create an empty circuit (just ground) with the given time step.
    pub fn new(timestep: f64) -> Self {
        Self::with_config(SimulationConfig::default().with_timestep(timestep))
    }

    /// Create an empty circuit with a custom configuration.
    pub fn with_config(config: SimulationConfig) -> Self {
        let mut ground = VoltageSource::new(GROUND_NAME, 0.0);
        ground.nodes = [Some(NodeId::GROUND)];

        Self {
            nodes: vec![Node::ground()],
            devices: vec![ground.into()],
            scopes: Vec::new(),
            config,
            matrix: CircuitMatrix::new(),
            elapsed_steps: 0,
        }
    }

    /// Simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Time step in seconds.
    pub fn timestep(&self) -> f64 {
        self.config.timestep
    }

    /// Steps simulated so far.
    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    /// Simulated time so far, in seconds.
    pub fn time(&self) -> f64 {
        self.elapsed_steps as f64 * self.config.timestep
    }

    /// Nearest step index to a point in time.
    pub fn step_at(&self, seconds: f64) -> usize {
        (seconds / self.config.timestep).round() as usize
    }

    /// Add a device and return its handle. Its terminals start unconnected.
    ///
    /// A switch without an explicit open-state resistance takes the one from
    /// the circuit's configuration.
    pub fn add_device(&mut self, device: impl Into<Device>) -> DeviceId {
        let mut device = device.into();
        if let Some(switch) = device.as_switch_mut() {
            switch.inherit_off_resistance(self.config.switch_off_resistance);
        }
        let id = DeviceId(self.devices.len());
        self.devices.push(device);
        id
    }

    /// The ground device.
    pub fn ground(&self) -> DeviceId {
        DeviceId(0)
    }

    /// Get a device by handle.
    pub fn device(&self, id: DeviceId) -> &Device {
        &self.devices[id.0]
    }

    /// Get a device by handle, mutably.
    pub fn device_mut(&mut self, id: DeviceId) -> &mut Device {
        &mut self.devices[id.0]
    }

    /// All devices in insertion order.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// All nodes; index 0 is ground.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Find a device by name.
    pub fn find_device(&self, name: &str) -> Option<DeviceId> {
        self.devices.iter().position(|d| d.name() == name).map(DeviceId)
    }

    /// Node a pin is connected to, if any.
    ///
    /// # Panics
    /// If the device has no such terminal.
    pub fn pin_node(&self, pin: Pin) -> Option<NodeId> {
        self.device(pin.device).node(pin.terminal)
    }

    /// Display name of a pin, e.g. `R1.a`.
    pub fn pin_name(&self, pin: Pin) -> String {
        self.device(pin.device).pin_name(pin.terminal)
    }

    /// Latest solved voltage at a pin.
    ///
    /// # Panics
    /// If the pin is not connected.
    pub fn voltage(&self, pin: Pin) -> f64 {
        match self.pin_node(pin) {
            Some(node) => self.nodes[node.0].voltage,
            None => panic!("pin {} is not connected", self.pin_name(pin)),
        }
    }

    /// Connect two pins and return the node they now share.
    ///
    /// - Both already on the same node: nothing changes.
    /// - Neither connected: a new node is created for both.
    /// - One connected: the other joins its node.
    /// - On different nodes: the two nets are merged into the lower-indexed
    ///   node, so ground always survives a merge.
    pub fn connect(&mut self, a: Pin, b: Pin) -> NodeId {
        match (self.pin_node(a), self.pin_node(b)) {
            (Some(na), Some(nb)) if na == nb => na,
            (None, None) => {
                let node = NodeId(self.nodes.len());
                self.nodes.push(Node::new());
                self.device_mut(a.device).set_node(a.terminal, node);
                self.device_mut(b.device).set_node(b.terminal, node);
                node
            }
            (Some(node), None) => {
                self.device_mut(b.device).set_node(b.terminal, node);
                node
            }
            (None, Some(node)) => {
                self.device_mut(a.device).set_node(a.terminal, node);
                node
            }
            (Some(na), Some(nb)) => self.merge_nodes(na.min(nb), na.max(nb)),
        }
    }

    /// Fold `drop` into `keep` and remove it from the arena.
    fn merge_nodes(&mut self, keep: NodeId, drop: NodeId) -> NodeId {
        debug_assert!(keep < drop);
        log::debug!("merging node {} into {}", drop, keep);

        for device in self.devices.iter_mut() {
            device.relabel_node(drop, keep);
            device.compact_nodes_after(drop);
        }
        self.nodes.remove(drop.0);
        keep
    }

    /// Queue a switch transition at a step index.
    pub fn schedule_switch(&mut self, id: DeviceId, step: usize, state: SwitchState) -> Result<()> {
        if let Some(switch) = self.device_mut(id).as_switch_mut() {
            switch.schedule(step, state);
            return Ok(());
        }
        Err(SimError::NotASwitch {
            name: self.device(id).name().to_string(),
        })
    }

    /// Current from pin `a` to pin `b` through the device between them.
    ///
    /// Both pins must belong to the same two-terminal device, or one of them
    /// must be the terminal of a single-terminal source and the other any pin
    /// on ground. Swapping the arguments flips the sign.
    ///
    /// # Panics
    /// If the pins do not describe a current path through one device.
    pub fn current_between(&self, a: Pin, b: Pin) -> f64 {
        let ctx = StampContext::new(&self.nodes, self.config.timestep, self.elapsed_steps);

        if a.device == b.device {
            let device = self.device(a.device);
            assert!(
                a.terminal != b.terminal,
                "current between pin {} and itself",
                self.pin_name(a)
            );
            // validates both terminal indices
            let _ = (device.node(a.terminal), device.node(b.terminal));
            let current = device.current(&ctx);
            return if a.terminal == 0 { current } else { -current };
        }

        if self.is_grounded_source_path(a, b) {
            return self.device(a.device).current(&ctx);
        }
        if self.is_grounded_source_path(b, a) {
            return -self.device(b.device).current(&ctx);
        }

        panic!(
            "current between {} and {} does not flow through a single device",
            self.pin_name(a),
            self.pin_name(b)
        );
    }

    /// Whether current from `a` to `b` flows through exactly one device: two
    /// terminals of the same device, or a single-terminal source and a pin on
    /// ground.
    pub fn is_current_path(&self, a: Pin, b: Pin) -> bool {
        if a.device == b.device {
            a.terminal != b.terminal
        } else {
            self.is_grounded_source_path(a, b) || self.is_grounded_source_path(b, a)
        }
    }

    /// `source` is a single-terminal device and `other` sits on ground.
    fn is_grounded_source_path(&self, source: Pin, other: Pin) -> bool {
        self.device(source.device).terminal_count() == 1
            && source.terminal == 0
            && self.pin_node(other).map_or(false, |n| n.is_ground())
    }

    /// Probe the voltage between two pins every step.
    pub fn scope_voltage(&mut self, a: Pin, b: Pin) -> ScopeId {
        self.add_scope(ScopeKind::Voltage, a, b)
    }

    /// Probe the current from `a` to `b` every step.
    pub fn scope_current(&mut self, a: Pin, b: Pin) -> ScopeId {
        self.add_scope(ScopeKind::Current, a, b)
    }

    fn add_scope(&mut self, kind: ScopeKind, a: Pin, b: Pin) -> ScopeId {
        let name = format!("{}-between-{}-and-{}", kind, self.pin_name(a), self.pin_name(b));
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(kind, a, b, name));
        id
    }

    /// Get a scope by handle.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// All scopes in registration order.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Read the quantity a scope watches at the latest solved step.
    pub(crate) fn measure(&self, scope: &Scope) -> f64 {
        let (a, b) = scope.pins();
        match scope.kind() {
            ScopeKind::Voltage => self.voltage(a) - self.voltage(b),
            ScopeKind::Current => self.current_between(a, b),
        }
    }

    /// Write every scope to `<dir>/<scope name>.csv`, creating `dir` if needed.
    pub fn export_scopes(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        log::info!("Exporting {} tables to {}", self.scopes.len(), dir.display());

        fs::create_dir_all(dir).map_err(|source| SimError::ScopeExport {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(self.scopes.len());
        for scope in &self.scopes {
            let path = dir.join(format!("{}.csv", scope.name()));
            write_table(scope, &path).map_err(|source| SimError::ScopeExport {
                path: path.clone(),
                source,
            })?;
            log::debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn write_table(scope: &Scope, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    scope.write_csv(&mut out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Capacitor, Resistor, Switch};

    #[test]
    fn test_new_circuit_has_ground() {
        let circuit = Circuit::new(1e-3);
        assert_eq!(circuit.nodes().len(), 1);
        assert!(circuit.nodes()[0].is_ground());
        assert_eq!(circuit.device(circuit.ground()).name(), "GND");
        assert_eq!(circuit.pin_node(circuit.ground().pin(0)), Some(NodeId::GROUND));
    }

    #[test]
    fn test_connect_chain_shares_one_node() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let r2 = circuit.add_device(Resistor::new("R2", 1.0));
        let r3 = circuit.add_device(Resistor::new("R3", 1.0));

        let n = circuit.connect(r1.pin(1), r2.pin(0));
        assert_eq!(circuit.connect(r2.pin(0), r3.pin(0)), n);
        assert_eq!(circuit.nodes().len(), 2);

        // Reconnecting is a no-op
        assert_eq!(circuit.connect(r1.pin(1), r3.pin(0)), n);
        assert_eq!(circuit.nodes().len(), 2);
        assert_eq!(circuit.pin_node(r3.pin(0)), Some(n));
    }

    #[test]
    fn test_connect_merges_nets() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let r2 = circuit.add_device(Resistor::new("R2", 1.0));
        let c1 = circuit.add_device(Capacitor::new("C1", 1e-6));

        let n1 = circuit.connect(r1.pin(0), r2.pin(0)); // N1
        let n2 = circuit.connect(r1.pin(1), c1.pin(0)); // N2
        let n3 = circuit.connect(r2.pin(1), c1.pin(1)); // N3
        assert_eq!((n1, n2, n3), (NodeId(1), NodeId(2), NodeId(3)));

        // Merge N1 and N2: N2 disappears, N3 moves down to N2
        assert_eq!(circuit.connect(c1.pin(0), r2.pin(0)), NodeId(1));
        assert_eq!(circuit.nodes().len(), 3);
        assert_eq!(circuit.pin_node(r1.pin(0)), Some(NodeId(1)));
        assert_eq!(circuit.pin_node(r1.pin(1)), Some(NodeId(1)));
        assert_eq!(circuit.pin_node(c1.pin(1)), Some(NodeId(2)));
    }

    #[test]
    fn test_merge_into_ground_keeps_ground() {
        let mut circuit = Circuit::new(1e-3);
        let gnd = circuit.ground();
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let r2 = circuit.add_device(Resistor::new("R2", 1.0));

        circuit.connect(r1.pin(0), r2.pin(0));
        assert_eq!(circuit.connect(r2.pin(0), gnd.pin(0)), NodeId::GROUND);
        assert_eq!(circuit.nodes().len(), 1);
        assert_eq!(circuit.pin_node(r1.pin(0)), Some(NodeId::GROUND));
    }

    #[test]
    fn test_find_device() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        assert_eq!(circuit.find_device("R1"), Some(r1));
        assert_eq!(circuit.find_device("GND"), Some(circuit.ground()));
        assert_eq!(circuit.find_device("R2"), None);
    }

    #[test]
    fn test_schedule_on_non_switch_fails() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let s1 = circuit.add_device(Switch::new("S1", false));

        assert!(circuit.schedule_switch(s1, 10, SwitchState::On).is_ok());
        let err = circuit.schedule_switch(r1, 10, SwitchState::On).unwrap_err();
        assert!(matches!(err, SimError::NotASwitch { ref name } if name == "R1"));
    }

    #[test]
    fn test_switch_takes_configured_off_resistance() {
        let config = SimulationConfig::default().with_switch_off_resistance(1e9);
        let mut circuit = Circuit::with_config(config);
        let s1 = circuit.add_device(Switch::new("S1", false));
        let s2 = circuit.add_device(Switch::new("S2", false).with_off_resistance(5e6));

        let off = |id| circuit.device(id).as_switch().unwrap().off_resistance();
        assert_eq!(off(s1), 1e9);
        assert_eq!(off(s2), 5e6);
    }

    #[test]
    fn test_current_path_to_any_grounded_pin() {
        let mut circuit = Circuit::new(1e-3);
        let gnd = circuit.ground();
        let v1 = circuit.add_device(VoltageSource::new("V1", 1.0));
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let r2 = circuit.add_device(Resistor::new("R2", 1.0));
        circuit.connect(v1.pin(0), r1.pin(0));
        circuit.connect(r1.pin(1), gnd.pin(0));

        assert!(circuit.is_current_path(v1.pin(0), r1.pin(1)));
        assert!(circuit.is_current_path(r1.pin(1), v1.pin(0)));
        assert!(circuit.is_current_path(v1.pin(0), gnd.pin(0)));
        assert!(circuit.is_current_path(r1.pin(0), r1.pin(1)));
        assert!(!circuit.is_current_path(r1.pin(0), r1.pin(0)));
        assert!(!circuit.is_current_path(r1.pin(0), r2.pin(0)));
        assert!(!circuit.is_current_path(v1.pin(0), r2.pin(0)));
    }

    #[test]
    fn test_scope_names() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let v = circuit.scope_voltage(r1.pin(0), r1.pin(1));
        let i = circuit.scope_current(r1.pin(0), r1.pin(1));
        assert_eq!(circuit.scope(v).name(), "voltage-between-R1.a-and-R1.b");
        assert_eq!(circuit.scope(i).name(), "current-between-R1.a-and-R1.b");
    }

    #[test]
    fn test_step_at_rounds() {
        let circuit = Circuit::new(1e-5);
        assert_eq!(circuit.step_at(0.005), 500);
        assert_eq!(circuit.step_at(0.0), 0);
    }

    #[test]
    #[should_panic(expected = "does not flow through a single device")]
    fn test_current_across_devices_panics() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        let r2 = circuit.add_device(Resistor::new("R2", 1.0));
        circuit.connect(r1.pin(1), r2.pin(0));
        circuit.connect(r1.pin(0), r2.pin(1));
        let _ = circuit.current_between(r1.pin(0), r2.pin(1));
    }
}

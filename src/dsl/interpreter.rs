//! Applies parsed netlist statements to a [`Circuit`].

use std::collections::HashMap;

use super::ast::*;
use super::parser::Parser;
use crate::circuit::{terminal_index, Circuit, DeviceId, Pin, GROUND_NAME};
use crate::components::{Capacitor, CurrentSource, Device, Inductor, Resistor, Switch, SwitchState, VoltageSource};
use crate::error::{Result, SimError};
use crate::scope::ScopeKind;

/// A statement with every name resolved against the circuit.
///
/// Nothing touches the circuit until a whole line has been resolved, so a
/// bad line leaves the circuit as it was.
enum Action {
    Add { name: String, device: Device },
    Connect(Vec<Pin>),
    Scope { kind: ScopeKind, a: Pin, b: Pin },
    Schedule { switch: DeviceId, step: usize, state: SwitchState },
}

/// Netlist interpreter.
///
/// Keeps the table of part names declared so far, so several scripts can be
/// executed against the same circuit one after another. `GND` is always
/// declared.
#[derive(Debug, Clone)]
pub struct Interpreter {
    parts: HashMap<String, DeviceId>,
}

impl Interpreter {
    /// Create an interpreter that only knows the ground part.
    pub fn new() -> Self {
        let mut parts = HashMap::new();
        parts.insert(GROUND_NAME.to_string(), DeviceId(0));
        Self { parts }
    }

    /// Look up a declared part.
    pub fn device(&self, name: &str) -> Option<DeviceId> {
        self.parts.get(name).copied()
    }

    /// Execute a script line by line.
    ///
    /// Stops at the first bad line; the lines before it stay applied.
    pub fn execute(&mut self, circuit: &mut Circuit, script: &str) -> Result<()> {
        for (idx, text) in script.lines().enumerate() {
            self.execute_line(circuit, text, idx + 1)?;
        }
        Ok(())
    }

    /// Execute a single line; `line` is its 1-based number for error messages.
    pub fn execute_line(&mut self, circuit: &mut Circuit, text: &str, line: usize) -> Result<()> {
        let statement = match Parser::parse_line(text, line)? {
            Some(statement) => statement,
            None => return Ok(()),
        };
        let action = self.resolve(circuit, statement, line)?;
        self.apply(circuit, action);
        Ok(())
    }

    fn resolve(&self, circuit: &Circuit, statement: Statement, line: usize) -> Result<Action> {
        match statement {
            Statement::Declare { kind, name, value } => {
                if self.parts.contains_key(&name) {
                    return Err(SimError::parse(line, format!("part '{}' is already defined", name)));
                }
                let device = build_device(kind, &name, value);
                Ok(Action::Add { name, device })
            }
            Statement::Connect(refs) => {
                let pins = refs
                    .iter()
                    .map(|pin| self.resolve_pin(circuit, pin, line))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Action::Connect(pins))
            }
            Statement::Scope { kind, target } => {
                let (a, b) = match target {
                    ScopeTarget::Part(name) => self.part_pins(circuit, &name, line)?,
                    ScopeTarget::Between(a, b) => {
                        (self.resolve_pin(circuit, &a, line)?, self.resolve_pin(circuit, &b, line)?)
                    }
                };
                if kind == ScopeKind::Current && !circuit.is_current_path(a, b) {
                    return Err(SimError::parse(
                        line,
                        format!(
                            "current between {} and {} does not flow through a single part",
                            circuit.pin_name(a),
                            circuit.pin_name(b)
                        ),
                    ));
                }
                Ok(Action::Scope { kind, a, b })
            }
            Statement::Turn { switch, state, time } => {
                let id = self.resolve_part(&switch, line)?;
                if circuit.device(id).as_switch().is_none() {
                    return Err(SimError::parse(line, format!("part '{}' is not a switch", switch)));
                }
                Ok(Action::Schedule {
                    switch: id,
                    step: circuit.step_at(time),
                    state,
                })
            }
        }
    }

    fn apply(&mut self, circuit: &mut Circuit, action: Action) {
        match action {
            Action::Add { name, device } => {
                let id = circuit.add_device(device);
                self.parts.insert(name, id);
            }
            Action::Connect(pins) => {
                for pair in pins.windows(2) {
                    circuit.connect(pair[0], pair[1]);
                }
            }
            Action::Scope { kind, a, b } => {
                match kind {
                    ScopeKind::Voltage => circuit.scope_voltage(a, b),
                    ScopeKind::Current => circuit.scope_current(a, b),
                };
            }
            Action::Schedule { switch, step, state } => {
                if let Some(sw) = circuit.device_mut(switch).as_switch_mut() {
                    sw.schedule(step, state);
                }
            }
        }
    }

    fn resolve_part(&self, name: &str, line: usize) -> Result<DeviceId> {
        self.device(name)
            .ok_or_else(|| SimError::parse(line, format!("unknown part name '{}'", name)))
    }

    fn resolve_pin(&self, circuit: &Circuit, pin: &PinRef, line: usize) -> Result<Pin> {
        let id = self.resolve_part(&pin.part, line)?;
        let device = circuit.device(id);

        let terminal = match &pin.terminal {
            Some(name) => terminal_index(name)
                .filter(|&t| t < device.terminal_count())
                .ok_or_else(|| {
                    SimError::parse(line, format!("part '{}' has no terminal '{}'", pin.part, name))
                })?,
            None if device.terminal_count() == 1 => 0,
            None => {
                return Err(SimError::parse(
                    line,
                    format!("pin name '{}' needs a terminal ({0}.a or {0}.b)", pin.part),
                ))
            }
        };

        Ok(id.pin(terminal))
    }

    /// Pins probed by `scope ... of <part>`.
    fn part_pins(&self, circuit: &Circuit, name: &str, line: usize) -> Result<(Pin, Pin)> {
        let id = self.resolve_part(name, line)?;
        if circuit.device(id).terminal_count() == 2 {
            Ok((id.pin(0), id.pin(1)))
        } else if id == circuit.ground() {
            Err(SimError::parse(line, "cannot scope the ground part"))
        } else {
            Ok((id.pin(0), circuit.ground().pin(0)))
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn build_device(kind: PartKind, name: &str, value: Option<f64>) -> Device {
    let value = value.unwrap_or_default();
    match kind {
        PartKind::Resistor => Resistor::new(name, value).into(),
        PartKind::Capacitor => Capacitor::new(name, value).into(),
        PartKind::Inductor => Inductor::new(name, value).into(),
        PartKind::VoltageSource => VoltageSource::new(name, value).into(),
        PartKind::CurrentSource => CurrentSource::new(name, value).into(),
        PartKind::Switch => Switch::new(name, false).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NodeId;

    fn run(script: &str) -> (Circuit, Interpreter) {
        let mut circuit = Circuit::new(1e-3);
        let mut interp = Interpreter::new();
        interp.execute(&mut circuit, script).unwrap();
        (circuit, interp)
    }

    fn fails(script: &str) -> SimError {
        let mut circuit = Circuit::new(1e-3);
        Interpreter::new().execute(&mut circuit, script).unwrap_err()
    }

    #[test]
    fn test_declare_and_connect() {
        let (circuit, interp) = run("voltage_source V1: 5V\n\
             resistor R1: 1kOhm\n\
             V1 - R1.a\n\
             R1.b - GND\n");

        let v1 = interp.device("V1").unwrap();
        let r1 = interp.device("R1").unwrap();
        assert_eq!(circuit.pin_node(v1.pin(0)), circuit.pin_node(r1.pin(0)));
        assert_eq!(circuit.pin_node(r1.pin(1)), Some(NodeId::GROUND));
        assert_eq!(interp.device("GND"), Some(circuit.ground()));
    }

    #[test]
    fn test_scope_of_parts() {
        let (circuit, _) = run("voltage_source V1: 5V\n\
             capacitor C1: 1uF\n\
             scope voltage of C1\n\
             scope current of V1\n");

        assert_eq!(circuit.scopes()[0].name(), "voltage-between-C1.a-and-C1.b");
        assert_eq!(circuit.scopes()[1].name(), "current-between-V1.a-and-GND.a");
    }

    #[test]
    fn test_turn_schedules_rounded_step() {
        let (circuit, interp) = run("switch S1\nturn on S1 at 5ms\nturn off S1 at 7ms");
        let sw = circuit.device(interp.device("S1").unwrap()).as_switch().unwrap();
        assert_eq!(sw.pending_events(), 2);
        assert!(!sw.is_closed());
    }

    #[test]
    fn test_switch_uses_configured_off_resistance() {
        let config = crate::solver::SimulationConfig::default().with_switch_off_resistance(1e9);
        let mut circuit = Circuit::with_config(config);
        let mut interp = Interpreter::new();
        interp.execute(&mut circuit, "switch S1").unwrap();
        let sw = circuit.device(interp.device("S1").unwrap()).as_switch().unwrap();
        assert_eq!(sw.off_resistance(), 1e9);
    }

    #[test]
    fn test_name_errors() {
        let err = fails("resistor R1: 1Ohm\nresistor R1: 2Ohm");
        assert!(matches!(err, SimError::Parse { line: 2, .. }));
        assert!(err.to_string().contains("already defined"));

        assert!(fails("R1.a - R2.b").to_string().contains("unknown part name 'R1'"));
        assert!(fails("resistor R1: 1Ohm\nR1 - GND").to_string().contains("needs a terminal"));
        assert!(fails("resistor R1: 1Ohm\nR1.c - GND").to_string().contains("no terminal 'c'"));
        assert!(fails("resistor R1: 1Ohm\nturn on R1 at 1s").to_string().contains("not a switch"));
        assert!(fails("resistor GND: 1Ohm").to_string().contains("already defined"));
    }

    #[test]
    fn test_current_scope_across_parts_rejected() {
        let err = fails("resistor R1: 1Ohm\nresistor R2: 1Ohm\nscope current between R1.a and R2.a");
        assert!(matches!(err, SimError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_current_scope_to_grounded_pin() {
        let (circuit, _) = run("voltage_source V1: 1V\n\
             resistor R1: 1kOhm\n\
             V1 - R1.a\n\
             R1.b - GND\n\
             scope current between V1 and R1.b\n");
        assert_eq!(circuit.scopes()[0].name(), "current-between-V1.a-and-R1.b");
    }

    #[test]
    fn test_bad_line_not_partially_applied() {
        let mut circuit = Circuit::new(1e-3);
        let mut interp = Interpreter::new();
        interp
            .execute(&mut circuit, "resistor R1: 1Ohm\nresistor R2: 1Ohm")
            .unwrap();

        // R1.a - R2.a is valid, the third pin is not
        let err = interp
            .execute_line(&mut circuit, "R1.a - R2.a - R3.a", 3)
            .unwrap_err();
        assert!(matches!(err, SimError::Parse { line: 3, .. }));
        let r1 = interp.device("R1").unwrap();
        assert_eq!(circuit.pin_node(r1.pin(0)), None);
        assert_eq!(circuit.nodes().len(), 1);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let (circuit, _) = run("// a divider\n\n   \nresistor R1: 1kOhm // top\n");
        assert_eq!(circuit.devices().len(), 2);
    }
}

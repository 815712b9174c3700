//! Circuit validation.

use crate::components::Device;
use crate::error::{Result, SimError};

use super::Circuit;

/// Validate a circuit for simulation.
///
/// Checks:
/// - Every device terminal is connected to a node
/// - No resistor is zero ohms
/// - Every switch has a positive open-state resistance
///
/// Floating subnets and loops of ideal sources are not detected here; they
/// surface as a singular matrix on the first step.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    for device in circuit.devices() {
        if let Some(terminal) = device.nodes().iter().position(|n| n.is_none()) {
            return Err(SimError::UnconnectedPin {
                pin: device.pin_name(terminal),
            });
        }

        match device {
            Device::Resistor(r) if r.resistance == 0.0 || !r.resistance.is_finite() => {
                return Err(SimError::invalid_param(format!(
                    "resistor '{}' has resistance {}",
                    r.name, r.resistance
                )));
            }
            Device::Switch(s) if !(s.off_resistance().is_finite() && s.off_resistance() > 0.0) => {
                return Err(SimError::invalid_param(format!(
                    "switch '{}' has open-state resistance {}, must be positive",
                    s.name,
                    s.off_resistance()
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Resistor, Switch};

    #[test]
    fn test_unconnected_pin_reported() {
        let mut circuit = Circuit::new(1e-3);
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        circuit.connect(r1.pin(0), circuit.ground().pin(0));

        let err = validate_circuit(&circuit).unwrap_err();
        assert!(matches!(err, SimError::UnconnectedPin { ref pin } if pin == "R1.b"));
    }

    #[test]
    fn test_fully_connected_circuit_passes() {
        let mut circuit = Circuit::new(1e-3);
        let gnd = circuit.ground();
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        circuit.connect(r1.pin(0), gnd.pin(0));
        circuit.connect(r1.pin(1), gnd.pin(0));
        assert!(validate_circuit(&circuit).is_ok());
    }

    #[test]
    fn test_zero_resistance_rejected() {
        let mut circuit = Circuit::new(1e-3);
        let gnd = circuit.ground();
        let r1 = circuit.add_device(Resistor::new("R1", 0.0));
        circuit.connect(r1.pin(0), gnd.pin(0));
        circuit.connect(r1.pin(1), gnd.pin(0));

        let err = validate_circuit(&circuit).unwrap_err();
        assert!(matches!(err, SimError::InvalidSimulationParam { .. }));
        assert!(err.to_string().contains("R1"));
    }

    #[test]
    fn test_negative_resistance_accepted() {
        let mut circuit = Circuit::new(1e-3);
        let gnd = circuit.ground();
        let r1 = circuit.add_device(Resistor::new("R1", -1.0));
        circuit.connect(r1.pin(0), gnd.pin(0));
        circuit.connect(r1.pin(1), gnd.pin(0));
        assert!(validate_circuit(&circuit).is_ok());
    }

    #[test]
    fn test_non_positive_off_resistance_rejected() {
        for off in [0.0, -5.0] {
            let mut circuit = Circuit::new(1e-3);
            let gnd = circuit.ground();
            let s1 = circuit.add_device(Switch::new("S1", false).with_off_resistance(off));
            circuit.connect(s1.pin(0), gnd.pin(0));
            circuit.connect(s1.pin(1), gnd.pin(0));

            let err = validate_circuit(&circuit).unwrap_err();
            assert!(matches!(err, SimError::InvalidSimulationParam { .. }));
            assert!(err.to_string().contains("S1"));
        }
    }
}

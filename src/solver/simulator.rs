//! Per-step update and the run loop.

use crate::circuit::{validate_circuit, Circuit};
use crate::error::{Result, SimError};
use crate::linalg::SolveError;

use super::mna::StampContext;
use super::{DEFAULT_SWITCH_OFF_RESISTANCE, DEFAULT_TIMESTEP};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Time step in seconds.
    pub timestep: f64,
    /// Resistance of switches in the open state (ohms).
    pub switch_off_resistance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: DEFAULT_TIMESTEP,
            switch_off_resistance: DEFAULT_SWITCH_OFF_RESISTANCE,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time step (in seconds).
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the time step from a sample rate (in Hz).
    pub fn with_sample_rate(self, sample_rate: f64) -> Self {
        self.with_timestep(1.0 / sample_rate)
    }

    /// Set the open-switch resistance (in ohms).
    ///
    /// Higher values isolate better but widen the spread of matrix entries:
    /// - 10e6 (default): isolation well below a microamp at audio voltages
    /// - 1e9 and up: still solvable next to kOhm parts, less headroom
    pub fn with_switch_off_resistance(mut self, resistance: f64) -> Self {
        self.switch_off_resistance = resistance;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(SimError::invalid_param(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !(self.switch_off_resistance.is_finite() && self.switch_off_resistance > 0.0) {
            return Err(SimError::invalid_param(format!(
                "switch off resistance must be positive, got {}",
                self.switch_off_resistance
            )));
        }
        Ok(())
    }
}

/// Outcome of a run.
///
/// A numerical failure does not discard the steps computed before it: the
/// run stops, and the failure is reported here with everything recorded so
/// far left in place.
#[derive(Debug)]
pub struct RunReport {
    /// Steps that were solved and sampled during this run
    pub steps_completed: usize,
    /// Steps the run was asked for
    pub steps_requested: usize,
    /// The error that stopped the run early, if any
    pub failure: Option<SimError>,
}

impl RunReport {
    /// Check whether every requested step was simulated.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.steps_completed == self.steps_requested
    }

    /// Turn an early stop into an error.
    pub fn into_result(self) -> Result<usize> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.steps_completed),
        }
    }
}

impl Circuit {
    /// Advance the circuit through one step.
    ///
    /// 1. Reset row allocation
    /// 2. Give every non-ground node a row
    /// 3. `pre_stamp` every device (branch rows, switch events)
    /// 4. Size and zero the matrix
    /// 5. `stamp` every device
    /// 6. Solve, then copy node voltages back
    /// 7. `post_stamp` every device
    ///
    /// Scopes are not sampled here; that is the run loop's job.
    pub fn step(&mut self, step: usize) -> Result<()> {
        let timestep = self.config.timestep;

        self.matrix.reset_row_count();
        for node in self.nodes.iter_mut() {
            node.row = if node.is_ground() {
                None
            } else {
                Some(self.matrix.reserve_row())
            };
        }

        let ctx = StampContext::new(&self.nodes, timestep, step);
        for device in self.devices.iter_mut() {
            device.pre_stamp(&mut self.matrix, &ctx);
        }

        self.matrix.init();
        for device in &self.devices {
            device.stamp(&mut self.matrix, &ctx);
        }

        log::trace!("step {}: solving {}x{} system", step, self.matrix.size(), self.matrix.size());

        self.matrix.solve().map_err(|err| match err {
            SolveError::Singular { column } => SimError::SingularMatrix {
                step,
                time: step as f64 * timestep,
                column,
            },
        })?;

        for node in self.nodes.iter_mut() {
            if let Some(row) = node.row {
                node.voltage = self.matrix.solution(row);
            }
        }

        let ctx = StampContext::new(&self.nodes, timestep, step);
        for device in self.devices.iter_mut() {
            device.post_stamp(&self.matrix, &ctx);
        }

        Ok(())
    }

    /// Run `steps` consecutive steps, sampling every scope after each one.
    ///
    /// The clock carries over between runs: a second call continues where
    /// the first one stopped. The circuit is validated before the first step;
    /// validation problems are returned as errors, while a singular step ends
    /// the run and is reported in [`RunReport::failure`].
    pub fn run_for_steps(&mut self, steps: usize) -> Result<RunReport> {
        self.config.validate()?;
        validate_circuit(self)?;

        let start = self.elapsed_steps;
        log::info!(
            "Running for {} steps (dt = {:e}s, starting at step {})",
            steps,
            self.config.timestep,
            start
        );

        let mut report = RunReport {
            steps_completed: 0,
            steps_requested: steps,
            failure: None,
        };

        for step in start..start + steps {
            if let Err(err) = self.step(step) {
                log::warn!("Simulation halted: {}", err);
                report.failure = Some(err);
                break;
            }
            self.sample_scopes(step);
            self.elapsed_steps += 1;
            report.steps_completed += 1;
        }

        log::info!(
            "Simulated {} of {} steps (t = {:e}s)",
            report.steps_completed,
            steps,
            self.time()
        );

        Ok(report)
    }

    /// Run for a duration in seconds, rounded to whole steps.
    pub fn run_for_seconds(&mut self, seconds: f64) -> Result<RunReport> {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(SimError::invalid_param(format!(
                "duration must be a non-negative number of seconds, got {}",
                seconds
            )));
        }
        self.config.validate()?;
        let steps = self.step_at(seconds);
        self.run_for_steps(steps)
    }

    /// Record one sample into every scope, labelled with the step's time.
    fn sample_scopes(&mut self, step: usize) {
        let time = step as f64 * self.config.timestep;
        for idx in 0..self.scopes.len() {
            let value = self.measure(&self.scopes[idx]);
            self.scopes[idx].record(time, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Resistor, VoltageSource};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_abs_diff_eq!(config.timestep, 1.0 / 44_100.0);
        assert_eq!(config.switch_off_resistance, 10e6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = SimulationConfig::new()
            .with_sample_rate(1000.0)
            .with_switch_off_resistance(1e8);
        assert_abs_diff_eq!(config.timestep, 1e-3);
        assert_eq!(config.switch_off_resistance, 1e8);
    }

    #[test]
    fn test_invalid_timestep_rejected() {
        let mut circuit = Circuit::new(0.0);
        let err = circuit.run_for_steps(1).unwrap_err();
        assert!(matches!(err, SimError::InvalidSimulationParam { .. }));
        assert_eq!(circuit.elapsed_steps(), 0);
    }

    #[test]
    fn test_ground_only_circuit_steps() {
        let mut circuit = Circuit::new(1e-3);
        let report = circuit.run_for_steps(3).unwrap();
        assert!(report.is_complete());
        assert_eq!(circuit.elapsed_steps(), 3);
    }

    #[test]
    fn test_rows_reassigned_each_step() {
        let mut circuit = Circuit::new(1e-3);
        let v1 = circuit.add_device(VoltageSource::new("V1", 1.0));
        let r1 = circuit.add_device(Resistor::new("R1", 1.0));
        circuit.connect(v1.pin(0), r1.pin(0));
        circuit.connect(r1.pin(1), circuit.ground().pin(0));

        circuit.step(0).unwrap();
        assert_eq!(circuit.nodes()[0].row, None);
        assert_eq!(circuit.nodes()[1].row, Some(0));
        assert_abs_diff_eq!(circuit.nodes()[1].voltage, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_run_report_into_result() {
        let report = RunReport {
            steps_completed: 4,
            steps_requested: 4,
            failure: None,
        };
        assert_eq!(report.into_result().unwrap(), 4);

        let report = RunReport {
            steps_completed: 1,
            steps_requested: 4,
            failure: Some(SimError::SingularMatrix {
                step: 1,
                time: 1e-3,
                column: 0,
            }),
        };
        assert!(!report.is_complete());
        assert!(report.into_result().unwrap_err().is_singular());
    }
}

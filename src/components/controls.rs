//! Control components: the scheduled Switch.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use crate::circuit::NodeId;
use crate::solver::{CircuitMatrix, StampContext};

/// Target state of a switch event.
///
/// The declaration order is the tie-break for events scheduled on the same
/// step: `On` is applied first and `Off` last, so `Off` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    /// Whether the switch conducts in this state.
    pub fn is_closed(self) -> bool {
        self == SwitchState::On
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchState::On => write!(f, "on"),
            SwitchState::Off => write!(f, "off"),
        }
    }
}

/// A scheduled change of switch state, ordered by (step, state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SwitchEvent {
    pub step: usize,
    pub state: SwitchState,
}

/// A switch component.
///
/// Modeled with a branch current unknown in both states so the matrix keeps
/// the same size and structure when it toggles:
/// - Closed: ideal short, V[a] - V[b] = 0
/// - Open: V[a] - V[b] = R_off * I, with a large R_off
#[derive(Debug, Clone)]
pub struct Switch {
    pub name: String,
    pub nodes: [Option<NodeId>; 2],
    pub closed: bool,
    /// Resistance when open; `None` until set or taken from the circuit
    off_resistance: Option<f64>,
    pub branch: Option<usize>,
    /// Branch current from a to b after the latest step
    pub current: f64,
    events: BinaryHeap<Reverse<SwitchEvent>>,
}

impl Switch {
    /// Default resistance when open.
    pub const R_OFF: f64 = crate::solver::DEFAULT_SWITCH_OFF_RESISTANCE;

    /// Create a new switch, open unless `closed`.
    pub fn new(name: impl Into<String>, closed: bool) -> Self {
        Self {
            name: name.into(),
            nodes: [None; 2],
            closed,
            off_resistance: None,
            branch: None,
            current: 0.0,
            events: BinaryHeap::new(),
        }
    }

    /// Use a different open-state resistance.
    pub fn with_off_resistance(mut self, off_resistance: f64) -> Self {
        self.off_resistance = Some(off_resistance);
        self
    }

    /// Resistance when open.
    pub fn off_resistance(&self) -> f64 {
        self.off_resistance.unwrap_or(Self::R_OFF)
    }

    /// Fill in the open-state resistance unless one was set explicitly.
    pub(crate) fn inherit_off_resistance(&mut self, off_resistance: f64) {
        self.off_resistance.get_or_insert(off_resistance);
    }

    /// Check whether the switch currently conducts.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Queue a state change taking effect at the start of `step`.
    pub fn schedule(&mut self, step: usize, state: SwitchState) {
        self.events.push(Reverse(SwitchEvent { step, state }));
    }

    /// Number of events not yet applied.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Apply every queued event due at or before `step`, earliest first.
    pub fn apply_due_events(&mut self, step: usize) {
        let mut closed = self.closed;
        while let Some(Reverse(event)) = self.events.peek() {
            if event.step > step {
                break;
            }
            closed = event.state.is_closed();
            self.events.pop();
        }

        if closed != self.closed {
            log::debug!(
                "switch '{}' turned {} at step {}",
                self.name,
                if closed { "on" } else { "off" },
                step
            );
        }
        self.closed = closed;
    }

    /// Branch equation coefficient for the current state.
    pub fn cross_value(&self) -> f64 {
        if self.closed {
            0.0
        } else {
            -self.off_resistance()
        }
    }

    pub(crate) fn pre_stamp(&mut self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        self.apply_due_events(ctx.step);
        self.branch = Some(matrix.reserve_row());
    }

    pub(crate) fn stamp(&self, matrix: &mut CircuitMatrix, ctx: &StampContext) {
        let br = self.branch.expect("switch branch row is reserved in pre_stamp");
        let n1 = ctx.row(self.nodes[0]);
        let n2 = ctx.row(self.nodes[1]);
        matrix.stamp_branch(n1, n2, br, self.cross_value());
    }

    pub(crate) fn post_stamp(&mut self, matrix: &CircuitMatrix) {
        if let Some(br) = self.branch {
            self.current = matrix.solution(br);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_starts_open() {
        let sw = Switch::new("S1", false);
        assert!(!sw.is_closed());
        assert_eq!(sw.cross_value(), -Switch::R_OFF);
        assert_eq!(Switch::new("S2", true).cross_value(), 0.0);
    }

    #[test]
    fn test_events_apply_when_due() {
        let mut sw = Switch::new("S1", false);
        sw.schedule(100, SwitchState::On);

        sw.apply_due_events(99);
        assert!(!sw.is_closed());
        assert_eq!(sw.pending_events(), 1);

        sw.apply_due_events(100);
        assert!(sw.is_closed());
        assert_eq!(sw.pending_events(), 0);
    }

    #[test]
    fn test_same_step_resolves_off() {
        let mut sw = Switch::new("S1", false);
        sw.schedule(5, SwitchState::Off);
        sw.schedule(5, SwitchState::On);
        sw.apply_due_events(5);
        assert!(!sw.is_closed());

        let mut sw = Switch::new("S2", true);
        sw.schedule(5, SwitchState::On);
        sw.schedule(5, SwitchState::Off);
        sw.apply_due_events(5);
        assert!(!sw.is_closed());
    }

    #[test]
    fn test_overdue_events_drain_in_order() {
        let mut sw = Switch::new("S1", false);
        sw.schedule(30, SwitchState::Off);
        sw.schedule(10, SwitchState::On);
        sw.schedule(20, SwitchState::On);
        sw.schedule(40, SwitchState::On);

        // Skipped past 10, 20 and 30 in one step: the latest due event wins
        sw.apply_due_events(35);
        assert!(!sw.is_closed());
        assert_eq!(sw.pending_events(), 1);

        sw.apply_due_events(40);
        assert!(sw.is_closed());
    }

    #[test]
    fn test_custom_off_resistance() {
        let sw = Switch::new("S1", false).with_off_resistance(1e9);
        assert_eq!(sw.cross_value(), -1e9);
    }

    #[test]
    fn test_inherited_off_resistance_does_not_override() {
        let mut sw = Switch::new("S1", false);
        sw.inherit_off_resistance(1e8);
        assert_eq!(sw.off_resistance(), 1e8);

        let mut sw = Switch::new("S2", false).with_off_resistance(1e9);
        sw.inherit_off_resistance(1e8);
        assert_eq!(sw.off_resistance(), 1e9);
    }
}

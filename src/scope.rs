//! Per-step probes and their CSV tables.

use std::fmt;
use std::io::{self, Write};

use crate::circuit::Pin;

/// What a scope measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// V(a) - V(b)
    Voltage,
    /// Current from a to b through one device
    Current,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Voltage => write!(f, "voltage"),
            ScopeKind::Current => write!(f, "current"),
        }
    }
}

/// A probe between two pins, sampled once after every simulated step.
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    a: Pin,
    b: Pin,
    name: String,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, a: Pin, b: Pin, name: String) -> Self {
        Self {
            kind,
            a,
            b,
            name,
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Table name, e.g. `voltage-between-R1.a-and-GND.a`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// The probed pins, in measuring order.
    pub fn pins(&self) -> (Pin, Pin) {
        (self.a, self.b)
    }

    pub(crate) fn record(&mut self, time: f64, value: f64) {
        self.times.push(time);
        self.values.push(value);
    }

    /// Sample times in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sampled values (volts or amperes).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(time, value)` pairs in recording order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.times.last()?, *self.values.last()?))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write the table as CSV: a `time,<quantity>` header, then one row per
    /// sample.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "time,{}", self.kind)?;
        for (time, value) in self.samples() {
            writeln!(out, "{},{}", time, value)?;
        }
        Ok(())
    }
}

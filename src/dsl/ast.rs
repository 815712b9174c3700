//! Statement types for the netlist DSL.

use std::fmt;

use crate::components::SwitchState;
use crate::scope::ScopeKind;

/// Part kinds that can be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    CurrentSource,
    Switch,
}

impl PartKind {
    /// Get the part kind from its declaration keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "resistor" => Some(PartKind::Resistor),
            "capacitor" => Some(PartKind::Capacitor),
            "inductor" => Some(PartKind::Inductor),
            "voltage_source" => Some(PartKind::VoltageSource),
            "current_source" => Some(PartKind::CurrentSource),
            "switch" => Some(PartKind::Switch),
            _ => None,
        }
    }

    /// Declaration keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            PartKind::Resistor => "resistor",
            PartKind::Capacitor => "capacitor",
            PartKind::Inductor => "inductor",
            PartKind::VoltageSource => "voltage_source",
            PartKind::CurrentSource => "current_source",
            PartKind::Switch => "switch",
        }
    }

    /// Unit suffix of the declared value, `None` for parts without a value.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            PartKind::Resistor => Some("Ohm"),
            PartKind::Capacitor => Some("F"),
            PartKind::Inductor => Some("H"),
            PartKind::VoltageSource => Some("V"),
            PartKind::CurrentSource => Some("A"),
            PartKind::Switch => None,
        }
    }
}

/// Reference to a pin as written: `part` or `part.terminal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRef {
    pub part: String,
    pub terminal: Option<String>,
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.terminal {
            Some(terminal) => write!(f, "{}.{}", self.part, terminal),
            None => write!(f, "{}", self.part),
        }
    }
}

/// What a `scope` line probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeTarget {
    /// `of <part>`
    Part(String),
    /// `between <pin> and <pin>`
    Between(PinRef, PinRef),
}

/// One parsed netlist line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `<kind> <name>: <value><unit>` or `switch <name>`
    Declare {
        kind: PartKind,
        name: String,
        value: Option<f64>,
    },
    /// `<pin> - <pin> - ...`
    Connect(Vec<PinRef>),
    /// `scope voltage|current ...`
    Scope { kind: ScopeKind, target: ScopeTarget },
    /// `turn on|off <switch> at <time>s`
    Turn {
        switch: String,
        state: SwitchState,
        time: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip() {
        for kind in [
            PartKind::Resistor,
            PartKind::Capacitor,
            PartKind::Inductor,
            PartKind::VoltageSource,
            PartKind::CurrentSource,
            PartKind::Switch,
        ] {
            assert_eq!(PartKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(PartKind::from_keyword("diode"), None);
    }

    #[test]
    fn test_pin_ref_display() {
        let pin = PinRef {
            part: "R1".to_string(),
            terminal: Some("b".to_string()),
        };
        assert_eq!(pin.to_string(), "R1.b");
        let pin = PinRef {
            part: "V1".to_string(),
            terminal: None,
        };
        assert_eq!(pin.to_string(), "V1");
    }
}

//! Core types for circuit representation.

use std::fmt;

/// A handle to a node in the circuit's node arena.
/// Node 0 is always ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// A handle to a device in the circuit's device arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

impl DeviceId {
    /// Pin handle for one of this device's terminals.
    ///
    /// The terminal index is checked against the device when the pin is used.
    pub fn pin(self, terminal: usize) -> Pin {
        Pin {
            device: self,
            terminal,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// A handle to a scope registered on a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

/// One terminal of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin {
    /// Owning device
    pub device: DeviceId,
    /// Terminal index on the owning device
    pub terminal: usize,
}

/// An electrical net.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Solved voltage from the latest step
    pub voltage: f64,
    /// Matrix row for this step (never set for ground)
    pub row: Option<usize>,
    is_ground: bool,
}

impl Node {
    pub(crate) fn new() -> Self {
        Self {
            voltage: 0.0,
            row: None,
            is_ground: false,
        }
    }

    pub(crate) fn ground() -> Self {
        Self {
            voltage: 0.0,
            row: None,
            is_ground: true,
        }
    }

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.is_ground
    }
}

/// Name of terminal `index` (`a`, `b`, ...).
///
/// # Panics
/// Past `z`; devices here have at most two terminals.
pub fn terminal_name(index: usize) -> char {
    assert!(index < 26, "terminal index {} has no name", index);
    char::from(b'a' + index as u8)
}

/// Inverse of [`terminal_name`].
pub fn terminal_index(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='z'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_names_round_trip() {
        assert_eq!(terminal_name(0), 'a');
        assert_eq!(terminal_name(1), 'b');
        assert_eq!(terminal_index("a"), Some(0));
        assert_eq!(terminal_index("b"), Some(1));
        assert_eq!(terminal_index("ab"), None);
        assert_eq!(terminal_index("A"), None);
    }

    #[test]
    fn test_ground_node() {
        assert!(NodeId::GROUND.is_ground());
        assert!(!NodeId(3).is_ground());
        assert_eq!(NodeId::GROUND.to_string(), "GND");
        assert!(Node::ground().is_ground());
        assert!(Node::new().row.is_none());
    }
}

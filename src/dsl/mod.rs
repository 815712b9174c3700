//! Netlist DSL for circuit descriptions.
//!
//! The DSL is line-oriented and human-editable. Each line is one statement;
//! `//` starts a comment that runs to the end of the line.
//!
//! # Grammar Overview
//!
//! ```text
//! line        = [ statement ] [ comment ]
//! statement   = declaration | connection | scope | turn
//! comment     = "//" { any_char }
//!
//! declaration = kind name ':' value | "switch" name
//! connection  = pin '-' pin { '-' pin }
//! scope       = "scope" ("voltage" | "current") ("of" name | "between" pin "and" pin)
//! turn        = "turn" ("on" | "off") name "at" value   (unit: s)
//!
//! kind        = "resistor" | "capacitor" | "inductor" | "voltage_source" | "current_source"
//! pin         = name [ '.' terminal ]
//! terminal    = 'a' | 'b'
//! name        = (letter | '_') { letter | digit | '_' }
//! value       = ['-'] digit* ['.' digit*] [si_prefix] unit
//! si_prefix   = 'E' | 'P' | 'T' | 'G' | 'M' | 'k' | 'm' | 'u' | 'n' | 'p' | 'f' | 'a'
//! ```
//!
//! # Part Types
//!
//! | Keyword | Unit | Terminals |
//! |---------|------|-----------|
//! | resistor | Ohm | a, b |
//! | capacitor | F | a, b |
//! | inductor | H | a, b |
//! | voltage_source | V | a (referenced to ground) |
//! | current_source | A | a, b (current flows a to b inside the source) |
//! | switch | - | a, b (starts open) |
//!
//! A bare part name is a pin only for single-terminal parts. The ground part
//! `GND` is always declared.
//!
//! # Example
//!
//! ```text
//! // RC charging through a switch
//! voltage_source V1: 5V
//! switch S1
//! resistor R1: 1kOhm
//! capacitor C1: 10uF
//!
//! V1 - S1.a
//! S1.b - R1.a
//! R1.b - C1.a
//! C1.b - GND
//!
//! turn on S1 at 10ms
//! scope voltage of C1
//! ```

mod ast;
mod interpreter;
mod lexer;
mod parser;

pub use ast::*;
pub use interpreter::Interpreter;
pub use lexer::{is_identifier, parse_value, si_prefix, Lexer, Token, TokenKind};
pub use parser::Parser;

use std::path::Path;

use crate::circuit::Circuit;
use crate::error::{Result, SimError};

/// Execute a netlist script against a circuit.
pub fn load(script: &str, circuit: &mut Circuit) -> Result<Interpreter> {
    let mut interpreter = Interpreter::new();
    interpreter.execute(circuit, script)?;
    Ok(interpreter)
}

/// Read a netlist file and execute it against a circuit.
pub fn load_file(path: impl AsRef<Path>, circuit: &mut Circuit) -> Result<Interpreter> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SimError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    log::info!("Loading circuit from {}", path.display());
    load(&content, circuit)
}

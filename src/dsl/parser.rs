//! Parser for the netlist DSL.

use super::ast::*;
use super::lexer::{is_identifier, parse_value, Lexer, Token, TokenKind};
use crate::components::SwitchState;
use crate::error::{Result, SimError};
use crate::scope::ScopeKind;

/// Words that cannot be used as part names.
const RESERVED: &[&str] = &[
    "resistor",
    "capacitor",
    "inductor",
    "voltage_source",
    "current_source",
    "switch",
    "scope",
    "turn",
];

/// Parser for one netlist line.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
}

impl Parser {
    /// Create a parser over the tokens of line `line`.
    pub fn new(tokens: Vec<Token>, line: usize) -> Self {
        Self { tokens, pos: 0, line }
    }

    /// Tokenize and parse a single line of text.
    pub fn parse_line(text: &str, line: usize) -> Result<Option<Statement>> {
        let tokens = Lexer::new(text, line).tokenize()?;
        Parser::new(tokens, line).parse()
    }

    /// Parse the line into a statement; `None` for a blank or comment line.
    pub fn parse(&mut self) -> Result<Option<Statement>> {
        let first = match self.tokens.first() {
            Some(token) => token.clone(),
            None => return Ok(None),
        };

        let statement = if first.kind != TokenKind::Word {
            return Err(self.error(format!("unexpected '{}' at start of line", first.text)));
        } else if let Some(kind) = PartKind::from_keyword(&first.text) {
            self.pos += 1;
            self.parse_declaration(kind)?
        } else if first.text == "scope" {
            self.pos += 1;
            self.parse_scope()?
        } else if first.text == "turn" {
            self.pos += 1;
            self.parse_turn()?
        } else {
            self.parse_connection()?
        };

        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected '{}' at column {}", token.text, token.column)));
        }

        Ok(Some(statement))
    }

    fn error(&self, message: impl Into<String>) -> SimError {
        SimError::parse(self.line, message)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_word(&mut self, what: &str) -> Result<String> {
        match self.next() {
            Some(token) if token.kind == TokenKind::Word => Ok(token.text),
            Some(token) => Err(self.error(format!("expected {}, got '{}'", what, token.text))),
            None => Err(self.error(format!("expected {} at end of line", what))),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.next() {
            Some(token) if token.kind == TokenKind::Word && token.text == keyword => Ok(()),
            Some(token) => Err(self.error(format!("expected '{}', got '{}'", keyword, token.text))),
            None => Err(self.error(format!("expected '{}' at end of line", keyword))),
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(self.error(format!("expected {}, got '{}'", what, token.text))),
            None => Err(self.error(format!("expected {} at end of line", what))),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let name = self.expect_word("a part name")?;
        if !is_identifier(&name) {
            return Err(self.error(format!("invalid part name '{}'", name)));
        }
        if RESERVED.contains(&name.as_str()) {
            return Err(self.error(format!("'{}' is a reserved word", name)));
        }
        Ok(name)
    }

    /// A value with unit, optionally negated by a leading dash.
    fn parse_quantity(&mut self, unit: &str) -> Result<f64> {
        let negative = matches!(self.peek(), Some(t) if t.kind == TokenKind::Dash);
        if negative {
            self.pos += 1;
        }
        let text = self.expect_word(&format!("a value in {}", unit))?;
        let value = parse_value(&text, unit)
            .ok_or_else(|| self.error(format!("invalid value '{}' (expected a number in {})", text, unit)))?;
        Ok(if negative { -value } else { value })
    }

    fn parse_declaration(&mut self, kind: PartKind) -> Result<Statement> {
        let name = self.parse_name()?;

        let value = match kind.unit() {
            Some(unit) => {
                self.expect_kind(TokenKind::Colon, &format!("':' after {} name", kind.keyword()))?;
                Some(self.parse_quantity(unit)?)
            }
            None => None,
        };

        Ok(Statement::Declare { kind, name, value })
    }

    fn parse_pin(&mut self) -> Result<PinRef> {
        let text = self.expect_word("a pin name")?;
        let (part, terminal) = match text.split_once('.') {
            Some((part, terminal)) => (part, Some(terminal)),
            None => (text.as_str(), None),
        };

        let valid = is_identifier(part) && terminal.map_or(true, is_identifier);
        if !valid {
            return Err(self.error(format!("invalid pin name '{}'", text)));
        }

        Ok(PinRef {
            part: part.to_string(),
            terminal: terminal.map(str::to_string),
        })
    }

    fn parse_connection(&mut self) -> Result<Statement> {
        let mut pins = vec![self.parse_pin()?];
        while matches!(self.peek(), Some(t) if t.kind == TokenKind::Dash) {
            self.pos += 1;
            pins.push(self.parse_pin()?);
        }

        if pins.len() < 2 {
            let message = match self.peek() {
                Some(token) => format!("expected '-' after '{}', got '{}'", pins[0], token.text),
                None => format!("unknown statement '{}'", pins[0]),
            };
            return Err(self.error(message));
        }

        Ok(Statement::Connect(pins))
    }

    fn parse_scope(&mut self) -> Result<Statement> {
        let kind = match self.expect_word("'voltage' or 'current' after 'scope'")?.as_str() {
            "voltage" => ScopeKind::Voltage,
            "current" => ScopeKind::Current,
            other => {
                return Err(self.error(format!(
                    "expected 'voltage' or 'current' after 'scope', got '{}'",
                    other
                )))
            }
        };

        let target = match self.expect_word(&format!("'of' or 'between' after 'scope {}'", kind))?.as_str() {
            "of" => ScopeTarget::Part(self.parse_name()?),
            "between" => {
                let a = self.parse_pin()?;
                self.expect_keyword("and")?;
                let b = self.parse_pin()?;
                ScopeTarget::Between(a, b)
            }
            other => {
                return Err(self.error(format!(
                    "expected 'of' or 'between' after 'scope {}', got '{}'",
                    kind, other
                )))
            }
        };

        Ok(Statement::Scope { kind, target })
    }

    fn parse_turn(&mut self) -> Result<Statement> {
        let state = match self.expect_word("'on' or 'off' after 'turn'")?.as_str() {
            "on" => SwitchState::On,
            "off" => SwitchState::Off,
            other => return Err(self.error(format!("expected 'on' or 'off' after 'turn', got '{}'", other))),
        };
        let switch = self.parse_name()?;
        self.expect_keyword("at")?;
        let time = self.parse_quantity("s")?;
        if time < 0.0 {
            return Err(self.error(format!("switch time must not be negative, got {}s", time)));
        }

        Ok(Statement::Turn { switch, state, time })
    }
}

//! Lexer (tokenizer) for the netlist DSL.
//!
//! The language is line-oriented, so the lexer works on one line at a time.

use crate::error::{Result, SimError};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A keyword, name, pin reference or value (`resistor`, `R1`, `R1.a`, `10kOhm`)
    Word,
    /// Colon ':' between a part name and its value
    Colon,
    /// Dash '-' between connected pins
    Dash,
}

/// Lexer for tokenizing a single netlist line.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the text of line `line`.
    pub fn new(input: &'a str, line: usize) -> Self {
        Self {
            chars: input.chars().peekable(),
            line,
            column: 1,
        }
    }

    /// Tokenize the whole line, stopping at a `//` comment.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Get the next token, or `None` at the end of the line.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(None),
        };
        let column = self.column;

        let (kind, text) = match ch {
            '/' => {
                self.advance();
                if self.chars.peek() == Some(&'/') {
                    // Comment runs to the end of the line
                    while self.advance().is_some() {}
                    return Ok(None);
                }
                return Err(SimError::parse(
                    self.line,
                    format!("unexpected character '/' at column {}", column),
                ));
            }
            ':' => {
                self.advance();
                (TokenKind::Colon, ":".to_string())
            }
            '-' => {
                self.advance();
                (TokenKind::Dash, "-".to_string())
            }
            _ if is_word_char(ch) => (TokenKind::Word, self.read_word()),
            _ => {
                return Err(SimError::parse(
                    self.line,
                    format!("unexpected character '{}' at column {}", ch, column),
                ));
            }
        };

        Ok(Some(Token {
            kind,
            text,
            line: self.line,
            column,
        }))
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.column += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if is_word_char(ch) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

/// Check a part name against `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Multiplier for an SI prefix character.
pub fn si_prefix(prefix: char) -> Option<f64> {
    let multiplier = match prefix {
        'E' => 1e18,
        'P' => 1e15,
        'T' => 1e12,
        'G' => 1e9,
        'M' => 1e6,
        'k' => 1e3,
        'm' => 1e-3,
        'u' => 1e-6,
        'n' => 1e-9,
        'p' => 1e-12,
        'f' => 1e-15,
        'a' => 1e-18,
        _ => return None,
    };
    Some(multiplier)
}

/// Parse a value with an optional SI prefix and a mandatory unit, e.g.
/// `4.7kOhm` with unit `Ohm`.
pub fn parse_value(text: &str, unit: &str) -> Option<f64> {
    let body = text.strip_suffix(unit)?;

    let digits_end = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    let (number, prefix) = body.split_at(digits_end);

    if !number.chars().any(|c| c.is_ascii_digit()) || number.matches('.').count() > 1 {
        return None;
    }

    let mut prefix_chars = prefix.chars();
    let multiplier = match (prefix_chars.next(), prefix_chars.next()) {
        (None, _) => 1.0,
        (Some(c), None) => si_prefix(c)?,
        _ => return None,
    };

    number.parse::<f64>().ok().map(|v| v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kinds(line: &str) -> Vec<TokenKind> {
        Lexer::new(line, 1)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_declaration_tokens() {
        let tokens = Lexer::new("resistor R1: 10kOhm", 3).tokenize().unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["resistor", "R1", ":", "10kOhm"]);
        assert_eq!(tokens[1].column, 10);
        assert!(tokens.iter().all(|t| t.line == 3));
    }

    #[test]
    fn test_connection_tokens() {
        use TokenKind::*;
        assert_eq!(kinds("V1 - R1.a - C1.a"), vec![Word, Dash, Word, Dash, Word]);
        assert_eq!(kinds("R1.b-GND"), vec![Word, Dash, Word]);
    }

    #[test]
    fn test_comments() {
        assert!(kinds("// just a comment").is_empty());
        assert_eq!(kinds("switch S1 // main switch").len(), 2);
        assert!(kinds("   ").is_empty());
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("resistor R#1: 1Ohm", 4).tokenize().unwrap_err();
        assert!(err.to_string().contains("line 4"));
        assert!(Lexer::new("a / b", 1).tokenize().is_err());
    }

    #[test]
    fn test_si_prefixes() {
        assert_eq!(si_prefix('k'), Some(1e3));
        assert_eq!(si_prefix('M'), Some(1e6));
        assert_eq!(si_prefix('m'), Some(1e-3));
        assert_eq!(si_prefix('u'), Some(1e-6));
        assert_eq!(si_prefix('E'), Some(1e18));
        assert_eq!(si_prefix('a'), Some(1e-18));
        assert_eq!(si_prefix('K'), None);
        assert_eq!(si_prefix('x'), None);
    }

    #[test]
    fn test_parse_values() {
        assert_relative_eq!(parse_value("10kOhm", "Ohm").unwrap(), 10_000.0);
        assert_relative_eq!(parse_value("4.7uF", "F").unwrap(), 4.7e-6);
        assert_relative_eq!(parse_value("5V", "V").unwrap(), 5.0);
        assert_relative_eq!(parse_value("100ms", "s").unwrap(), 0.1);
        assert_relative_eq!(parse_value(".5mH", "H").unwrap(), 0.5e-3);
        assert_relative_eq!(parse_value("2.MOhm", "Ohm").unwrap(), 2e6);
    }

    #[test]
    fn test_parse_value_rejects_malformed() {
        assert_eq!(parse_value("10k", "Ohm"), None);
        assert_eq!(parse_value("kOhm", "Ohm"), None);
        assert_eq!(parse_value("1.2.3V", "V"), None);
        assert_eq!(parse_value("10xV", "V"), None);
        assert_eq!(parse_value("10kkOhm", "Ohm"), None);
        assert_eq!(parse_value("10F", "H"), None);
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("R1"));
        assert!(is_identifier("_tmp"));
        assert!(!is_identifier("1R"));
        assert!(!is_identifier("R.1"));
        assert!(!is_identifier(""));
    }
}

//! Recursive-descent literal parser.
//!
//! Grammar (whitespace allowed between tokens):
//!
//! ```text
//! expression := unary ( "," unary )* [ "," ]      -- a comma makes a tuple
//! unary      := ( "-" | "+" ) unary | atom
//! atom       := number | string | "True" | "False" | "None"
//!             | "(" [ items ] ")" | "[" [ items ] "]"
//! items      := unary ( "," unary )* [ "," ]
//! ```

use crate::{Literal, LiteralError};

/// Parse a literal from its source text.
///
/// Leading and trailing whitespace is ignored. Anything that is not one of
/// the forms in the module grammar is an error; callers decide whether to
/// fall back to the raw text.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LiteralError::Empty);
    }

    let mut parser = Parser::new(trimmed);
    let value = parser.parse_expression()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(LiteralError::TrailingInput(parser.pos));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(ch) => LiteralError::UnexpectedChar { ch, pos: self.pos },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn parse_expression(&mut self) -> Result<Literal, LiteralError> {
        let first = self.parse_unary()?;
        self.skip_ws();
        if self.peek() != Some(',') {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.peek() == Some(',') {
            self.pos += 1;
            self.skip_ws();
            if self.at_end() {
                break;
            }
            items.push(self.parse_unary()?);
            self.skip_ws();
        }
        Ok(Literal::Tuple(items))
    }

    fn parse_unary(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                match self.parse_unary()? {
                    Literal::Int(i) => i
                        .checked_neg()
                        .map(Literal::Int)
                        .ok_or_else(|| LiteralError::InvalidNumber(format!("-{}", i))),
                    Literal::Float(x) => Ok(Literal::Float(-x)),
                    _ => Err(LiteralError::UnexpectedChar { ch: '-', pos: start }),
                }
            }
            Some('+') => {
                self.pos += 1;
                match self.parse_unary()? {
                    n @ (Literal::Int(_) | Literal::Float(_)) => Ok(n),
                    _ => Err(LiteralError::UnexpectedChar { ch: '+', pos: start }),
                }
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let (items, trailing_comma) = self.parse_items(')')?;
                if items.len() == 1 && !trailing_comma {
                    // Parenthesized expression, not a tuple
                    Ok(items.into_iter().next().unwrap_or(Literal::None))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            Some('[') => {
                self.pos += 1;
                let (items, _) = self.parse_items(']')?;
                Ok(Literal::List(items))
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.parse_string(q)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            _ => Err(self.unexpected()),
        }
    }

    /// Parse comma-separated items up to `close`. Returns the items and
    /// whether the last item was followed by a comma.
    fn parse_items(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;

        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }

            items.push(self.parse_unary()?);
            trailing_comma = false;
            self.skip_ws();

            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    trailing_comma = true;
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok((items, trailing_comma));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<Literal, LiteralError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnterminatedString),
                Some(c) if c == quote => return Ok(Literal::Str(out)),
                Some('\\') => match self.bump() {
                    None => return Err(LiteralError::UnterminatedString),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_name(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            _ => Err(LiteralError::UnknownName(name)),
        }
    }

    fn parse_number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let radix_prefixed = self.peek() == Some('0')
            && matches!(
                self.chars.get(self.pos + 1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            );

        while let Some(c) = self.peek() {
            let exponent_sign = (c == '-' || c == '+')
                && !radix_prefixed
                && matches!(self.chars.get(self.pos.wrapping_sub(1)), Some('e' | 'E'));
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }

        let raw: String = self.chars[start..self.pos].iter().collect();
        number_from_str(&raw)
    }
}

fn number_from_str(raw: &str) -> Result<Literal, LiteralError> {
    let invalid = || LiteralError::InvalidNumber(raw.to_string());

    if raw.starts_with('_') || raw.ends_with('_') || raw.contains("__") {
        return Err(invalid());
    }
    let digits = raw.replace('_', "");

    if digits.len() > 2 && digits.starts_with('0') {
        let radix = match &digits[1..2] {
            "x" | "X" => Some(16),
            "o" | "O" => Some(8),
            "b" | "B" => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return i64::from_str_radix(&digits[2..], radix)
                .map(Literal::Int)
                .map_err(|_| invalid());
        }
    }

    let is_float = digits.contains('.') || digits.contains(['e', 'E']);
    if is_float {
        if !digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            return Err(invalid());
        }
        return digits.parse::<f64>().map(Literal::Float).map_err(|_| invalid());
    }

    // Leading zeros are only valid for zero itself
    if digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0') {
        return Err(invalid());
    }
    digits.parse::<i64>().map(Literal::Int).map_err(|_| invalid())
}

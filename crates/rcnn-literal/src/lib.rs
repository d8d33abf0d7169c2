//! Literal parser for command-line configuration overrides.
//!
//! Override values arrive as raw strings (`"0.01"`, `"(300,)"`, `"True"`).
//! This crate turns them into typed [`Literal`] values so the caller can
//! compare them against the kind of the configuration leaf they replace.

mod parser;

pub use parser::parse_literal;

use std::fmt;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Decimal, hex, octal or binary integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Single- or double-quoted string.
    Str(String),
    /// `(a, b)`, `(a,)`, `()` or a bare `a, b`.
    Tuple(Vec<Literal>),
    /// `[a, b]`
    List(Vec<Literal>),
}

impl Literal {
    /// Short type name, matching the names used in configuration errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "none",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::Tuple(_) => "tuple",
            Literal::List(_) => "list",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Literal::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Errors produced while parsing a literal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LiteralError {
    #[error("empty literal")]
    Empty,

    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("'{0}' is not a literal")]
    UnknownName(String),

    #[error("unterminated string")]
    UnterminatedString,
}

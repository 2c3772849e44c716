//! User supplied output templates.
//!
//! Placeholders name a state field and take printf style options:
//!
//!  `%(key)[flags][width][.precision]conversion`
//!
//!  where:
//!
//!  • flags: `-` left aligns, `0` pads numbers with zeros
//!
//!  • conversion: `s` string, `d`/`i` integer, `f` fixed point (6 digits unless given)
//!
//!  `%%` is a literal percent sign.
//!
//! A template that does not parse, or names a key the state does not have,
//! still builds. It fails every render with the same error instead.
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

use crate::nmea::types::{Key, Reading, Value};
use crate::state::State;

const DEFAULT_PRECISION: usize = 6;

/// `%s` text of a field that was received without a usable value
const NO_VALUE: &str = "None";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("invalid format string at offset {0}: {1}")]
    Syntax(usize, &'static str),
    #[error("unknown format key '{0}'")]
    UnknownKey(String),
    #[error("'{0}' has not been received yet")]
    Missing(&'static str),
    #[error("'{0}' has no value")]
    NoValue(&'static str),
    #[error("'{key}' cannot be formatted with %{conv}")]
    Mismatch { key: &'static str, conv: char },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Conversion {
    Str,
    Int,
    Fixed,
}

impl Conversion {
    fn symbol(&self) -> char {
        match self {
            Conversion::Str => 's',
            Conversion::Int => 'd',
            Conversion::Fixed => 'f',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Placeholder {
    key: Key,
    left: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conv: Conversion,
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Field(Placeholder),
    /// Placeholder naming something that is not a state key
    Unresolved(String),
}

/// A compiled format string
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pieces: Result<Vec<Piece>, FormatError>,
}

fn digits(chars: &mut Peekable<CharIndices>) -> Option<usize> {
    let mut n: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|&(_, c)| c.to_digit(10)) {
        n = Some(n.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
        chars.next();
    }
    n
}

fn parse(s: &str) -> Result<Vec<Piece>, FormatError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = s.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '%')) => literal.push('%'),
            Some((_, '(')) => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, ')')) => break,
                        Some((_, c)) => name.push(c),
                        None => return Err(FormatError::Syntax(start, "unterminated key")),
                    }
                }

                let (mut left, mut zero) = (false, false);
                while let Some(&(_, c)) = chars.peek() {
                    match c {
                        '-' => left = true,
                        '0' => zero = true,
                        _ => break,
                    }
                    chars.next();
                }
                let width = digits(&mut chars);
                let precision = match chars.peek() {
                    Some(&(_, '.')) => {
                        chars.next();
                        Some(digits(&mut chars).unwrap_or(0))
                    }
                    _ => None,
                };
                let conv = match chars.next() {
                    Some((_, 's')) => Conversion::Str,
                    Some((_, 'd')) | Some((_, 'i')) => Conversion::Int,
                    Some((_, 'f')) => Conversion::Fixed,
                    _ => return Err(FormatError::Syntax(start, "expected conversion s, d or f")),
                };

                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(match Key::from_name(&name) {
                    Some(key) => Piece::Field(Placeholder { key, left, zero, width, precision, conv }),
                    None => Piece::Unresolved(name),
                });
            }
            _ => return Err(FormatError::Syntax(start, "expected '(' or '%' after '%'")),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

impl Template {
    pub fn new(s: &str) -> Self {
        Template { pieces: parse(s) }
    }

    /// The error every render of this template will fail with, if there is one.
    pub fn problem(&self) -> Option<FormatError> {
        match &self.pieces {
            Err(e) => Some(e.clone()),
            Ok(pieces) => pieces.iter().find_map(|p| match p {
                Piece::Unresolved(name) => Some(FormatError::UnknownKey(name.clone())),
                _ => None,
            }),
        }
    }

    /// Substitutes every placeholder from `state`.
    pub fn render(&self, state: &State) -> Result<String, FormatError> {
        let pieces = self.pieces.as_ref().map_err(|e| e.clone())?;
        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Field(p) => out.push_str(&p.format(state)?),
                Piece::Unresolved(name) => return Err(FormatError::UnknownKey(name.clone())),
            }
        }
        Ok(out)
    }
}

impl Placeholder {
    fn format(&self, state: &State) -> Result<String, FormatError> {
        let name = self.key.name();
        let value = match state.get(self.key) {
            Reading::Known(v) => Some(v),
            Reading::Unknown => None,
            Reading::Absent => return Err(FormatError::Missing(name)),
        };
        let prec = self.precision.unwrap_or(DEFAULT_PRECISION);
        let body = match (self.conv, &value) {
            (Conversion::Str, v) => {
                let s = v.as_ref().map_or_else(|| NO_VALUE.to_string(), Value::to_string);
                match self.precision {
                    Some(p) => s.chars().take(p).collect(),
                    None => s,
                }
            }
            (_, None) => return Err(FormatError::NoValue(name)),
            (Conversion::Int, Some(Value::Int(n))) => n.to_string(),
            (Conversion::Int, Some(Value::Float(x))) => (x.trunc() as i64).to_string(),
            (Conversion::Int, Some(Value::Bool(b))) => u8::from(*b).to_string(),
            (Conversion::Fixed, Some(Value::Float(x))) => format!("{:.*}", prec, x),
            (Conversion::Fixed, Some(Value::Int(n))) => format!("{:.*}", prec, f64::from(*n)),
            (Conversion::Fixed, Some(Value::Bool(b))) => {
                format!("{:.*}", prec, f64::from(u8::from(*b)))
            }
            (conv, _) => return Err(FormatError::Mismatch { key: name, conv: conv.symbol() }),
        };
        Ok(self.pad(body))
    }

    fn pad(&self, body: String) -> String {
        let len = body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return body;
        }
        let fill = width - len;
        if self.left {
            format!("{}{}", body, " ".repeat(fill))
        } else if self.zero && self.conv != Conversion::Str {
            // sign stays in front of the zeros
            match body.strip_prefix('-') {
                Some(rest) => format!("-{}{}", "0".repeat(fill), rest),
                None => format!("{}{}", "0".repeat(fill), body),
            }
        } else {
            format!("{}{}", " ".repeat(fill), body)
        }
    }
}

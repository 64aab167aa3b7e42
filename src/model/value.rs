//! Typed scalar values for graph properties.
//!
//! The store knows four scalar kinds: integer, float, boolean, string.
//! A [`Scalar`] carries its kind in the variant; coercion from text happens
//! once, at construction, via [`Scalar::coerce`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The fixed set of recognized scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    String,
}

impl ValueKind {
    /// Parse a type name, case-insensitively. Unknown names are rejected.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "integer" => Ok(ValueKind::Integer),
            "float" => Ok(ValueKind::Float),
            "boolean" => Ok(ValueKind::Boolean),
            "string" => Ok(ValueKind::String),
            _ => Err(Error::InvalidType(name.to_owned())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
        }
    }
}

impl Default for ValueKind {
    fn default() -> Self {
        ValueKind::String
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Scalar {
    /// Coerce raw text into a scalar of the given kind.
    ///
    /// - integer: leading numeric prefix, truncated toward zero
    ///   (`"42.9"` → 42, `"abc"` → 0)
    /// - float: leading numeric prefix, or 0.0
    /// - boolean: `""`, `"0"` and `"false"` (any case) are false,
    ///   anything else is true
    /// - string: verbatim copy
    pub fn coerce(kind: ValueKind, raw: &str) -> Scalar {
        match kind {
            ValueKind::Integer => {
                let prefix = numeric_prefix(raw);
                let n = prefix
                    .parse::<i64>()
                    .unwrap_or_else(|_| prefix.parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0));
                Scalar::Integer(n)
            }
            ValueKind::Float => Scalar::Float(numeric_prefix(raw).parse::<f64>().unwrap_or(0.0)),
            ValueKind::Boolean => {
                let t = raw.trim();
                Scalar::Boolean(!(t.is_empty() || t == "0" || t.eq_ignore_ascii_case("false")))
            }
            ValueKind::String => Scalar::String(raw.to_owned()),
        }
    }

    /// Re-coerce this value into another kind through its textual form.
    pub fn retyped(&self, kind: ValueKind) -> Scalar {
        Scalar::coerce(kind, &self.to_text())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Scalar::Integer(_) => ValueKind::Integer,
            Scalar::Float(_) => ValueKind::Float,
            Scalar::Boolean(_) => ValueKind::Boolean,
            Scalar::String(_) => ValueKind::String,
        }
    }

    /// Canonical textual representation. Round-trips through
    /// [`Scalar::coerce`] with the same kind.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }

    /// A value is blank when its trimmed textual form is empty.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::String(String::new())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Scalar { fn from(v: bool) -> Self { Scalar::Boolean(v) } }
impl From<i32> for Scalar { fn from(v: i32) -> Self { Scalar::Integer(v as i64) } }
impl From<i64> for Scalar { fn from(v: i64) -> Self { Scalar::Integer(v) } }
impl From<f64> for Scalar { fn from(v: f64) -> Self { Scalar::Float(v) } }
impl From<String> for Scalar { fn from(v: String) -> Self { Scalar::String(v) } }
impl From<&str> for Scalar { fn from(v: &str) -> Self { Scalar::String(v.to_owned()) } }

/// Longest leading numeric prefix of the trimmed input: optional sign,
/// digits, at most one decimal point, optional exponent.
fn numeric_prefix(text: &str) -> &str {
    let s = text.trim();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let mut seen_digit = false;
    let mut seen_dot = false;

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            b'e' | b'E' if seen_digit => {
                // Only take the exponent if digits actually follow.
                let mut exp = end + 1;
                if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
                    exp += 1;
                }
                let digits = bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > 0 {
                    end = exp + digits;
                }
                break;
            }
            _ => break,
        }
    }

    if seen_digit { &s[..end] } else { "" }
}

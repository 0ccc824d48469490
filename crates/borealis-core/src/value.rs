//! Argument values carried by events and service signals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a single event argument.
///
/// Event schemas are ordered lists of kinds; every emission is checked
/// against the schema of the event it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// UTF-8 text.
    Str,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
}

impl ArgKind {
    /// Parse raw text as a value of this kind.
    ///
    /// Booleans accept `0`/`1` as well as `true`/`false`, which is what
    /// most text-framed IPC feeds send.
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            Self::Str => Some(Value::Str(raw.to_string())),
            Self::Int => raw.trim().parse().ok().map(Value::Int),
            Self::Float => raw.trim().parse().ok().map(Value::Float),
            Self::Bool => match raw.trim() {
                "1" | "true" => Some(Value::Bool(true)),
                "0" | "false" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A single argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text.
    Str(String),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Str(_) => ArgKind::Str,
            Self::Int(_) => ArgKind::Int,
            Self::Float(_) => ArgKind::Float,
            Self::Bool(_) => ArgKind::Bool,
        }
    }

    /// The text of a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer of an `Int` value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The float of a `Float` value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean of a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// How a list of values disagrees with a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgMismatch {
    /// Wrong number of values.
    Arity {
        /// Declared arity.
        expected: usize,
        /// Supplied arity.
        got: usize,
    },
    /// A value of the wrong kind.
    Kind {
        /// Zero-based position.
        index: usize,
        /// Declared kind.
        expected: ArgKind,
        /// Supplied kind.
        got: ArgKind,
    },
}

/// Check `args` against `schema`, returning the first disagreement.
pub fn check_args(schema: &[ArgKind], args: &[Value]) -> Option<ArgMismatch> {
    if schema.len() != args.len() {
        return Some(ArgMismatch::Arity {
            expected: schema.len(),
            got: args.len(),
        });
    }
    schema
        .iter()
        .zip(args)
        .enumerate()
        .find(|(_, (kind, value))| value.kind() != **kind)
        .map(|(index, (kind, value))| ArgMismatch::Kind {
            index,
            expected: *kind,
            got: value.kind(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(ArgKind::Str.parse("DP-1"), Some(Value::from("DP-1")));
        assert_eq!(ArgKind::Int.parse(" 42"), Some(Value::Int(42)));
        assert_eq!(ArgKind::Bool.parse("1"), Some(Value::Bool(true)));
        assert_eq!(ArgKind::Bool.parse("maybe"), None);
        assert_eq!(ArgKind::Int.parse("three"), None);
    }

    #[test]
    fn test_check_args() {
        let schema = [ArgKind::Str, ArgKind::Int];
        assert_eq!(check_args(&schema, &["a".into(), 1i64.into()]), None);
        assert_eq!(
            check_args(&schema, &["a".into()]),
            Some(ArgMismatch::Arity {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            check_args(&schema, &["a".into(), "b".into()]),
            Some(ArgMismatch::Kind {
                index: 1,
                expected: ArgKind::Int,
                got: ArgKind::Str
            })
        );
    }
}

//! The tagged value that flows through every MEP/GA/DE evaluation.
//!
//! Genetic programming interpreters need a result type that can represent
//! "no value" (a division by zero, an out-of-domain function call) without
//! throwing, alongside the small set of scalar types example programs
//! actually traffic in. Grounded on `morinim/vita`'s `any` wrapper
//! (`kernel/any.h`/`.cc`), but expressed as a closed sum type rather than a
//! type-erased container -- every Vita symbol already declares its category,
//! so the interpreter always knows which arm to expect.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The "no value" result: division by zero, log of a negative number,
    /// index out of bounds, or any other undefined evaluation outcome.
    /// Propagates through an expression the way NaN propagates through
    /// floating point arithmetic -- any operator applied to `Void` yields
    /// `Void`.
    Void,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl Value {
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn category(&self) -> ValueKind {
        match self {
            Value::Void => ValueKind::Void,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Numeric comparison used by relational symbols; `Void` compares
    /// unequal (and unordered) to everything, including another `Void`,
    /// matching NaN's reflexive-inequality behavior.
    pub fn partial_cmp_numeric(&self, other: &Value) -> Option<Ordering> {
        match (self.as_double(), other.as_double()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "<void>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Value::Void => map.serialize_entry("void", &())?,
            Value::Bool(b) => map.serialize_entry("bool", b)?,
            Value::Int(i) => map.serialize_entry("int", i)?,
            Value::Double(d) => map.serialize_entry("double", d)?,
            Value::String(s) => map.serialize_entry("string", s)?,
        }
        map.end()
    }
}

/// The category a [`Value`] belongs to, independent of its payload. Every
/// symbol in a [`crate::symbol::SymbolSet`] declares the `ValueKind` it
/// returns and consumes so the interpreter can reject ill-typed programs
/// before evaluation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Void,
    Bool,
    Int,
    Double,
    String,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Void => "void",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::String => "string",
        };
        write!(f, "{name}")
    }
}

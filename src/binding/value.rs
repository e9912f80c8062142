// src/binding/value.rs

use std::fmt;
use std::sync::Arc;

use crate::error::GeometryResult;
use crate::geometry::Geometry;

/// Vom Host aufrufbare Funktion (Export, Callback einer Transformation).
pub type HostFunction = Arc<dyn Fn(&[Value]) -> GeometryResult<Value> + Send + Sync>;

/// Dynamisch typisierter Wert, wie ihn der Host übergibt und zurückbekommt.
///
/// Geometrien sind referenzgezählt: der Host hält `Arc`s, und das Engine-Handle
/// wird freigegeben, sobald die letzte Referenz fällt.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Geometry(Arc<Geometry>),
    Function(HostFunction),
}

impl Value {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> GeometryResult<Value> + Send + Sync + 'static,
    {
        Value::Function(Arc::new(f))
    }

    /// Host-seitiger Typname, für Fehlermeldungen.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Geometry(_) => "Geometry",
            Value::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Arc<Geometry>> {
        match self {
            Value::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&HostFunction> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }
}

/// ECMAScript `ToInt32`: abschneiden, NaN/Unendlich werden 0, Überlauf läuft modulo 2^32.
pub fn to_int32(number: f64) -> i32 {
    if !number.is_finite() {
        return 0;
    }
    let truncated = number.trunc().rem_euclid(4_294_967_296.0);
    let wrapped = if truncated >= 2_147_483_648.0 {
        truncated - 4_294_967_296.0
    } else {
        truncated
    };
    wrapped as i32
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Geometry(a), Value::Geometry(b)) => Arc::ptr_eq(a, b) || a.exact_eq(b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(values) => f.debug_tuple("Array").field(values).finish(),
            Value::Geometry(geometry) => f.debug_tuple("Geometry").field(geometry).finish(),
            Value::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Geometry> for Value {
    fn from(geometry: Geometry) -> Self {
        Value::Geometry(Arc::new(geometry))
    }
}

impl From<Arc<Geometry>> for Value {
    fn from(geometry: Arc<Geometry>) -> Self {
        Value::Geometry(geometry)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

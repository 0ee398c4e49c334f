//! Cell values and column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    /// Returns true if this value is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for integers and floats.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// The hashable form used for uniqueness checks and join lookups.
    ///
    /// Integral floats collapse onto the matching integer so `1` and `1.0`
    /// compare equal. Nulls have no key.
    pub fn key(&self) -> Option<KeyValue> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(KeyValue::Integer(*i)),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(KeyValue::Integer(*f as i64))
                } else if f.is_nan() {
                    Some(KeyValue::Float(f64::NAN.to_bits()))
                } else {
                    Some(KeyValue::Float(f.to_bits()))
                }
            }
            Value::Boolean(b) => Some(KeyValue::Boolean(*b)),
            Value::Text(s) => Some(KeyValue::Text(s.clone())),
        }
    }

    /// Check if a raw cell represents a missing/null value.
    pub fn is_null_token(raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Hashable projection of a non-null [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Integer(i64),
    /// Bit pattern of a non-integral float.
    Float(u64),
    Boolean(bool),
    Text(String),
}

/// Inferred data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Boolean values (true/false).
    Boolean,
    /// Text or mixed values.
    String,
    /// Every value is null.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Derive the column type from its values, ignoring nulls.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut current = ColumnType::Unknown;
        for value in values {
            let observed = match value {
                Value::Null => continue,
                Value::Integer(_) => ColumnType::Integer,
                Value::Float(_) => ColumnType::Float,
                Value::Boolean(_) => ColumnType::Boolean,
                Value::Text(_) => return ColumnType::String,
            };
            current = match (current, observed) {
                (ColumnType::Unknown, t) => t,
                (a, b) if a == b => a,
                (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                    ColumnType::Float
                }
                _ => return ColumnType::String,
            };
        }
        current
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

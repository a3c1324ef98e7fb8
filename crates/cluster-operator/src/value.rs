//! Typed argument values and the text-to-value converter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Primitive type declared by a parameter schema.
///
/// Unrecognised type names are preserved in [`ParamType::Other`] so the
/// converter can report them as [`ConversionError::UnsupportedType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// IEEE-754 double.
    Float,
    /// A type name this client does not understand.
    Other(String),
}

impl ParamType {
    /// Schema name of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ParamType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "string" => Self::String,
            "int" => Self::Int,
            "bool" => Self::Bool,
            "float" => Self::Float,
            _ => Self::Other(name),
        }
    }
}

impl From<ParamType> for String {
    fn from(ty: ParamType) -> Self {
        match ty {
            ParamType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A converted argument value.
///
/// Serializes to the bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    String(String),
}

impl TypedValue {
    /// Coerce a schema-provided value to the declared type.
    ///
    /// Integral numbers widen to `float`, integral floats narrow to `int`,
    /// strings go through [`convert`] and scalars render into `string`.
    /// Values for an unsupported type are returned unchanged.
    pub fn coerce(self, target: &ParamType) -> Result<Self, ConversionError> {
        match (self, target) {
            (value, ParamType::Other(_)) => Ok(value),
            (Self::String(s), ParamType::String) => Ok(Self::String(s)),
            (Self::String(s), ty) => convert(&s, ty),
            (value, ParamType::String) => Ok(Self::String(value.to_string())),
            (Self::Int(n), ParamType::Int) => Ok(Self::Int(n)),
            (Self::Int(n), ParamType::Float) => Ok(Self::Float(n as f64)),
            (Self::Float(f), ParamType::Float) if f.is_finite() => Ok(Self::Float(f)),
            (Self::Float(f), ParamType::Int) if is_integral(f) => Ok(Self::Int(f as i64)),
            (Self::Bool(b), ParamType::Bool) => Ok(Self::Bool(b)),
            (value, ty) => Err(ConversionError::InvalidValue {
                value: value.to_string(),
                expected: ty.clone(),
                reason: "value has a different type".into(),
            }),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

// i64::MAX is not representable; 2^63 is the first float past it.
fn is_integral(f: f64) -> bool {
    f.fract() == 0.0 && f >= -9_223_372_036_854_775_808.0 && f < 9_223_372_036_854_775_808.0
}

/// Convert a textual argument to the declared type.
///
/// Booleans accept `true`, `false`, `t`, `f`, `1` and `0` in any case.
pub fn convert(raw: &str, target: &ParamType) -> Result<TypedValue, ConversionError> {
    let invalid = |reason: String| ConversionError::InvalidValue {
        value: raw.to_string(),
        expected: target.clone(),
        reason,
    };

    match target {
        ParamType::String => Ok(TypedValue::String(raw.to_string())),
        ParamType::Int => raw
            .parse::<i64>()
            .map(TypedValue::Int)
            .map_err(|e| invalid(e.to_string())),
        ParamType::Bool => parse_bool(raw)
            .map(TypedValue::Bool)
            .ok_or_else(|| invalid("expected one of true, false, t, f, 1, 0".into())),
        ParamType::Float => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(TypedValue::Float(f)),
            // NaN and infinities have no JSON encoding.
            Ok(_) => Err(invalid("must be finite".into())),
            Err(e) => Err(invalid(e.to_string())),
        },
        ParamType::Other(name) => Err(ConversionError::UnsupportedType(name.clone())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}
